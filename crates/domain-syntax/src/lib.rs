pub mod ast;
pub mod errors;
pub mod flat;

pub use ast::{
    condition::Condition,
    domain::{Domain, Nary, NaryKind},
    level::{OptLevel, OptMark},
    operator::{Operator, OperatorFamily},
    value::{ConditionValue, SubQuery, ValueSet},
};
pub use errors::SyntaxError;
pub use flat::{
    json::{parse_json, parse_json_str, to_json},
    parser::{DomainInput, from_flat},
    term::FlatTerm,
};
