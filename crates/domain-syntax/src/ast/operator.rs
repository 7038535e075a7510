use crate::errors::SyntaxError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

/// Condition operators.
///
/// The first sixteen variants form the standard vocabulary a fully
/// optimized domain is made of; the rest are accepted on input and
/// rewritten by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    Any,
    NotAny,
    In,
    NotIn,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    Like,
    NotLike,
    ILike,
    NotILike,
    EqLike,
    EqILike,

    // Legacy superset
    DoubleEqual,
    LessGreater,
    EqualIfSet,
    ChildOf,
    ParentOf,
}

/// Coarse grouping used to order the children of n-ary nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorFamily {
    Membership,
    Equality,
    Traversal,
    Pattern,
    Ordering,
    Hierarchy,
}

lazy_static! {
    static ref OPERATOR_MAP: HashMap<&'static str, Operator> = build_operator_map();
    static ref INVERSE_OPERATOR: HashMap<Operator, Operator> = build_inverse_map();
}

impl Operator {
    pub const STANDARD: [Operator; 16] = [
        Operator::Any,
        Operator::NotAny,
        Operator::In,
        Operator::NotIn,
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessOrEqual,
        Operator::GreaterOrEqual,
        Operator::Like,
        Operator::NotLike,
        Operator::ILike,
        Operator::NotILike,
        Operator::EqLike,
        Operator::EqILike,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Any => "any",
            Operator::NotAny => "not any",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::ILike => "ilike",
            Operator::NotILike => "not ilike",
            Operator::EqLike => "=like",
            Operator::EqILike => "=ilike",
            Operator::DoubleEqual => "==",
            Operator::LessGreater => "<>",
            Operator::EqualIfSet => "=?",
            Operator::ChildOf => "child_of",
            Operator::ParentOf => "parent_of",
        }
    }

    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(self)
    }

    /// The operator selecting exactly the complement, if one exists.
    pub fn inverse(&self) -> Option<Operator> {
        INVERSE_OPERATOR.get(self).copied()
    }

    /// Whether the operator is the negated form of another one.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Operator::NotAny
                | Operator::NotIn
                | Operator::NotEqual
                | Operator::LessGreater
                | Operator::NotLike
                | Operator::NotILike
        )
    }

    /// The positive counterpart of a negative operator, the operator itself otherwise.
    pub fn positive(&self) -> Operator {
        match self {
            Operator::LessGreater => Operator::Equal,
            op if op.is_negative() => op.inverse().unwrap_or(*op),
            op => *op,
        }
    }

    pub fn family(&self) -> OperatorFamily {
        match self.positive() {
            Operator::In => OperatorFamily::Membership,
            Operator::Equal | Operator::DoubleEqual | Operator::EqualIfSet => {
                OperatorFamily::Equality
            }
            Operator::Any => OperatorFamily::Traversal,
            Operator::Like | Operator::ILike | Operator::EqLike | Operator::EqILike => {
                OperatorFamily::Pattern
            }
            Operator::ChildOf | Operator::ParentOf => OperatorFamily::Hierarchy,
            _ => OperatorFamily::Ordering,
        }
    }

    pub fn is_pattern(&self) -> bool {
        self.family() == OperatorFamily::Pattern
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::LessThan
                | Operator::GreaterThan
                | Operator::LessOrEqual
                | Operator::GreaterOrEqual
        )
    }
}

impl FromStr for Operator {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        OPERATOR_MAP
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| SyntaxError::InvalidOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn build_operator_map() -> HashMap<&'static str, Operator> {
    use Operator::*;

    let all = [
        Any,
        NotAny,
        In,
        NotIn,
        Equal,
        NotEqual,
        LessThan,
        GreaterThan,
        LessOrEqual,
        GreaterOrEqual,
        Like,
        NotLike,
        ILike,
        NotILike,
        EqLike,
        EqILike,
        DoubleEqual,
        LessGreater,
        EqualIfSet,
        ChildOf,
        ParentOf,
    ];

    let mut map = HashMap::new();
    for op in all {
        map.insert(op.as_str(), op);
    }
    map
}

fn build_inverse_map() -> HashMap<Operator, Operator> {
    use Operator::*;

    let pairs = [
        (In, NotIn),
        (Equal, NotEqual),
        (LessThan, GreaterOrEqual),
        (GreaterThan, LessOrEqual),
        (Like, NotLike),
        (ILike, NotILike),
        (Any, NotAny),
    ];

    let mut map = HashMap::new();
    for (op, inverse) in pairs {
        map.insert(op, inverse);
        map.insert(inverse, op);
    }
    map
}
