//! Optimizes query domains against entity metadata and lowers them to SQL.

pub mod error;
pub mod optimizer;
pub mod query;
pub mod schema;

pub use error::PlannerError;
pub use optimizer::{
    config::OptimizerConfig,
    context::PassContext,
    driver::{OptimizedDomain, Optimizer},
    registry::{ConditionPass, MergePass, MergeRule, MergeScope, PassRegistry},
};
pub use query::{
    dialect::{Dialect, MySql, Postgres, dialect_by_name},
    lower::{SqlContext, to_sql},
};
pub use schema::{
    catalog::Catalog,
    entity::Entity,
    field::{Field, Relation, SearchHook, SqlHook},
    memory::MemoryCatalog,
};
