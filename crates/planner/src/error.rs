use domain_syntax::{Condition, OptLevel, SyntaxError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("Invalid field {entity}.{field} in condition {condition}")]
    UnknownField {
        entity: String,
        field: String,
        condition: String,
    },

    #[error("Invalid condition {condition}: {reason}")]
    InvalidCondition { condition: String, reason: String },

    #[error("Type mismatch in condition {condition}: {reason}")]
    TypeMismatch { condition: String, reason: String },

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Optimization did not reach a fixed point after {0} iterations")]
    OptimizationDiverged(usize),

    #[error("Cannot render SQL: {0}")]
    Sql(String),

    #[error("Domain for '{entity}' is optimized at level {actual}, level {required} is required")]
    NotOptimized {
        entity: String,
        actual: OptLevel,
        required: OptLevel,
    },
}

impl PlannerError {
    pub fn invalid(condition: &Condition, reason: impl Into<String>) -> Self {
        PlannerError::InvalidCondition {
            condition: condition.to_string(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(condition: &Condition, reason: impl Into<String>) -> Self {
        PlannerError::TypeMismatch {
            condition: condition.to_string(),
            reason: reason.into(),
        }
    }
}
