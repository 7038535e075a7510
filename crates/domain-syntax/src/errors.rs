use thiserror::Error;

/// Errors raised while building a domain from its inputs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyntaxError {
    /// The flat prefix form does not reduce to exactly one expression.
    #[error("Malformed domain {domain}: {reason}")]
    MalformedDomain { domain: String, reason: String },

    #[error("Invalid operator '{0}'")]
    InvalidOperator(String),

    #[error("Invalid field expression '{0}'")]
    InvalidFieldExpression(String),

    /// A flat term that is neither an operator token nor a 3-element leaf.
    #[error("Invalid domain term {0}")]
    InvalidTerm(String),

    #[error("Invalid JSON domain: {0}")]
    Json(String),
}

impl SyntaxError {
    pub fn malformed(domain: impl ToString, reason: impl Into<String>) -> Self {
        SyntaxError::MalformedDomain {
            domain: domain.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SyntaxError {
    fn from(err: serde_json::Error) -> Self {
        SyntaxError::Json(err.to_string())
    }
}
