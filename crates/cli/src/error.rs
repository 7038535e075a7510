use domain_syntax::SyntaxError;
use planner::PlannerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse the catalog file: {0}")]
    CatalogParse(#[source] serde_json::Error),

    #[error("Failed to parse the domain: {0}")]
    DomainParse(#[from] SyntaxError),

    #[error("Failed to compile the domain: {0}")]
    Planner(#[from] PlannerError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),

    #[error("Invalid optimization level: {0}")]
    InvalidLevel(String),
}
