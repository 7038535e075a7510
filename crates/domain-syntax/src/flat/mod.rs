pub mod json;
pub mod parser;
pub mod term;
