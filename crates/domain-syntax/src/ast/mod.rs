pub mod condition;
pub mod domain;
pub mod level;
pub mod operator;
pub mod value;
