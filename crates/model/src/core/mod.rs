pub mod field_type;
pub mod identifiers;
pub mod utils;
pub mod value;
