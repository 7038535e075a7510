pub mod catalog;
pub mod entity;
pub mod field;
pub mod memory;
