pub mod config;
pub mod context;
pub mod driver;
pub mod passes;
pub mod registry;
