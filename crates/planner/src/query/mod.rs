pub mod dialect;
pub mod lower;
pub mod renderer;
