//! Optimizer behaviour against the shared partner catalog

mod hierarchy;
mod merges;
mod passes;
mod scenarios;
