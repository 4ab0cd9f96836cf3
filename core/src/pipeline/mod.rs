// shoebox/src/pipeline/mod.rs

//! `Pipeline<TData>`: declaration of named steps, handler registration and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Pipeline;
