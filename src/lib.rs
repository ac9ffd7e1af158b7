pub mod error;
pub mod generator;
pub mod interpreter;
pub mod program;
