pub mod commands;
pub mod types;

pub use clap::Parser;
pub use types::*;
