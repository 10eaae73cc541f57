pub mod config;
pub mod paths;
pub mod validation;

pub use config::*;
pub use paths::*;
pub use validation::*;
