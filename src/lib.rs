pub mod cli;
pub mod context;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod test_utils;
pub mod utils;

pub use context::AppContext;
pub use error::{ProjectError, ProjectResult};
pub use models::*;
