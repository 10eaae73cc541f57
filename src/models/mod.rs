pub mod config;
pub mod journal;
pub mod project;

pub use config::Config;
pub use journal::{FsOp, JournalEntry, JournalState};
pub use project::Project;
