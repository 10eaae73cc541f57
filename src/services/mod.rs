pub mod journal_service;
pub mod project_service;

pub use journal_service::{JournalService, ReconcileReport};
pub use project_service::ProjectService;
