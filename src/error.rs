use std::path::PathBuf;

/// Outcome of a rejected or failed project operation.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Required field is missing: {0}")]
    MissingField(&'static str),

    #[error("Project name '{name}' is invalid: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("A project named '{0}' already exists")]
    Conflict(String),

    #[error("Project with ID {0} not found")]
    NotFound(i64),

    #[error("'{0}' is not a project ID")]
    InvalidId(String),

    #[error("Failed to {action} directory {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl ProjectError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProjectError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Coarse status reported in the `status` field of a response.
    pub fn status(&self) -> &'static str {
        match self {
            ProjectError::MissingField(_)
            | ProjectError::InvalidName { .. }
            | ProjectError::Conflict(_) => "incomplete",
            ProjectError::NotFound(_)
            | ProjectError::InvalidId(_)
            | ProjectError::Io { .. }
            | ProjectError::Store(_) => "error",
        }
    }

    /// Machine-readable discriminant reported in the `reason` field.
    pub fn reason(&self) -> &'static str {
        match self {
            ProjectError::MissingField(_) => "missing_field",
            ProjectError::InvalidName { .. } => "invalid_name",
            ProjectError::Conflict(_) => "conflict",
            ProjectError::NotFound(_) => "not_found",
            ProjectError::InvalidId(_) => "invalid_id",
            ProjectError::Io { .. } => "io_failure",
            ProjectError::Store(_) => "store_failure",
        }
    }
}

impl From<rusqlite::Error> for ProjectError {
    fn from(err: rusqlite::Error) -> Self {
        ProjectError::Store(err.into())
    }
}

impl From<tokio::task::JoinError> for ProjectError {
    fn from(err: tokio::task::JoinError) -> Self {
        ProjectError::Store(anyhow::anyhow!("Blocking task failed: {}", err))
    }
}

pub type ProjectResult<T> = std::result::Result<T, ProjectError>;
