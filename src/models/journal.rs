use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filesystem operation staged alongside a project mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsOp {
    Create,
    Rename,
    Remove,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FsOp::Create => write!(f, "create"),
            FsOp::Rename => write!(f, "rename"),
            FsOp::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for FsOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(FsOp::Create),
            "rename" => Ok(FsOp::Rename),
            "remove" => Ok(FsOp::Remove),
            _ => Err(anyhow::anyhow!("Invalid filesystem op: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalState {
    Pending,
    Applied,
    RolledBack,
}

impl fmt::Display for JournalState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JournalState::Pending => write!(f, "pending"),
            JournalState::Applied => write!(f, "applied"),
            JournalState::RolledBack => write!(f, "rolled_back"),
        }
    }
}

impl FromStr for JournalState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JournalState::Pending),
            "applied" => Ok(JournalState::Applied),
            "rolled_back" => Ok(JournalState::RolledBack),
            _ => Err(anyhow::anyhow!("Invalid journal state: {}", s)),
        }
    }
}

/// One row of the filesystem journal.
///
/// `source` is the directory before the operation and `target` the directory
/// after it; a create has no source and a remove has no target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Option<i64>,
    pub project_id: i64,
    pub op: FsOp,
    pub source: Option<String>,
    pub target: Option<String>,
    pub state: JournalState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    fn new(project_id: i64, op: FsOp, source: Option<String>, target: Option<String>) -> Self {
        Self {
            id: None,
            project_id,
            op,
            source,
            target,
            state: JournalState::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn create(project_id: i64, target: String) -> Self {
        Self::new(project_id, FsOp::Create, None, Some(target))
    }

    pub fn rename(project_id: i64, source: String, target: String) -> Self {
        Self::new(project_id, FsOp::Rename, Some(source), Some(target))
    }

    pub fn remove(project_id: i64, source: String) -> Self {
        Self::new(project_id, FsOp::Remove, Some(source), None)
    }

    pub fn is_pending(&self) -> bool {
        self.state == JournalState::Pending
    }
}
