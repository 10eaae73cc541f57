use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PL_TYPE: &str = "Python";

/// A project record. Serializes with the field names the HTTP API exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub proj_id: Option<i64>,
    pub proj_name: String,
    pub pl_type: String,
    pub location: String,
    pub date: DateTime<Utc>,
}

impl Project {
    /// Build an unsaved project whose location is `root/name`.
    pub fn new(proj_name: String, projects_root: &Path) -> Self {
        let location = location_for(projects_root, &proj_name);
        Self {
            proj_id: None,
            proj_name,
            pl_type: DEFAULT_PL_TYPE.to_string(),
            location,
            date: Utc::now(),
        }
    }

    pub fn with_pl_type(mut self, pl_type: Option<String>) -> Self {
        if let Some(pl_type) = pl_type {
            self.pl_type = pl_type;
        }
        self
    }

    pub fn rename(&mut self, new_name: String, projects_root: &Path) {
        self.location = location_for(projects_root, &new_name);
        self.proj_name = new_name;
    }

    pub fn location_path(&self) -> PathBuf {
        PathBuf::from(&self.location)
    }
}

/// Location string for a project name under the projects root.
pub fn location_for(projects_root: &Path, proj_name: &str) -> String {
    projects_root.join(proj_name).to_string_lossy().to_string()
}
