use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::db::{get_database_path, initialize_database, Database};
use crate::error::{ProjectError, ProjectResult};
use crate::models::Config;
use crate::utils::paths::ensure_projects_root;

/// Everything a request handler needs, built once at startup and cloned into
/// each handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    db: Arc<Mutex<Database>>,
}

impl AppContext {
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open the configured database and make sure the projects root exists.
    pub fn open(config: Config) -> Result<Self> {
        let db_path = get_database_path(&config)?;
        let db = initialize_database(&db_path)?;
        ensure_projects_root(&config.projects_root)?;
        Ok(Self::new(config, db))
    }

    /// Run blocking database work with exclusive access to the connection.
    ///
    /// Must be called from a blocking context (`spawn_blocking`).
    pub fn with_db<T, F>(&self, f: F) -> ProjectResult<T>
    where
        F: FnOnce(&Database) -> ProjectResult<T>,
    {
        let guard = self
            .db
            .lock()
            .map_err(|e| ProjectError::Store(anyhow::anyhow!("Database lock poisoned: {}", e)))?;
        f(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_root_and_database() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.projects_root = temp.path().join("projects");
        config.database_path = Some(temp.path().join("db").join("data.db"));

        let ctx = AppContext::open(config).unwrap();
        assert!(temp.path().join("projects").is_dir());
        assert!(temp.path().join("db").join("data.db").exists());

        let version = ctx.with_db(|db| Ok(db.get_schema_version()?)).unwrap();
        assert_eq!(version, Some(1));
    }
}
