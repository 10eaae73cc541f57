pub mod connection;
pub mod migrations;
pub mod queries;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::Config;

pub use connection::Database;

pub fn initialize_database(db_path: &Path) -> Result<Database> {
    log::info!("Initializing database at: {}", db_path.display());
    let db = Database::new(db_path)?;
    log::debug!(
        "Database ready, schema version {:?}",
        db.get_schema_version()?
    );

    Ok(db)
}

/// Database file from the config, or `data.db` next to the running executable.
pub fn get_database_path(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let exe = std::env::current_exe().context("Could not determine executable path")?;
    let install_dir = exe
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Executable has no parent directory"))?;

    Ok(install_dir.join("data.db"))
}
