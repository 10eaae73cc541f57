use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;

pub struct Database {
    pub connection: Connection,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        connection.pragma_update(None, "journal_mode", "WAL")?;
        connection.pragma_update(None, "synchronous", "NORMAL")?;

        let db = Self { connection };
        crate::db::migrations::run_migrations(&db.connection)?;

        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        crate::db::migrations::run_migrations(&connection)?;
        Ok(Self { connection })
    }

    /// Drop every table this crate owns. Used by `initdb --drop`.
    pub fn drop_all(&self) -> Result<()> {
        self.connection.execute_batch(
            "DROP TABLE IF EXISTS fs_journal;
             DROP TABLE IF EXISTS projects;
             DROP TABLE IF EXISTS schema_version;",
        )?;
        Ok(())
    }

    pub fn get_schema_version(&self) -> Result<Option<i32>> {
        let mut stmt = self
            .connection
            .prepare("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")?;

        let version = stmt.query_row([], |row| row.get::<_, i32>(0)).optional()?;

        Ok(version)
    }
}
