use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::collections::BTreeSet;

/// A schema step, applied once and recorded in `schema_version`.
struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: include_str!("../../migrations/001_initial_schema.sql"),
}];

/// What one migration changed, for logs and `initdb` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: i32,
    pub name: &'static str,
    pub new_tables: Vec<String>,
}

/// Bring the schema up to date. Returns the migrations applied by this call,
/// which is empty when the schema was already current.
pub fn run_migrations(conn: &Connection) -> Result<Vec<AppliedMigration>> {
    let current = current_version(conn)?;
    let mut applied = Vec::new();

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.unchecked_transaction()?;
        let before = table_names(&tx)?;

        debug!("Executing migration {} SQL: {}", migration.version, migration.sql);
        tx.execute_batch(migration.sql)
            .with_context(|| format!("Migration {} ({}) failed", migration.version, migration.name))?;
        tx.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )?;

        let new_tables: Vec<String> = table_names(&tx)?.difference(&before).cloned().collect();
        tx.commit()?;

        info!(
            "Applied migration {} ({}), new tables: [{}]",
            migration.version,
            migration.name,
            new_tables.join(", ")
        );
        applied.push(AppliedMigration {
            version: migration.version,
            name: migration.name,
            new_tables,
        });
    }

    Ok(applied)
}

fn current_version(conn: &Connection) -> Result<i32> {
    if !table_names(conn)?.contains("schema_version") {
        return Ok(0);
    }

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

fn table_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(names)
}
