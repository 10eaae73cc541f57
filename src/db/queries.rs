use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{JournalEntry, JournalState, Project};

const PROJECT_COLUMNS: &str = "proj_id, proj_name, pl_type, location, date";

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        proj_id: Some(row.get(0)?),
        proj_name: row.get(1)?,
        pl_type: row.get(2)?,
        location: row.get(3)?,
        date: row.get(4)?,
    })
}

pub struct ProjectQueries;

impl ProjectQueries {
    pub fn create(conn: &Connection, project: &Project) -> Result<i64> {
        let mut stmt = conn.prepare(
            "INSERT INTO projects (proj_name, pl_type, location, date)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        stmt.execute(params![
            project.proj_name,
            project.pl_type,
            project.location,
            project.date
        ])?;

        Ok(conn.last_insert_rowid())
    }

    /// Re-insert a previously deleted project under its original id.
    pub fn restore(conn: &Connection, project: &Project) -> Result<()> {
        let proj_id = project
            .proj_id
            .ok_or_else(|| anyhow::anyhow!("Cannot restore a project without an id"))?;

        conn.execute(
            "INSERT INTO projects (proj_id, proj_name, pl_type, location, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                proj_id,
                project.proj_name,
                project.pl_type,
                project.location,
                project.date
            ],
        )?;

        Ok(())
    }

    /// All projects in storage order.
    pub fn list_all(conn: &Connection) -> Result<Vec<Project>> {
        let sql = format!("SELECT {} FROM projects ORDER BY proj_id", PROJECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn find_by_id(conn: &Connection, proj_id: i64) -> Result<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE proj_id = ?1", PROJECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let project = stmt.query_row([proj_id], project_from_row).optional()?;

        Ok(project)
    }

    pub fn find_by_name(conn: &Connection, proj_name: &str) -> Result<Option<Project>> {
        let sql = format!(
            "SELECT {} FROM projects WHERE proj_name = ?1 LIMIT 1",
            PROJECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let project = stmt.query_row([proj_name], project_from_row).optional()?;

        Ok(project)
    }

    pub fn find_by_location(conn: &Connection, location: &str) -> Result<Option<Project>> {
        let sql = format!(
            "SELECT {} FROM projects WHERE location = ?1 LIMIT 1",
            PROJECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let project = stmt.query_row([location], project_from_row).optional()?;

        Ok(project)
    }

    pub fn update_name(
        conn: &Connection,
        proj_id: i64,
        proj_name: &str,
        location: &str,
    ) -> Result<bool> {
        let mut stmt = conn.prepare(
            "UPDATE projects SET proj_name = ?1, location = ?2 WHERE proj_id = ?3",
        )?;
        let changes = stmt.execute(params![proj_name, location, proj_id])?;
        Ok(changes > 0)
    }

    pub fn delete(conn: &Connection, proj_id: i64) -> Result<bool> {
        let mut stmt = conn.prepare("DELETE FROM projects WHERE proj_id = ?1")?;
        let changes = stmt.execute([proj_id])?;
        Ok(changes > 0)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn journal_from_row(row: &Row) -> rusqlite::Result<JournalEntry> {
    let op: String = row.get(2)?;
    let state: String = row.get(5)?;

    Ok(JournalEntry {
        id: Some(row.get(0)?),
        project_id: row.get(1)?,
        op: op.parse().map_err(|e: anyhow::Error| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
        })?,
        source: row.get(3)?,
        target: row.get(4)?,
        state: state.parse().map_err(|e: anyhow::Error| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
        })?,
        created_at: row.get(6)?,
        completed_at: row.get(7)?,
    })
}

const JOURNAL_COLUMNS: &str =
    "id, project_id, op, source, target, state, created_at, completed_at";

pub struct JournalQueries;

impl JournalQueries {
    pub fn create(conn: &Connection, entry: &JournalEntry) -> Result<i64> {
        let mut stmt = conn.prepare(
            "INSERT INTO fs_journal (project_id, op, source, target, state, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        stmt.execute(params![
            entry.project_id,
            entry.op.to_string(),
            entry.source,
            entry.target,
            entry.state.to_string(),
            entry.created_at
        ])?;

        Ok(conn.last_insert_rowid())
    }

    /// Move an entry out of `pending`. Returns false if it was not pending.
    pub fn complete(conn: &Connection, entry_id: i64, state: JournalState) -> Result<bool> {
        let mut stmt = conn.prepare(
            "UPDATE fs_journal SET state = ?1, completed_at = ?2
             WHERE id = ?3 AND state = 'pending'",
        )?;
        let changes = stmt.execute(params![state.to_string(), Utc::now(), entry_id])?;
        Ok(changes > 0)
    }

    pub fn find_by_id(conn: &Connection, entry_id: i64) -> Result<Option<JournalEntry>> {
        let sql = format!("SELECT {} FROM fs_journal WHERE id = ?1", JOURNAL_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let entry = stmt.query_row([entry_id], journal_from_row).optional()?;
        Ok(entry)
    }

    /// Pending entries, oldest first.
    pub fn list_pending(conn: &Connection) -> Result<Vec<JournalEntry>> {
        let sql = format!(
            "SELECT {} FROM fs_journal WHERE state = 'pending' ORDER BY id",
            JOURNAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], journal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn list_for_project(conn: &Connection, project_id: i64) -> Result<Vec<JournalEntry>> {
        let sql = format!(
            "SELECT {} FROM fs_journal WHERE project_id = ?1 ORDER BY id",
            JOURNAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map([project_id], journal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use std::path::Path;

    #[test]
    fn test_project_queries() {
        let db = Database::in_memory().unwrap();
        let conn = &db.connection;
        let root = Path::new("/srv/projects");

        let id = ProjectQueries::create(conn, &Project::new("alpha".to_string(), root)).unwrap();
        ProjectQueries::create(conn, &Project::new("beta".to_string(), root)).unwrap();
        assert_eq!(ProjectQueries::count(conn).unwrap(), 2);

        let found = ProjectQueries::find_by_name(conn, "alpha").unwrap().unwrap();
        assert_eq!(found.proj_id, Some(id));
        assert_eq!(found.location, "/srv/projects/alpha");
        assert!(ProjectQueries::find_by_location(conn, "/srv/projects/alpha").unwrap().is_some());
        assert!(ProjectQueries::find_by_name(conn, "gamma").unwrap().is_none());

        assert!(ProjectQueries::update_name(conn, id, "renamed", "/srv/projects/renamed").unwrap());
        let renamed = ProjectQueries::find_by_id(conn, id).unwrap().unwrap();
        assert_eq!(renamed.proj_name, "renamed");

        assert!(ProjectQueries::delete(conn, id).unwrap());
        assert!(!ProjectQueries::delete(conn, id).unwrap());
        assert!(ProjectQueries::find_by_id(conn, id).unwrap().is_none());

        ProjectQueries::restore(conn, &renamed).unwrap();
        assert_eq!(ProjectQueries::find_by_id(conn, id).unwrap(), Some(renamed));

        let names: Vec<String> = ProjectQueries::list_all(conn)
            .unwrap()
            .into_iter()
            .map(|p| p.proj_name)
            .collect();
        assert_eq!(names, vec!["renamed".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_journal_queries() {
        let db = Database::in_memory().unwrap();
        let conn = &db.connection;

        let entry = JournalEntry::rename(7, "/p/a".to_string(), "/p/b".to_string());
        let id = JournalQueries::create(conn, &entry).unwrap();
        assert_eq!(JournalQueries::list_pending(conn).unwrap().len(), 1);

        assert!(JournalQueries::complete(conn, id, JournalState::Applied).unwrap());
        assert!(!JournalQueries::complete(conn, id, JournalState::RolledBack).unwrap());

        let stored = JournalQueries::find_by_id(conn, id).unwrap().unwrap();
        assert_eq!(stored.state, JournalState::Applied);
        assert!(stored.completed_at.is_some());
        assert_eq!(stored.source.as_deref(), Some("/p/a"));
        assert!(JournalQueries::list_pending(conn).unwrap().is_empty());
        assert_eq!(JournalQueries::list_for_project(conn, 7).unwrap().len(), 1);
    }
}
