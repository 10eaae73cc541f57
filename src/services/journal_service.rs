use anyhow::Result;
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;

use crate::context::AppContext;
use crate::db::queries::{JournalQueries, ProjectQueries};
use crate::error::{ProjectError, ProjectResult};
use crate::models::{FsOp, JournalEntry, JournalState};
use crate::utils::paths::{create_project_dir, remove_project_dir, rename_project_dir};

/// Counts from a reconciliation pass over pending journal entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub applied: usize,
    pub rolled_back: usize,
    pub failed: usize,
}

impl ReconcileReport {
    pub fn total(&self) -> usize {
        self.applied + self.rolled_back + self.failed
    }
}

/// Bookkeeping for the filesystem journal.
pub struct JournalService;

impl JournalService {
    /// Record the outcome of a staged filesystem operation.
    ///
    /// On success the entry is marked applied. On failure `compensate` undoes
    /// the committed database change and the entry is marked rolled back, in
    /// one transaction; the filesystem error is returned either way.
    pub fn settle<F>(
        conn: &Connection,
        entry_id: i64,
        outcome: ProjectResult<()>,
        compensate: F,
    ) -> ProjectResult<()>
    where
        F: FnOnce(&Connection) -> Result<()>,
    {
        match outcome {
            Ok(()) => {
                // The directory change already happened; a stale pending entry
                // is resolved as done on the next reconcile.
                if let Err(e) = JournalQueries::complete(conn, entry_id, JournalState::Applied) {
                    warn!("Failed to mark journal entry {} applied: {}", entry_id, e);
                }
                Ok(())
            }
            Err(fs_err) => {
                warn!(
                    "Filesystem step of journal entry {} failed, compensating: {}",
                    entry_id, fs_err
                );
                let rollback = || -> Result<()> {
                    let tx = conn.unchecked_transaction()?;
                    compensate(&tx)?;
                    JournalQueries::complete(&tx, entry_id, JournalState::RolledBack)?;
                    tx.commit()?;
                    Ok(())
                };
                if let Err(e) = rollback() {
                    error!(
                        "Compensation for journal entry {} failed, left pending: {:#}",
                        entry_id, e
                    );
                }
                Err(fs_err)
            }
        }
    }

    /// Bring the filesystem in line with the database for every entry left
    /// pending by an interrupted request.
    pub fn reconcile_pending(conn: &Connection) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for entry in JournalQueries::list_pending(conn)? {
            let entry_id = match entry.id {
                Some(id) if entry.is_pending() => id,
                _ => continue,
            };

            match Self::roll_forward(conn, &entry) {
                Ok(state) => {
                    JournalQueries::complete(conn, entry_id, state)?;
                    info!(
                        "Reconciled journal entry {} ({} for project {}): {}",
                        entry_id, entry.op, entry.project_id, state
                    );
                    match state {
                        JournalState::RolledBack => report.rolled_back += 1,
                        _ => report.applied += 1,
                    }
                }
                Err(e) => {
                    error!("Could not reconcile journal entry {}: {}", entry_id, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    pub async fn reconcile(ctx: &AppContext) -> ProjectResult<ReconcileReport> {
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            ctx.with_db(|db| Ok(Self::reconcile_pending(&db.connection)?))
        })
        .await?
    }

    /// Apply whatever part of the entry's operation is still missing on disk.
    /// The database row is authoritative: a create or rename only rolls
    /// forward while the project still lives at the entry's target.
    fn roll_forward(conn: &Connection, entry: &JournalEntry) -> ProjectResult<JournalState> {
        match entry.op {
            FsOp::Create => {
                let target = Self::required(entry.target.as_deref(), entry)?;
                if !Self::project_lives_at(conn, entry.project_id, target)? {
                    return Ok(JournalState::RolledBack);
                }
                if !target.is_dir() {
                    create_project_dir(target)
                        .map_err(|e| ProjectError::io("create", target, e))?;
                }
                Ok(JournalState::Applied)
            }
            FsOp::Rename => {
                let source = Self::required(entry.source.as_deref(), entry)?;
                let target = Self::required(entry.target.as_deref(), entry)?;
                if !Self::project_lives_at(conn, entry.project_id, target)? {
                    return Ok(JournalState::RolledBack);
                }
                if target.is_dir() {
                    return Ok(JournalState::Applied);
                }
                if source.is_dir() {
                    rename_project_dir(source, target)
                        .map_err(|e| ProjectError::io("rename", source, e))?;
                } else {
                    create_project_dir(target)
                        .map_err(|e| ProjectError::io("create", target, e))?;
                }
                Ok(JournalState::Applied)
            }
            FsOp::Remove => {
                let source = Self::required(entry.source.as_deref(), entry)?;
                let location = source.to_string_lossy();
                if ProjectQueries::find_by_location(conn, &location)?.is_some() {
                    // The directory belongs to a live project again
                    return Ok(JournalState::RolledBack);
                }
                remove_project_dir(source).map_err(|e| ProjectError::io("remove", source, e))?;
                Ok(JournalState::Applied)
            }
        }
    }

    fn project_lives_at(conn: &Connection, project_id: i64, location: &Path) -> ProjectResult<bool> {
        let project = ProjectQueries::find_by_id(conn, project_id)?;
        Ok(project.map_or(false, |p| Path::new(&p.location) == location))
    }

    fn required<'a>(path: Option<&'a str>, entry: &JournalEntry) -> ProjectResult<&'a Path> {
        path.map(Path::new).ok_or_else(|| {
            ProjectError::Store(anyhow::anyhow!(
                "Journal entry {:?} ({}) is missing a path",
                entry.id,
                entry.op
            ))
        })
    }
}
