use log::{info, warn};
use std::path::Path;
use url::Url;

use crate::context::AppContext;
use crate::db::queries::{JournalQueries, ProjectQueries};
use crate::error::{ProjectError, ProjectResult};
use crate::models::{JournalEntry, Project};
use crate::services::JournalService;
use crate::utils::paths::{create_project_dir, remove_project_dir, rename_project_dir};
use crate::utils::validation::{normalize_pl_type, validate_proj_name};

/// Service layer for project records and their directories.
///
/// Every mutation commits the record change together with a pending journal
/// entry, then touches the filesystem, then settles the entry.
pub struct ProjectService;

impl ProjectService {
    /// Create a project record and its directory under the projects root.
    pub async fn create_project(
        ctx: &AppContext,
        proj_name: Option<String>,
        pl_type: Option<String>,
    ) -> ProjectResult<Project> {
        let proj_name = validate_proj_name(proj_name.as_deref())?;
        let pl_type = normalize_pl_type(pl_type).unwrap_or_else(|| ctx.config.default_pl_type.clone());

        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            ctx.with_db(|db| {
                let conn = &db.connection;
                let mut project = Project::new(proj_name, &ctx.config.projects_root)
                    .with_pl_type(Some(pl_type));

                let tx = conn.unchecked_transaction()?;
                if ProjectQueries::find_by_name(&tx, &project.proj_name)?.is_some() {
                    warn!("Project name conflict: {}", project.proj_name);
                    return Err(ProjectError::Conflict(project.proj_name));
                }
                let proj_id = ProjectQueries::create(&tx, &project)?;
                let entry_id =
                    JournalQueries::create(&tx, &JournalEntry::create(proj_id, project.location.clone()))?;
                tx.commit()?;
                project.proj_id = Some(proj_id);

                let dir = project.location_path();
                let outcome = create_project_dir(&dir).map_err(|e| ProjectError::io("create", &dir, e));
                JournalService::settle(conn, entry_id, outcome, |tx| {
                    ProjectQueries::delete(tx, proj_id)?;
                    Ok(())
                })?;

                info!("Created project {} '{}' at {}", proj_id, project.proj_name, project.location);
                Ok(project)
            })
        })
        .await?
    }

    /// All projects in storage order.
    pub async fn list_projects(ctx: &AppContext) -> ProjectResult<Vec<Project>> {
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            ctx.with_db(|db| Ok(ProjectQueries::list_all(&db.connection)?))
        })
        .await?
    }

    pub async fn get_project(ctx: &AppContext, proj_id: i64) -> ProjectResult<Project> {
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            ctx.with_db(|db| {
                ProjectQueries::find_by_id(&db.connection, proj_id)?
                    .ok_or(ProjectError::NotFound(proj_id))
            })
        })
        .await?
    }

    /// Delete a project record and remove its directory. Returns the deleted
    /// record.
    pub async fn delete_project(ctx: &AppContext, proj_id: i64) -> ProjectResult<Project> {
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            ctx.with_db(|db| {
                let conn = &db.connection;

                let tx = conn.unchecked_transaction()?;
                let project = ProjectQueries::find_by_id(&tx, proj_id)?
                    .ok_or(ProjectError::NotFound(proj_id))?;
                ProjectQueries::delete(&tx, proj_id)?;
                let entry_id =
                    JournalQueries::create(&tx, &JournalEntry::remove(proj_id, project.location.clone()))?;
                tx.commit()?;

                let dir = project.location_path();
                let outcome = remove_project_dir(&dir).map_err(|e| ProjectError::io("remove", &dir, e));
                JournalService::settle(conn, entry_id, outcome, |tx| ProjectQueries::restore(tx, &project))?;

                info!("Deleted project {} '{}'", proj_id, project.proj_name);
                Ok(project)
            })
        })
        .await?
    }

    /// Rename a project, moving its directory to match the new location.
    pub async fn rename_project(
        ctx: &AppContext,
        proj_id: i64,
        new_name: Option<String>,
    ) -> ProjectResult<Project> {
        let new_name = validate_proj_name(new_name.as_deref())?;

        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            ctx.with_db(|db| {
                let conn = &db.connection;
                let root: &Path = &ctx.config.projects_root;

                let tx = conn.unchecked_transaction()?;
                let mut project = ProjectQueries::find_by_id(&tx, proj_id)?
                    .ok_or(ProjectError::NotFound(proj_id))?;
                if project.proj_name == new_name {
                    return Ok(project);
                }
                if let Some(other) = ProjectQueries::find_by_name(&tx, &new_name)? {
                    if other.proj_id != Some(proj_id) {
                        warn!("Rename of project {} conflicts with '{}'", proj_id, new_name);
                        return Err(ProjectError::Conflict(new_name));
                    }
                }

                let old = project.clone();
                project.rename(new_name, root);
                ProjectQueries::update_name(&tx, proj_id, &project.proj_name, &project.location)?;
                let entry_id = JournalQueries::create(
                    &tx,
                    &JournalEntry::rename(proj_id, old.location.clone(), project.location.clone()),
                )?;
                tx.commit()?;

                let from = old.location_path();
                let outcome = rename_project_dir(&from, &project.location_path())
                    .map_err(|e| ProjectError::io("rename", &from, e));
                JournalService::settle(conn, entry_id, outcome, |tx| {
                    ProjectQueries::update_name(tx, proj_id, &old.proj_name, &old.location)?;
                    Ok(())
                })?;

                info!("Renamed project {} '{}' -> '{}'", proj_id, old.proj_name, project.proj_name);
                Ok(project)
            })
        })
        .await?
    }

    /// IDE URL that opens the project's directory.
    pub async fn open_url(ctx: &AppContext, proj_id: i64) -> ProjectResult<Url> {
        let project = Self::get_project(ctx, proj_id).await?;
        ide_url_for(&ctx.config.ide_url, &project.location)
    }
}

/// `ide_url` with `folder=<location>` appended to its query string.
pub fn ide_url_for(ide_url: &str, location: &str) -> ProjectResult<Url> {
    let mut url = Url::parse(ide_url)
        .map_err(|e| ProjectError::Store(anyhow::anyhow!("Invalid ide_url {}: {}", ide_url, e)))?;
    url.query_pairs_mut().append_pair("folder", location);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::location_for;
    use crate::models::JournalState;
    use crate::test_utils::TestContext;

    #[tokio::test]
    async fn test_create_project() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();

        let project = ProjectService::create_project(&ctx, Some("demo".into()), None)
            .await
            .unwrap();
        assert!(project.proj_id.is_some());
        assert_eq!(project.pl_type, "Python");
        assert_eq!(project.location, location_for(&ctx.config.projects_root, "demo"));
        assert!(test.projects_root().join("demo").is_dir());

        let projects = ProjectService::list_projects(&ctx).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0], project);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_and_duplicate_names() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();

        let missing = ProjectService::create_project(&ctx, None, Some("Rust".into())).await;
        assert!(matches!(missing, Err(ProjectError::MissingField("proj_name"))));

        ProjectService::create_project(&ctx, Some("demo".into()), Some("Rust".into()))
            .await
            .unwrap();
        let duplicate = ProjectService::create_project(&ctx, Some("demo".into()), None).await;
        assert!(matches!(duplicate, Err(ProjectError::Conflict(_))));

        let projects = ProjectService::list_projects(&ctx).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].pl_type, "Rust");
    }

    #[tokio::test]
    async fn test_failed_mkdir_leaves_no_record() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();
        std::fs::create_dir(test.projects_root().join("taken")).unwrap();

        let result = ProjectService::create_project(&ctx, Some("taken".into()), None).await;
        assert!(matches!(result, Err(ProjectError::Io { .. })));
        assert!(ProjectService::list_projects(&ctx).await.unwrap().is_empty());

        let journal = ctx
            .with_db(|db| Ok(JournalQueries::list_pending(&db.connection)?))
            .unwrap();
        assert!(journal.is_empty());
        let entries = ctx
            .with_db(|db| Ok(JournalQueries::find_by_id(&db.connection, 1)?))
            .unwrap()
            .unwrap();
        assert_eq!(entries.state, JournalState::RolledBack);
    }

    #[tokio::test]
    async fn test_delete_project() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();

        let project = ProjectService::create_project(&ctx, Some("demo".into()), None)
            .await
            .unwrap();
        let proj_id = project.proj_id.unwrap();
        std::fs::write(test.projects_root().join("demo").join("main.py"), "").unwrap();

        let deleted = ProjectService::delete_project(&ctx, proj_id).await.unwrap();
        assert_eq!(deleted.proj_name, "demo");
        assert!(!test.projects_root().join("demo").exists());
        assert!(ProjectService::list_projects(&ctx).await.unwrap().is_empty());

        let again = ProjectService::delete_project(&ctx, proj_id).await;
        assert!(matches!(again, Err(ProjectError::NotFound(id)) if id == proj_id));
    }

    #[tokio::test]
    async fn test_delete_restores_record_when_removal_fails() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();

        let project = ProjectService::create_project(&ctx, Some("demo".into()), None)
            .await
            .unwrap();
        let proj_id = project.proj_id.unwrap();

        // A plain file where the directory should be cannot be removed as one
        let dir = test.projects_root().join("demo");
        std::fs::remove_dir(&dir).unwrap();
        std::fs::write(&dir, "not a directory").unwrap();

        let result = ProjectService::delete_project(&ctx, proj_id).await;
        assert!(matches!(result, Err(ProjectError::Io { .. })));

        let stored = ProjectService::get_project(&ctx, proj_id).await.unwrap();
        assert_eq!(stored, project);
        assert!(dir.is_file());

        let entries = ctx
            .with_db(|db| Ok(JournalQueries::list_for_project(&db.connection, proj_id)?))
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.last().map(|e| e.state), Some(JournalState::RolledBack));
    }

    #[tokio::test]
    async fn test_rename_project() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();

        let project = ProjectService::create_project(&ctx, Some("old".into()), None)
            .await
            .unwrap();
        let proj_id = project.proj_id.unwrap();

        let renamed = ProjectService::rename_project(&ctx, proj_id, Some("new".into()))
            .await
            .unwrap();
        assert_eq!(renamed.proj_name, "new");
        assert_eq!(renamed.location, location_for(&ctx.config.projects_root, "new"));
        assert!(!test.projects_root().join("old").exists());
        assert!(test.projects_root().join("new").is_dir());

        let stored = ProjectService::get_project(&ctx, proj_id).await.unwrap();
        assert_eq!(stored.proj_name, "new");
        assert_eq!(stored.date, project.date);
    }

    #[tokio::test]
    async fn test_rename_failures() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();

        let a = ProjectService::create_project(&ctx, Some("a".into()), None)
            .await
            .unwrap();
        ProjectService::create_project(&ctx, Some("b".into()), None)
            .await
            .unwrap();
        let a_id = a.proj_id.unwrap();

        let missing = ProjectService::rename_project(&ctx, a_id, None).await;
        assert!(matches!(missing, Err(ProjectError::MissingField(_))));

        let conflict = ProjectService::rename_project(&ctx, a_id, Some("b".into())).await;
        assert!(matches!(conflict, Err(ProjectError::Conflict(_))));

        let not_found = ProjectService::rename_project(&ctx, 404, Some("c".into())).await;
        assert!(matches!(not_found, Err(ProjectError::NotFound(404))));

        // A stray directory in the way makes the move fail; the record is reverted
        std::fs::create_dir(test.projects_root().join("c")).unwrap();
        let blocked = ProjectService::rename_project(&ctx, a_id, Some("c".into())).await;
        assert!(matches!(blocked, Err(ProjectError::Io { .. })));
        let stored = ProjectService::get_project(&ctx, a_id).await.unwrap();
        assert_eq!(stored.proj_name, "a");
        assert_eq!(stored.location, a.location);
    }

    #[tokio::test]
    async fn test_open_url() {
        let test = TestContext::new().unwrap();
        let ctx = test.app_context();

        let project = ProjectService::create_project(&ctx, Some("demo".into()), None)
            .await
            .unwrap();
        let url = ProjectService::open_url(&ctx, project.proj_id.unwrap())
            .await
            .unwrap();

        let folder: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(folder, vec![("folder".to_string(), project.location.clone())]);
        assert!(url.as_str().starts_with(&ctx.config.ide_url));

        let missing = ProjectService::open_url(&ctx, 77).await;
        assert!(matches!(missing, Err(ProjectError::NotFound(77))));
    }

    #[test]
    fn test_ide_url_for() {
        let url = ide_url_for("http://10.0.0.1:8080/", "/home/ubuntu/project/my app").unwrap();
        assert_eq!(
            url.as_str(),
            "http://10.0.0.1:8080/?folder=%2Fhome%2Fubuntu%2Fproject%2Fmy+app"
        );
        assert!(ide_url_for("not a url", "/p").is_err());
    }
}
