use crate::context::AppContext;
use crate::db::initialize_database;
use crate::models::Config;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated environment: a temporary database file and projects root.
pub struct TestContext {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    ctx: AppContext,
}

impl TestContext {
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Like `new`, but starting from `config`; paths are always redirected
    /// into the temporary directory.
    pub fn with_config(mut config: Config) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir.path().join("data.db");
        let projects_root = temp_dir.path().join("projects");
        std::fs::create_dir_all(&projects_root)?;

        config.database_path = Some(db_path.clone());
        config.projects_root = projects_root;

        let database = initialize_database(&db_path)?;

        Ok(Self {
            temp_dir,
            db_path,
            ctx: AppContext::new(config, database),
        })
    }

    pub fn app_context(&self) -> AppContext {
        self.ctx.clone()
    }

    pub fn projects_root(&self) -> &Path {
        &self.ctx.config.projects_root
    }

    /// Names of the directories currently under the projects root, sorted.
    pub fn project_dirs(&self) -> Result<Vec<String>> {
        let mut names = std::fs::read_dir(self.projects_root())?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }
}

/// Helper for async tests with an isolated context
pub async fn with_test_ctx_async<F, Fut>(test_fn: F)
where
    F: FnOnce(TestContext) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let ctx = TestContext::new().expect("Failed to create test context");
    test_fn(ctx).await.expect("Async test function failed");
}
