use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(config_dir.join(".project-hub"))
}

/// Make sure the directory that holds project directories exists.
pub fn ensure_projects_root(root: &Path) -> Result<()> {
    if root.exists() {
        if !root.is_dir() {
            return Err(anyhow::anyhow!(
                "Projects root is not a directory: {}",
                root.display()
            ));
        }
        return Ok(());
    }

    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create projects root: {}", root.display()))?;
    log::info!("Created projects root {}", root.display());
    Ok(())
}

/// Create a project directory. Fails if it already exists.
pub fn create_project_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir(path)
}

/// Remove a project directory and everything in it. A missing directory is
/// treated as already removed.
pub fn remove_project_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Rename a project directory. Refuses to overwrite an existing target.
pub fn rename_project_dir(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }
    fs::rename(from, to)
}

/// Whether a name can be used as a single directory under the projects root.
pub fn is_safe_dir_name(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }

    if name.contains('\0') || name.contains('/') || name.contains('\\') {
        return false;
    }

    name != "." && name != ".."
}
