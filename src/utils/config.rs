use crate::models::Config;
use crate::utils::paths::get_config_dir;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Load the config from `path` (or the default location). A missing file is
/// created with default values.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    if config_path.exists() {
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse config file {}: {}. Please check the file format.",
                config_path.display(),
                e
            )
        })?;

        config.validate()?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save_config(&default_config, &config_path)?;
        Ok(default_config)
    }
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents.trim_end().to_string() + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_written_with_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("hub").join("config.toml");

        let config = load_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.ide_url, Config::default().ide_url);
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.projects_root = temp.path().join("projects");
        config.database_path = Some(temp.path().join("data.db"));
        config.ide_url = "http://localhost:8080/".to_string();
        save_config(&config, &path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.projects_root, config.projects_root);
        assert_eq!(loaded.database_path, config.database_path);
        assert_eq!(loaded.ide_url, "http://localhost:8080/");
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "log_level = \"chatty\"\n").unwrap();
        assert!(load_config(Some(&path)).is_err());

        std::fs::write(&path, "bind_addr = [not toml").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
