use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use super::project::DEFAULT_PL_TYPE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// SQLite file; defaults to `data.db` beside the executable
    pub database_path: Option<PathBuf>,
    /// Directory holding one subdirectory per project
    pub projects_root: PathBuf,
    /// IDE front-end that `/open/<id>` redirects to
    pub ide_url: String,
    pub default_pl_type: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_path: None,
            projects_root: PathBuf::from("/home/ubuntu/project"),
            ide_url: "http://82.157.251.229:8080/".to_string(),
            default_pl_type: DEFAULT_PL_TYPE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.projects_root.is_absolute() {
            return Err(anyhow::anyhow!(
                "projects_root must be an absolute path (got {})",
                self.projects_root.display()
            ));
        }

        url::Url::parse(&self.ide_url)
            .map_err(|e| anyhow::anyhow!("ide_url is not a valid URL ({}): {}", self.ide_url, e))?;

        if self.default_pl_type.trim().is_empty() {
            return Err(anyhow::anyhow!("default_pl_type cannot be empty"));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(anyhow::anyhow!(
                "Log level must be one of: {}",
                valid_levels.join(", ")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_pl_type, "Python");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.projects_root = PathBuf::from("relative/dir");
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ide_url = "82.157.251.229:8080/".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("projects_root = \"/tmp/projects\"\n").unwrap();
        assert_eq!(config.projects_root, PathBuf::from("/tmp/projects"));
        assert_eq!(config.ide_url, Config::default().ide_url);
    }
}
