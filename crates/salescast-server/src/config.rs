//! Server configuration. Loaded from TOML at startup, falls back to
//! defaults if no config file exists.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Project root holding `experiments/`, `logs/` and `deployed_models/`.
    pub project_root: PathBuf,
    /// SQLite database with the source tables.
    pub db_path: PathBuf,
    /// Port for the experiment browsing/deployment service.
    pub experiment_port: u16,
    /// Port for the deployed-model inference service.
    pub model_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            db_path: PathBuf::from("sales.db"),
            experiment_port: 8100,
            model_port: 8200,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ServerConfig::load_or_default(Path::new("/nonexistent/salescast.toml")).unwrap();
        assert_eq!(config.experiment_port, 8100);
        assert_eq!(config.model_port, 8200);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("salescast.toml");
        std::fs::write(&path, "experiment_port = 9000\n").unwrap();
        let config = ServerConfig::load_or_default(&path).unwrap();
        assert_eq!(config.experiment_port, 9000);
        assert_eq!(config.model_port, 8200);
        assert_eq!(config.db_path, PathBuf::from("sales.db"));
    }
}
