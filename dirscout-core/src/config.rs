//! src/config.rs
//! ============================================================================
//! # Config: application configuration loader and saver
//!
//! Loads and saves settings as TOML, either from an explicit path or from the
//! platform config directory resolved with
//! [`directories`](https://docs.rs/directories).
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load(None).await?;
//! let search = config.search.build(&ComparatorRegistry::with_builtins())?;
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::{ScoutError, ScoutResult};
use crate::logging::LoggerConfig;
use crate::registry::SearchSpec;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "dirscout";
const APPLICATION: &str = "dirscout";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggerConfig,

    #[serde(default)]
    pub search: SearchSpec,
}

impl Config {
    /// Loads `path`, or the platform config file when `path` is `None`.
    ///
    /// A missing file is replaced by the defaults, which are written out so
    /// they can be edited.
    pub async fn load(path: Option<&Path>) -> ScoutResult<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if path.exists() {
            info!("Loading config from {}", path.display());

            let text: String = TokioFs::read_to_string(&path)
                .await
                .map_err(|e| ScoutError::config_io(path.clone(), e))?;

            Self::from_toml(&text)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config: Self = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    pub fn from_toml(text: &str) -> ScoutResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub async fn save_to(&self, path: &Path) -> ScoutResult<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| ScoutError::config_io(parent.to_path_buf(), e))?;
        }

        let toml_str: String = toml::to_string_pretty(self)?;

        TokioFs::write(path, toml_str)
            .await
            .map_err(|e| ScoutError::config_io(path.to_path_buf(), e))
    }

    pub fn config_path() -> ScoutResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn config_dir() -> ScoutResult<PathBuf> {
        let proj_dirs: ProjectDirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| ScoutError::invalid_config("config_dir", "could not determine config directory"))?;

        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::dir_lister::ListingConfig;
    use crate::logging::LogRotation;

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let config = Config::load(Some(&path)).await.unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load(Some(&path)).await.unwrap(), config);
    }

    #[test]
    fn parses_partial_file() {
        let config = Config::from_toml(
            r#"
            [logging]
            log_level = "debug"
            rotation = "never"

            [search]
            type = "local_directory"
            [search.listing]
            watch_dir = "/tmp/inbox"
            list_dirs = true
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.log_level, "debug");
        assert!(matches!(config.logging.rotation, LogRotation::Never));
        assert_eq!(
            config.search,
            SearchSpec::LocalDirectory {
                listing: ListingConfig {
                    list_dirs: true,
                    ..ListingConfig::new("/tmp/inbox")
                }
            }
        );
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        assert!(matches!(
            Config::from_toml("[search]\ntype = 42"),
            Err(ScoutError::Config(_))
        ));
    }
}
