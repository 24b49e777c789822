use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Where silas reads a website from and writes it to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the real website.
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,
    /// Small fixed website used to try changes out.
    #[serde(default = "default_test_root")]
    pub test_root: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Overrides the `#+URL:` of the website index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}

fn default_test_root() -> PathBuf {
    PathBuf::from("test")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            test_root: default_test_root(),
            output_dir: default_output_dir(),
            base_url: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in every configured path
        for path in [
            &mut config.content_root,
            &mut config.test_root,
            &mut config.output_dir,
        ] {
            if let Some(expanded) = Self::expand_path(path) {
                *path = expanded;
            }
        }

        Ok(Some(config))
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/silas");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Root of the test website when `test` is set, of the real one otherwise.
    pub fn source_root(&self, test: bool) -> &Path {
        if test {
            &self.test_root
        } else {
            &self.content_root
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
