//! Configuration file for s3scope
//!
//! [`Config::load`] reads `$XDG_CONFIG_HOME/s3scope/config.toml` (falling back
//! to `~/.config/s3scope/config.toml`). A missing default file is not an
//! error; a missing file passed explicitly is. Command-line flags take
//! precedence over anything set here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Credential profile used when `--profile` is not given
    pub profile: Option<String>,

    /// Objects fetched in parallel
    pub concurrency: Option<usize>,

    /// Path or name of the AWS CLI executable
    pub aws_cli: Option<String>,
}

impl Config {
    /// Load from `path`, or from the default location when `path` is None
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
    Some(base.join("s3scope").join("config.toml"))
}
