//! Credential profile discovery
//!
//! Reads profile names from the AWS shared config and credentials files.
//! Locations follow the AWS CLI: `AWS_CONFIG_FILE` and
//! `AWS_SHARED_CREDENTIALS_FILE` override `~/.aws/config` and
//! `~/.aws/credentials`.

use std::fs;
use std::path::PathBuf;

use crate::ProfileResolver;

/// Profile used when no configuration can be found
pub const DEFAULT_PROFILE: &str = "default";

/// Which shared file a section header came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileKind {
    /// `[default]` and `[profile NAME]` sections
    Config,
    /// `[NAME]` sections
    Credentials,
}

/// Profiles discovered from the AWS shared config files
#[derive(Clone, Debug, Default)]
pub struct AwsProfiles {
    config_path: Option<PathBuf>,
    credentials_path: Option<PathBuf>,
}

impl AwsProfiles {
    /// Resolve file locations from the environment and home directory
    pub fn from_env() -> Self {
        let aws_dir = dirs::home_dir().map(|home| home.join(".aws"));

        let config_path = std::env::var_os("AWS_CONFIG_FILE")
            .map(PathBuf::from)
            .or_else(|| aws_dir.as_ref().map(|d| d.join("config")));
        let credentials_path = std::env::var_os("AWS_SHARED_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .or_else(|| aws_dir.as_ref().map(|d| d.join("credentials")));

        Self {
            config_path,
            credentials_path,
        }
    }

    /// Use explicit file locations
    pub fn with_paths(config_path: Option<PathBuf>, credentials_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            credentials_path,
        }
    }
}

impl ProfileResolver for AwsProfiles {
    fn available_profiles(&self) -> Vec<String> {
        let sources = [
            (&self.config_path, FileKind::Config),
            (&self.credentials_path, FileKind::Credentials),
        ];

        let mut profiles: Vec<String> = Vec::new();
        for (path, kind) in sources {
            let Some(content) = path.as_ref().and_then(|p| fs::read_to_string(p).ok()) else {
                continue;
            };
            for name in section_names(&content, kind) {
                if !profiles.contains(&name) {
                    profiles.push(name);
                }
            }
        }

        if profiles.is_empty() {
            tracing::debug!("no AWS profiles discovered, falling back to '{}'", DEFAULT_PROFILE);
            profiles.push(DEFAULT_PROFILE.to_string());
        }
        profiles
    }
}

/// Extract profile names from INI section headers
fn section_names(content: &str, kind: FileKind) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
            match kind {
                FileKind::Credentials => Some(inner),
                FileKind::Config if inner == DEFAULT_PROFILE => Some(inner),
                // Other sections (sso-session, services) are not profiles
                FileKind::Config => inner.strip_prefix("profile ").map(str::trim),
            }
        })
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// A fixed list of profiles
#[derive(Clone, Debug, Default)]
pub struct StaticProfiles(pub Vec<String>);

impl StaticProfiles {
    pub fn new<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(profiles.into_iter().map(Into::into).collect())
    }
}

impl ProfileResolver for StaticProfiles {
    fn available_profiles(&self) -> Vec<String> {
        if self.0.is_empty() {
            vec![DEFAULT_PROFILE.to_string()]
        } else {
            self.0.clone()
        }
    }
}
