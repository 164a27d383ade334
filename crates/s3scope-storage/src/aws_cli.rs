//! S3 access through the `aws` command line
//!
//! Credentials, regions and retries are left to the CLI and its profile
//! configuration; this module only shapes the calls and interprets output.

use serde::Deserialize;
use tokio::process::Command;

use crate::{Connector, ObjectStore, StorageError};

/// Program name used when none is configured
pub const DEFAULT_AWS_CLI: &str = "aws";

/// Opens [`AwsCliStore`] sessions
#[derive(Clone, Debug)]
pub struct AwsCliConnector {
    program: String,
}

impl AwsCliConnector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AwsCliConnector {
    fn default() -> Self {
        Self::new(DEFAULT_AWS_CLI)
    }
}

impl Connector for AwsCliConnector {
    type Store = AwsCliStore;

    async fn open(&self, profile: &str) -> Result<AwsCliStore, StorageError> {
        // Make sure the CLI is installed before any listing is attempted
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                StorageError::Connection(format!("failed to run '{}': {}", self.program, e))
            })?;

        if !output.status.success() {
            return Err(StorageError::Connection(format!(
                "'{} --version' exited with {}",
                self.program, output.status
            )));
        }

        Ok(AwsCliStore {
            program: self.program.clone(),
            profile: profile.to_string(),
        })
    }
}

/// Object store session bound to one profile
#[derive(Clone, Debug)]
pub struct AwsCliStore {
    program: String,
    profile: String,
}

impl AwsCliStore {
    /// Run the CLI with the session profile and return stdout
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>, StorageError> {
        tracing::debug!(program = %self.program, ?args, profile = %self.profile, "running aws cli");

        let output = Command::new(&self.program)
            .args(args)
            .args(["--profile", &self.profile])
            .output()
            .await
            .map_err(|e| {
                StorageError::Connection(format!("failed to run '{}': {}", self.program, e))
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(classify_cli_error(&self.profile, stderr))
    }
}

impl ObjectStore for AwsCliStore {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut args = vec!["s3api", "list-objects-v2", "--bucket", bucket, "--output", "json"];
        if !prefix.is_empty() {
            args.extend(["--prefix", prefix]);
        }

        let stdout = self.run(&args).await?;
        parse_listing(&stdout)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let uri = format!("s3://{}/{}", bucket, key);
        self.run(&["s3", "cp", uri.as_str(), "-", "--no-progress"])
            .await
            .map_err(|e| match e {
                StorageError::Connection(msg) if is_not_found(&msg) => StorageError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                },
                other => other,
            })
    }
}

/// `list-objects-v2` JSON output; `Contents` is absent for empty listings
#[derive(Debug, Default, Deserialize)]
struct ListObjectsOutput {
    #[serde(rename = "Contents", default)]
    contents: Vec<ObjectSummary>,
}

#[derive(Debug, Deserialize)]
struct ObjectSummary {
    #[serde(rename = "Key")]
    key: String,
}

fn parse_listing(stdout: &[u8]) -> Result<Vec<String>, StorageError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let listing: ListObjectsOutput = serde_json::from_slice(stdout)
        .map_err(|e| StorageError::Connection(format!("unexpected listing output: {}", e)))?;

    Ok(listing.contents.into_iter().map(|o| o.key).collect())
}

fn classify_cli_error(profile: &str, stderr: String) -> StorageError {
    if stderr.contains("profile") && stderr.contains("could not be found") {
        StorageError::ProfileNotFound(profile.to_string())
    } else {
        StorageError::Connection(stderr)
    }
}

fn is_not_found(stderr: &str) -> bool {
    stderr.contains("NoSuchKey") || stderr.contains("(404)")
}
