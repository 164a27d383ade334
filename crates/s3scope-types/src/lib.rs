//! Shared types for s3scope
//!
//! This crate contains data structures used across multiple s3scope crates.

use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Remote Object Types
// ============================================================================

/// Key suffix that marks an object as a compressed log file
pub const LOG_OBJECT_SUFFIX: &str = ".log.gz";

/// URL scheme accepted for remote log locations
pub const S3_SCHEME: &str = "s3://";

/// A single object in remote storage
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the key names a gzip-compressed log file
    pub fn is_log_object(&self) -> bool {
        self.key.ends_with(LOG_OBJECT_SUFFIX)
    }

    /// Last path segment of the key
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }
}

/// Errors from parsing an `s3://bucket/prefix` path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path '{0}' must start with 's3://'")]
    MissingScheme(String),

    #[error("path '{0}' does not name a bucket")]
    MissingBucket(String),
}

/// A bucket plus key prefix, parsed from `s3://<bucket>/<prefix...>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub prefix: String,
}

impl ObjectLocation {
    /// Parse a path, splitting bucket from prefix at the first `/` after the scheme
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let rest = path
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| PathError::MissingScheme(path.to_string()))?;

        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(PathError::MissingBucket(path.to_string()));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        })
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.prefix)
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// Coarse severity used for highlighting and summaries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warn,
    Other,
}

impl Severity {
    /// Classify a captured level token
    pub fn from_level(level: &str) -> Self {
        match level {
            "ERROR" => Self::Error,
            "WARN" => Self::Warn,
            _ => Self::Other,
        }
    }
}

/// A single parsed log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Local time `YYYY-MM-DD HH:MM:SS`, or the source text when unrecognized
    pub timestamp: String,

    /// Severity token as written in the line
    pub level: String,

    /// Producing worker, process or thread
    pub worker: String,

    /// Bracketed task segment, if the grammar and line carry one
    pub task: Option<String>,

    /// Remainder of the line after the structured prefix
    pub message: String,

    /// Original raw log line
    pub full_message: String,
}

impl LogEntry {
    /// Task text, or an empty string when absent
    pub fn task_or_empty(&self) -> &str {
        self.task.as_deref().unwrap_or("")
    }

    pub fn severity(&self) -> Severity {
        Severity::from_level(&self.level)
    }

    /// Multi-line detail view of the entry
    pub fn detail(&self) -> String {
        format!(
            "Timestamp: {}\nLevel: {}\nWorker: {}\nTask: {}\n\nFull Message:\n{}",
            self.timestamp,
            self.level,
            self.worker,
            self.task.as_deref().unwrap_or("N/A"),
            self.full_message
        )
    }
}

/// Entries parsed from one source object
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SourceLog {
    key: String,
    entries: Vec<LogEntry>,
}

/// Parsed entries for one load, keyed by source object in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogBatch {
    sources: Vec<SourceLog>,

    /// Position of each key in `sources`
    index: HashMap<String, usize>,
}

impl LogBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entries for a key. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, entries: Vec<LogEntry>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.sources[pos].entries = entries,
            None => {
                self.index.insert(key.clone(), self.sources.len());
                self.sources.push(SourceLog { key, entries });
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[LogEntry]> {
        self.index
            .get(key)
            .map(|&pos| self.sources[pos].entries.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.key.as_str())
    }

    /// All entries in display order: file order, then line order
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.sources.iter().flat_map(|s| s.entries.iter())
    }

    pub fn total_entries(&self) -> usize {
        self.sources.iter().map(|s| s.entries.len()).sum()
    }

    /// Number of source objects recorded
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Progress of a batch load, sent after each processed object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub processed: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: "2024-01-15 10:30:00".to_string(),
            level: "INFO".to_string(),
            worker: "Worker-1".to_string(),
            task: None,
            message: message.to_string(),
            full_message: message.to_string(),
        }
    }

    #[test]
    fn test_parse_location() {
        let loc = ObjectLocation::parse("s3://my-bucket/path/to/logs/").unwrap();
        assert_eq!(loc.bucket, "my-bucket");
        assert_eq!(loc.prefix, "path/to/logs/");

        let loc = ObjectLocation::parse("s3://my-bucket").unwrap();
        assert_eq!(loc.bucket, "my-bucket");
        assert_eq!(loc.prefix, "");
    }

    #[test]
    fn test_parse_location_rejects_bad_paths() {
        assert_eq!(
            ObjectLocation::parse("https://my-bucket/logs"),
            Err(PathError::MissingScheme("https://my-bucket/logs".to_string()))
        );
        assert_eq!(
            ObjectLocation::parse("s3:///logs"),
            Err(PathError::MissingBucket("s3:///logs".to_string()))
        );
    }

    #[test]
    fn test_log_object_suffix() {
        assert!(ObjectRef::new("b", "logs/app.log.gz").is_log_object());
        assert!(!ObjectRef::new("b", "logs/app.log").is_log_object());
        assert!(!ObjectRef::new("b", "logs/app.gz").is_log_object());
        assert_eq!(ObjectRef::new("b", "logs/2024/app.log.gz").file_name(), "app.log.gz");
    }

    #[test]
    fn test_batch_preserves_insertion_order() {
        let mut batch = LogBatch::new();
        batch.insert("b", vec![entry("b1")]);
        batch.insert("a", vec![entry("a1"), entry("a2")]);
        batch.insert("c", Vec::new());

        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(batch.total_entries(), 3);
        let messages: Vec<_> = batch.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["b1", "a1", "a2"]);

        batch.insert("b", vec![entry("b2")]);
        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(batch.get("b").unwrap()[0].message, "b2");
        assert_eq!(batch.get("c"), Some(&[][..]));
        assert_eq!(batch.get("missing"), None);
    }

    #[test]
    fn test_batch_lookup_across_many_keys() {
        let mut batch = LogBatch::new();
        for i in 0..500 {
            batch.insert(format!("logs/{i}.log.gz"), vec![entry(&i.to_string())]);
        }
        batch.insert("logs/250.log.gz", vec![entry("again")]);

        assert_eq!(batch.len(), 500);
        assert_eq!(batch.keys().nth(250), Some("logs/250.log.gz"));
        assert_eq!(batch.get("logs/250.log.gz").unwrap()[0].message, "again");
        assert_eq!(batch.get("logs/499.log.gz").unwrap()[0].message, "499");
    }

    #[test]
    fn test_detail_view() {
        let mut e = entry("hello");
        assert!(e.detail().contains("Task: N/A"));
        e.task = Some("[job-7]".to_string());
        assert!(e.detail().contains("Task: [job-7]"));
        assert!(e.detail().ends_with("Full Message:\nhello"));
    }

    #[test]
    fn test_severity() {
        assert_eq!(Severity::from_level("ERROR"), Severity::Error);
        assert_eq!(Severity::from_level("WARN"), Severity::Warn);
        assert_eq!(Severity::from_level("INFO"), Severity::Other);
    }
}
