//! Log processing for s3scope
//!
//! This crate provides timestamp normalization, line parsing, batch
//! ingestion, filtering and export.

mod buffer;
mod export;
mod filter;
mod ingest;
mod parser;
mod timestamp;

pub use buffer::{BatchStore, LevelCounts};
pub use export::{ExportError, export_visible, format_record};
pub use filter::{EntryFilter, matches};
pub use ingest::{DEFAULT_CONCURRENCY, IngestionCoordinator, LoadSummary};
pub use parser::LogParser;
pub use timestamp::{DISPLAY_FORMAT, normalize_timestamp, normalize_timestamp_in};

// Re-export types used in our public API
pub use s3scope_types::{LoadProgress, LogBatch, LogEntry, Severity};
