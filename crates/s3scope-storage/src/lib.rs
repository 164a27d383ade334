//! Remote object storage for s3scope
//!
//! This crate provides credential profile discovery, listing of compressed log
//! objects and fetching/decompressing their contents.

mod aws_cli;
mod error;
mod fetcher;
mod memory;
mod profiles;
mod store;

pub use aws_cli::{AwsCliConnector, AwsCliStore, DEFAULT_AWS_CLI};
pub use error::{FetchError, StorageError};
pub use fetcher::{FetchOutcome, RemoteObjectFetcher, decompress, select_by_file_name};
pub use memory::MemoryStore;
pub use profiles::{AwsProfiles, StaticProfiles, DEFAULT_PROFILE};
pub use store::{Connector, ObjectStore, ProfileResolver};

// Re-export types that are used in our public API
pub use s3scope_types::{ObjectLocation, ObjectRef};
