use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use s3scope_types::LogEntry;

use crate::EntryFilter;

/// Errors from writing an export file
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("cannot create export file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed writing export file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One export line: `timestamp,level,worker,task,message`, written as-is
pub fn format_record(entry: &LogEntry) -> String {
    format!(
        "{},{},{},{},{}",
        entry.timestamp,
        entry.level,
        entry.worker,
        entry.task_or_empty(),
        entry.message
    )
}

/// Write the entries that pass `filter` to `destination`, in order.
///
/// The body is rendered up front so an unwritable destination fails before
/// any bytes are written. Returns the number of records written.
pub fn export_visible<'a, I>(
    entries: I,
    filter: &EntryFilter,
    destination: &Path,
) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut body = String::new();
    let mut count = 0;
    for entry in entries.into_iter().filter(|e| filter.matches(e)) {
        body.push_str(&format_record(entry));
        body.push('\n');
        count += 1;
    }

    let mut file = File::create(destination).map_err(|source| ExportError::Create {
        path: destination.to_path_buf(),
        source,
    })?;
    file.write_all(body.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| ExportError::Write {
            path: destination.to_path_buf(),
            source,
        })?;

    tracing::info!(path = %destination.display(), count, "exported log entries");
    Ok(count)
}
