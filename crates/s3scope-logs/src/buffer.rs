use std::sync::Arc;

use parking_lot::RwLock;

use s3scope_types::{LogBatch, LogEntry, Severity};

use crate::EntryFilter;

/// Thread-safe holder of the current batch.
///
/// Each load replaces the batch wholesale; clones share the same batch.
#[derive(Clone, Default)]
pub struct BatchStore {
    batch: Arc<RwLock<LogBatch>>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new batch, discarding the previous one
    pub fn replace(&self, batch: LogBatch) {
        *self.batch.write() = batch;
    }

    /// Copy of the current batch
    pub fn snapshot(&self) -> LogBatch {
        self.batch.read().clone()
    }

    /// Entries passing `filter`, in display order (cloned for rendering)
    pub fn visible(&self, filter: &EntryFilter) -> Vec<LogEntry> {
        filter.visible(self.batch.read().entries()).cloned().collect()
    }

    /// Get entry count per severity
    pub fn level_counts(&self) -> LevelCounts {
        let batch = self.batch.read();
        let mut counts = LevelCounts::default();

        for entry in batch.entries() {
            match entry.severity() {
                Severity::Error => counts.error += 1,
                Severity::Warn => counts.warn += 1,
                Severity::Other => counts.other += 1,
            }
        }

        counts
    }

    /// Total entry count across all sources
    pub fn total_entries(&self) -> usize {
        self.batch.read().total_entries()
    }

    /// Check if the batch has no entries
    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }

    pub fn clear(&self) {
        self.replace(LogBatch::new());
    }
}

/// Counts per severity
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub error: usize,
    pub warn: usize,
    pub other: usize,
}

impl LevelCounts {
    pub fn total(&self) -> usize {
        self.error + self.warn + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogParser;

    fn batch(key: &str, content: &str) -> LogBatch {
        let mut batch = LogBatch::new();
        batch.insert(key, LogParser::parse_content(content));
        batch
    }

    #[test]
    fn test_replace_is_wholesale() {
        let store = BatchStore::new();
        store.replace(batch("a", "[Worker-1] [t] INFO one\n[Worker-1] [t] INFO two\n"));
        assert_eq!(store.total_entries(), 2);

        store.replace(batch("b", "[Worker-2] [t] WARN three\n"));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(store.total_entries(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_visible_and_counts() {
        let store = BatchStore::new();
        store.replace(batch(
            "a",
            "[Worker-1] [t] ERROR boom\n[Worker-1] [t] WARN hmm\n[Worker-2] [t] INFO ok\n[Worker-2] [t] ERROR again\n",
        ));

        let counts = store.level_counts();
        assert_eq!(counts, LevelCounts { error: 2, warn: 1, other: 1 });
        assert_eq!(counts.total(), 4);

        let visible = store.visible(&EntryFilter::new("worker-2"));
        let levels: Vec<_> = visible.iter().map(|e| e.level.as_str()).collect();
        assert_eq!(levels, vec!["INFO", "ERROR"]);

        // Filtering leaves the stored batch untouched
        assert_eq!(store.total_entries(), 4);
    }
}
