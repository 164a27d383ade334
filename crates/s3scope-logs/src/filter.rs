use s3scope_types::LogEntry;

/// Case-insensitive substring filter over log entries
#[derive(Clone, Debug, Default)]
pub struct EntryFilter {
    /// Original query string
    query: String,

    /// Lowercased query used for matching
    needle: String,
}

impl EntryFilter {
    /// Create a new filter from a query string
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            needle: query.to_lowercase(),
        }
    }

    /// Check if a log entry matches this filter.
    ///
    /// Searches the full line, level, worker and task (when present).
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        let contains = |text: &str| text.to_lowercase().contains(&self.needle);

        contains(&entry.full_message)
            || contains(&entry.level)
            || contains(&entry.worker)
            || entry.task.as_deref().is_some_and(contains)
    }

    /// Entries that pass the filter, in their original order
    pub fn visible<'a, I>(&'a self, entries: I) -> impl Iterator<Item = &'a LogEntry> + 'a
    where
        I: IntoIterator<Item = &'a LogEntry>,
        I::IntoIter: 'a,
    {
        entries.into_iter().filter(move |e| self.matches(e))
    }

    /// Get the original query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Check if filter is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }
}

/// One-off match of `entry` against `query`
pub fn matches(entry: &LogEntry, query: &str) -> bool {
    EntryFilter::new(query).matches(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: &str, worker: &str, task: Option<&str>, line: &str) -> LogEntry {
        LogEntry {
            timestamp: "2024-01-15 10:30:00".to_string(),
            level: level.to_string(),
            worker: worker.to_string(),
            task: task.map(str::to_string),
            message: String::new(),
            full_message: line.to_string(),
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let filter = EntryFilter::new("");
        assert!(filter.is_empty());
        assert!(filter.matches(&entry("INFO", "w", None, "")));
        assert!(matches(&entry("DEBUG", "", None, "anything"), ""));
    }

    #[test]
    fn test_case_insensitive_full_message() {
        let e = entry("INFO", "Worker-1", None, "Payment GATEWAY unreachable");
        assert!(matches(&e, "gateway"));
        assert!(matches(&e, "PAYMENT gateway"));
        assert!(!matches(&e, "database"));
    }

    #[test]
    fn test_matches_structured_fields() {
        // Fields that are not part of the stored line still count
        let e = entry("ERROR", "Worker-9", Some("[nightly-sync]"), "x");
        assert!(matches(&e, "error"));
        assert!(matches(&e, "worker-9"));
        assert!(matches(&e, "NIGHTLY"));
    }

    #[test]
    fn test_absent_task_is_skipped() {
        let e = entry("INFO", "scheduler", None, "tick");
        assert!(!matches(&e, "task"));
    }

    #[test]
    fn test_visible_preserves_order() {
        let entries = vec![
            entry("ERROR", "a", None, "first"),
            entry("INFO", "b", None, "second"),
            entry("ERROR", "c", None, "third"),
        ];
        let filter = EntryFilter::new("error");
        let lines: Vec<_> = filter
            .visible(&entries)
            .map(|e| e.full_message.as_str())
            .collect();
        assert_eq!(lines, vec!["first", "third"]);
        assert_eq!(filter.query(), "error");
    }
}
