use std::sync::LazyLock;

use regex::{Captures, Regex};

use s3scope_types::LogEntry;

use crate::timestamp::normalize_timestamp;

/// A line layout with named capture groups.
///
/// Every grammar captures `timestamp`, `level`, `worker` and `message`;
/// `task` is optional.
struct LineGrammar {
    name: &'static str,
    regex: Regex,
}

impl LineGrammar {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("built-in line grammar must compile"),
        }
    }
}

/// Known line grammars in priority order. The first match wins.
static GRAMMARS: LazyLock<[LineGrammar; 2]> = LazyLock::new(|| {
    [
        // [Worker-7] [2024-01-15 10:30:00,123] INFO [task-id] message
        LineGrammar::new(
            "worker-first",
            r"^\[(?P<worker>Worker-[^\]]+)\] \[(?P<timestamp>[^\]]+)\] (?P<level>\w+) (?P<task>\[[^\]]+\])? ?(?P<message>.*)",
        ),
        // [2024-01-15 10:30:00,123] INFO [worker]message
        LineGrammar::new(
            "timestamp-first",
            r"^\[(?P<timestamp>[\d\-:, ]+)\] (?P<level>\w+) \[(?P<worker>[^\]]+)\](?P<message>.*)",
        ),
    ]
});

/// Log parser for extracting structure from raw log lines
pub struct LogParser;

impl LogParser {
    /// Parse one line against the known grammars
    pub fn parse_line(line: &str) -> Option<LogEntry> {
        GRAMMARS.iter().find_map(|grammar| {
            let caps = grammar.regex.captures(line)?;
            tracing::trace!(grammar = grammar.name, "line matched");
            Some(Self::entry_from(&caps, line))
        })
    }

    /// Parse a whole file, skipping blank and unrecognized lines
    pub fn parse_content(content: &str) -> Vec<LogEntry> {
        content
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
            .filter_map(Self::parse_line)
            .collect()
    }

    fn entry_from(caps: &Captures<'_>, line: &str) -> LogEntry {
        let field = |name: &str| caps.name(name).map_or("", |m| m.as_str()).to_string();

        LogEntry {
            timestamp: normalize_timestamp(&field("timestamp")),
            level: field("level"),
            worker: field("worker"),
            task: caps.name("task").map(|m| m.as_str().to_string()),
            message: field("message"),
            full_message: line.to_string(),
        }
    }
}
