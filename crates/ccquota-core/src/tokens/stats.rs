//! Token counters and log record types.

use std::ops::{Add, AddAssign};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Cumulative token counts per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenStats {
    /// Uncached input tokens
    pub input: u64,
    /// Generated output tokens
    pub output: u64,
    /// Tokens written into the prompt cache
    pub cache_write: u64,
    /// Tokens served from the prompt cache
    pub cache_read: u64,
}

impl TokenStats {
    /// Sum of all four categories
    pub fn total(&self) -> u64 {
        self.input
            .saturating_add(self.output)
            .saturating_add(self.cache_write)
            .saturating_add(self.cache_read)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for TokenStats {
    fn add_assign(&mut self, rhs: Self) {
        self.input = self.input.saturating_add(rhs.input);
        self.output = self.output.saturating_add(rhs.output);
        self.cache_write = self.cache_write.saturating_add(rhs.cache_write);
        self.cache_read = self.cache_read.saturating_add(rhs.cache_read);
    }
}

impl Add for TokenStats {
    type Output = TokenStats;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::iter::Sum for TokenStats {
    fn sum<I: Iterator<Item = TokenStats>>(iter: I) -> Self {
        iter.fold(TokenStats::default(), Add::add)
    }
}

/// Kind of a session log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Assistant response carrying token usage
    AssistantMessage,
    /// Anything else (user turns, tool results, metadata)
    Other,
}

/// One usage-bearing line parsed from a session log
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub kind: RecordKind,
    /// Logical message identity; `None` when the line carries no id
    pub message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Usage reported by this line (cumulative for its message)
    pub usage: TokenStats,
}

impl LogRecord {
    /// Build a record, treating an empty id as anonymous
    pub fn new(
        kind: RecordKind,
        message_id: Option<&str>,
        timestamp: DateTime<Utc>,
        usage: TokenStats,
    ) -> Self {
        Self {
            kind,
            message_id: message_id.filter(|id| !id.is_empty()).map(str::to_string),
            timestamp,
            usage,
        }
    }
}
