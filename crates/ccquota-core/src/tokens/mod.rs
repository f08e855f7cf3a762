//! Token usage reconstructed from local session logs.
//!
//! Assistant tools stream each response into their logs as several lines
//! with cumulative usage. The aggregator deduplicates those per message and
//! sums the result per category.

mod aggregator;
mod claude;
mod codex;
mod display;
mod source;
mod stats;

pub use aggregator::{aggregate, aggregate_sources, scan_file, window_start};
pub use claude::ClaudeFormat;
pub use codex::CodexFormat;
pub use display::format_token_count;
pub use source::{default_sources, LogFormat, LogSource};
pub use stats::{LogRecord, RecordKind, TokenStats};
