//! Claude Code session transcripts (`~/.claude/projects/**/*.jsonl`).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::source::LogFormat;
use super::stats::{LogRecord, RecordKind, TokenStats};

/// Line shape written by Claude Code. Only the fields we read are declared.
#[derive(Debug, Deserialize)]
struct TranscriptLine {
    #[serde(rename = "type")]
    kind: String,
    timestamp: Option<String>,
    message: Option<TranscriptMessage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptMessage {
    #[serde(default)]
    id: Option<String>,
    usage: Option<TranscriptUsage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    cache_creation_input_tokens: u64,
    #[serde(default)]
    cache_read_input_tokens: u64,
}

/// Parser for Claude Code transcripts.
///
/// A streamed response is written as several lines sharing `message.id`,
/// each with the usage accumulated so far.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeFormat;

impl LogFormat for ClaudeFormat {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn parse_record(&self, line: &str) -> Option<LogRecord> {
        let parsed: TranscriptLine = serde_json::from_str(line).ok()?;
        let kind = if parsed.kind == "assistant" {
            RecordKind::AssistantMessage
        } else {
            RecordKind::Other
        };
        let message = parsed.message?;
        let usage = message.usage?;
        let timestamp = DateTime::parse_from_rfc3339(parsed.timestamp.as_deref()?)
            .ok()?
            .with_timezone(&Utc);

        Some(LogRecord::new(
            kind,
            message.id.as_deref(),
            timestamp,
            TokenStats {
                input: usage.input_tokens,
                output: usage.output_tokens,
                cache_write: usage.cache_creation_input_tokens,
                cache_read: usage.cache_read_input_tokens,
            },
        ))
    }

    fn default_roots(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = std::env::var_os("CLAUDE_CONFIG_DIR") {
            candidates.push(PathBuf::from(dir).join("projects"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".claude").join("projects"));
            candidates.push(home.join(".config").join("claude").join("projects"));
        }
        candidates
    }
}
