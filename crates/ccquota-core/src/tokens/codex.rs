//! Codex CLI rollout logs (`~/.codex/sessions/**/*.jsonl`).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::source::LogFormat;
use super::stats::{LogRecord, RecordKind, TokenStats};

#[derive(Debug, Deserialize)]
struct RolloutLine {
    timestamp: Option<String>,
    payload: Option<RolloutPayload>,
}

#[derive(Debug, Deserialize)]
struct RolloutPayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<TokenCountInfo>,
}

#[derive(Debug, Deserialize)]
struct TokenCountInfo {
    total_token_usage: Option<CodexUsage>,
    last_token_usage: Option<CodexUsage>,
}

#[derive(Debug, Deserialize)]
struct CodexUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    cached_input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

impl From<&CodexUsage> for TokenStats {
    fn from(usage: &CodexUsage) -> Self {
        // input_tokens already includes the cached part
        TokenStats {
            input: usage.input_tokens.saturating_sub(usage.cached_input_tokens),
            output: usage.output_tokens,
            cache_write: 0,
            cache_read: usage.cached_input_tokens,
        }
    }
}

/// Parser for Codex rollout files.
///
/// Each `token_count` event carries the per-turn delta in `last_token_usage`
/// and the running session total in `total_token_usage`. Codex re-emits the
/// same event when nothing changed, so the running total serves as the
/// message identity and duplicates collapse.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodexFormat;

impl LogFormat for CodexFormat {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn parse_record(&self, line: &str) -> Option<LogRecord> {
        let parsed: RolloutLine = serde_json::from_str(line).ok()?;
        let payload = parsed.payload?;
        let kind = match payload.kind.as_deref() {
            Some("token_count") => RecordKind::AssistantMessage,
            _ => RecordKind::Other,
        };
        let info = payload.info?;
        let delta = info.last_token_usage.as_ref()?;
        let timestamp = DateTime::parse_from_rfc3339(parsed.timestamp.as_deref()?)
            .ok()?
            .with_timezone(&Utc);
        let identity = info
            .total_token_usage
            .as_ref()
            .map(|total| format!("total:{}", total.total_tokens));

        Some(LogRecord::new(
            kind,
            identity.as_deref(),
            timestamp,
            TokenStats::from(delta),
        ))
    }

    fn default_roots(&self) -> Vec<PathBuf> {
        let codex_home = std::env::var_os("CODEX_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".codex")));
        codex_home
            .map(|home| vec![home.join("sessions")])
            .unwrap_or_default()
    }
}
