//! Log ecosystems: a line format plus the directories it is written to.

use std::path::PathBuf;
use std::sync::Arc;

use super::claude::ClaudeFormat;
use super::codex::CodexFormat;
use super::stats::LogRecord;

/// A session log format written by one assistant tool
pub trait LogFormat: Send + Sync {
    /// Short name used in logs and CLI output
    fn name(&self) -> &'static str;

    /// File extension of log files (without the dot)
    fn extension(&self) -> &'static str {
        "jsonl"
    }

    /// Parse one line. Returns `None` for anything that carries no usage.
    fn parse_record(&self, line: &str) -> Option<LogRecord>;

    /// Well-known directories this tool writes logs to
    fn default_roots(&self) -> Vec<PathBuf>;
}

/// One log ecosystem to aggregate
#[derive(Clone)]
pub struct LogSource {
    pub format: Arc<dyn LogFormat>,
    pub roots: Vec<PathBuf>,
}

impl std::fmt::Debug for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSource")
            .field("format", &self.format.name())
            .field("roots", &self.roots)
            .finish()
    }
}

impl LogSource {
    /// Source over the format's default roots plus `extra_roots`.
    /// Roots that are not existing directories are dropped.
    pub fn with_defaults(format: Arc<dyn LogFormat>, extra_roots: &[PathBuf]) -> Self {
        let mut roots: Vec<PathBuf> = format.default_roots();
        roots.extend(extra_roots.iter().cloned());

        let mut seen = Vec::new();
        roots.retain(|root| {
            if !root.is_dir() || seen.contains(root) {
                return false;
            }
            seen.push(root.clone());
            true
        });

        Self { format, roots }
    }

    pub fn name(&self) -> &'static str {
        self.format.name()
    }
}

/// Claude Code and Codex sources with their default locations
pub fn default_sources(extra_claude: &[PathBuf], extra_codex: &[PathBuf]) -> Vec<LogSource> {
    vec![
        LogSource::with_defaults(Arc::new(ClaudeFormat), extra_claude),
        LogSource::with_defaults(Arc::new(CodexFormat), extra_codex),
    ]
}
