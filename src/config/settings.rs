use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use ccquota_core::dashboard::DashboardConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Claude Code usage quota dashboard")]
pub struct Config {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Automatic refresh interval in seconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print token totals aggregated from local session logs and exit
    Tokens {
        /// Window to aggregate, in hours back from now
        #[arg(long)]
        hours: Option<u64>,
    },
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Automatic refresh interval in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Per-request network timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Minimum seconds between manual refreshes
    #[serde(default = "default_refresh_debounce")]
    pub refresh_debounce_secs: u64,

    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,

    /// Local token log settings
    #[serde(default)]
    pub tokens: TokenSettings,
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    10
}

fn default_refresh_debounce() -> u64 {
    10
}

/// UI-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Bar animation frames per second
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

fn default_animation_fps() -> u32 {
    30
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            animation_fps: default_animation_fps(),
        }
    }
}

/// Local token log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    /// Show token totals from local session logs
    #[serde(default = "default_tokens_enabled")]
    pub enabled: bool,

    /// Aggregation window in hours
    #[serde(default = "default_window_hours")]
    pub window_hours: u64,

    /// Extra Claude Code log roots (scanned in addition to the defaults)
    #[serde(default)]
    pub claude_roots: Vec<PathBuf>,

    /// Extra Codex log roots (scanned in addition to the defaults)
    #[serde(default)]
    pub codex_roots: Vec<PathBuf>,
}

fn default_tokens_enabled() -> bool {
    true
}

fn default_window_hours() -> u64 {
    5
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            enabled: default_tokens_enabled(),
            window_hours: default_window_hours(),
            claude_roots: Vec::new(),
            codex_roots: Vec::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            request_timeout_secs: default_request_timeout(),
            refresh_debounce_secs: default_refresh_debounce(),
            ui: UiSettings::default(),
            tokens: TokenSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::load_file(p);
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("ccquota/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/ccquota/config.toml")),
            dirs::home_dir().map(|p| p.join(".ccquota.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    fn load_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(interval) = cli.interval {
            self.refresh_interval_secs = interval;
        }
        if let Some(Command::Tokens { hours: Some(hours) }) = &cli.command {
            self.tokens.window_hours = *hours;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Keeps the refresh interval from hammering the endpoint and the
    /// animation ticker within a sane range.
    pub fn validate(&mut self) {
        const MIN_REFRESH_INTERVAL: u64 = 30;
        const MIN_TIMEOUT: u64 = 1;
        const MAX_WINDOW_HOURS: u64 = 24 * 366;

        self.refresh_interval_secs = self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL);
        self.request_timeout_secs = self.request_timeout_secs.max(MIN_TIMEOUT);
        self.ui.animation_fps = self.ui.animation_fps.clamp(1, 120);
        self.tokens.window_hours = self.tokens.window_hours.clamp(1, MAX_WINDOW_HOURS);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_window(&self) -> Duration {
        Duration::from_secs(self.tokens.window_hours.saturating_mul(60 * 60))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.ui.animation_fps.max(1)))
    }

    /// Timing parameters for the dashboard state machine
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            refresh_debounce: Duration::from_secs(self.refresh_debounce_secs),
            token_window: self.tokens.enabled.then(|| self.token_window()),
        }
    }
}
