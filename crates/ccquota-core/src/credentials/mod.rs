//! OAuth credentials for the usage endpoint.
//!
//! Lookup order: `CLAUDE_OAUTH_TOKEN`, then the macOS keychain entry written
//! by Claude Code, then `~/.claude/.credentials.json`.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Environment variable that overrides any stored credentials
pub const TOKEN_ENV_VAR: &str = "CLAUDE_OAUTH_TOKEN";
const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";

/// Bearer token plus the subscription tier it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    /// Plan tier (e.g. "max", "pro"); unknown when the token came from the env
    pub plan: Option<String>,
}

/// No usable credentials could be found
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no usable credentials: no Claude Code credentials found")]
    NotFound,

    #[error("no usable credentials: no OAuth token in stored credentials")]
    MissingToken,

    #[error("no usable credentials: failed to parse stored credentials: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    claude_ai_oauth: Option<OAuthEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthEntry {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    subscription_type: Option<String>,
}

/// Resolve credentials from the environment or the platform store
pub fn load_credentials() -> Result<Credentials, CredentialError> {
    if let Some(credentials) = from_env() {
        debug!("Using credentials from {}", TOKEN_ENV_VAR);
        return Ok(credentials);
    }

    if cfg!(target_os = "macos") {
        if let Some(blob) = read_keychain() {
            debug!("Using credentials from keychain");
            return parse_credentials(&blob);
        }
    }

    match credentials_file() {
        Some(path) if path.exists() => {
            debug!("Using credentials from {:?}", path);
            read_credentials_file(&path)
        }
        _ => Err(CredentialError::NotFound),
    }
}

fn from_env() -> Option<Credentials> {
    std::env::var(TOKEN_ENV_VAR)
        .ok()
        .filter(|token| !token.is_empty())
        .map(|access_token| Credentials {
            access_token,
            plan: None,
        })
}

fn read_keychain() -> Option<String> {
    let output = Command::new("security")
        .args(["find-generic-password", "-s", KEYCHAIN_SERVICE, "-w"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let blob = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!blob.is_empty()).then_some(blob)
}

fn credentials_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join(".credentials.json"))
}

/// Read a Claude Code credentials file
pub fn read_credentials_file(path: &Path) -> Result<Credentials, CredentialError> {
    let blob = std::fs::read_to_string(path).map_err(|_| CredentialError::NotFound)?;
    parse_credentials(&blob)
}

/// Parse the JSON blob Claude Code stores in the keychain or on disk
pub fn parse_credentials(blob: &str) -> Result<Credentials, CredentialError> {
    let stored: StoredCredentials = serde_json::from_str(blob.trim())
        .map_err(|e| CredentialError::Malformed(e.to_string()))?;
    let entry = stored
        .claude_ai_oauth
        .filter(|entry| !entry.access_token.is_empty())
        .ok_or(CredentialError::MissingToken)?;

    Ok(Credentials {
        access_token: entry.access_token,
        plan: entry.subscription_type.filter(|plan| !plan.is_empty()),
    })
}
