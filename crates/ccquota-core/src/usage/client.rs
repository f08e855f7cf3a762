//! Blocking client for the OAuth usage endpoint.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::types::UsageSnapshot;

pub const USAGE_URL: &str = "https://api.anthropic.com/api/oauth/usage";
const USER_AGENT: &str = "claude-code/2.0.32";
const ANTHROPIC_BETA: &str = "oauth-2025-04-20";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure of a single quota fetch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// HTTP 401: the stored OAuth token is no longer accepted
    #[error("token expired — re-login to Claude Code")]
    AuthExpired,

    /// DNS, connect, TLS, or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// Any other non-200 status
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The body was not a usage response
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Anything that can produce a quota snapshot.
///
/// Implementations block; the event loop runs them on a blocking worker.
pub trait UsageSource: Send + Sync {
    fn fetch_usage(&self) -> Result<UsageSnapshot, FetchError>;
}

/// ureq-backed client for the usage endpoint
pub struct QuotaClient {
    agent: ureq::Agent,
    token: String,
    url: String,
}

impl QuotaClient {
    /// Create a client with the given bearer token and request timeout
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
            token: token.into(),
            url: USAGE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl UsageSource for QuotaClient {
    fn fetch_usage(&self) -> Result<UsageSnapshot, FetchError> {
        let bearer = format!("Bearer {}", self.token);
        let mut response = self
            .agent
            .get(self.url.as_str())
            .header("Authorization", bearer.as_str())
            .header("User-Agent", USER_AGENT)
            .header("anthropic-beta", ANTHROPIC_BETA)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .call()
            .map_err(|e| {
                warn!("Usage request failed: {}", e);
                FetchError::Network(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::Network(format!("failed to read response: {}", e)))?;

        debug!("Usage request completed: HTTP {}", status);
        interpret_response(status, &body)
    }
}

/// Map a status code and body to a snapshot or a typed failure
pub fn interpret_response(status: u16, body: &str) -> Result<UsageSnapshot, FetchError> {
    match status {
        200 => serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string())),
        401 => Err(FetchError::AuthExpired),
        status => Err(FetchError::Api {
            status,
            body: body.trim().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_ok() {
        let snapshot =
            interpret_response(200, r#"{"five_hour":{"utilization":42.0,"resets_at":null}}"#)
                .unwrap();
        assert_eq!(snapshot.five_hour.unwrap().utilization, 42.0);
        assert!(snapshot.seven_day.is_none());
    }

    #[test]
    fn test_interpret_unauthorized() {
        assert_eq!(
            interpret_response(401, "{}").unwrap_err(),
            FetchError::AuthExpired
        );
    }

    #[test]
    fn test_interpret_other_status() {
        let err = interpret_response(503, "overloaded\n").unwrap_err();
        assert_eq!(
            err,
            FetchError::Api {
                status: 503,
                body: "overloaded".to_string()
            }
        );
        assert_eq!(err.to_string(), "API error (HTTP 503): overloaded");
    }

    #[test]
    fn test_interpret_bad_json() {
        assert!(matches!(
            interpret_response(200, "<html>"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        // Port 9 on localhost: connection refused without leaving the machine
        let client = QuotaClient::new("token", Duration::from_secs(2))
            .with_url("http://127.0.0.1:9/api/oauth/usage");
        assert!(matches!(
            client.fetch_usage(),
            Err(FetchError::Network(_))
        ));
    }
}
