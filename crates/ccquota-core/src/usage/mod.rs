//! Usage quota: snapshot types and the endpoint client.

pub mod client;
pub mod types;

pub use client::{interpret_response, FetchError, QuotaClient, UsageSource, DEFAULT_TIMEOUT};
pub use types::{BarKind, UsageBucket, UsageSnapshot};
