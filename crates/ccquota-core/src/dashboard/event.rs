use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::tokens::TokenStats;
use crate::usage::{FetchError, UsageSnapshot};

/// Input to the dashboard reducer. Every source (timers, network, terminal)
/// posts one of these onto the same queue.
#[derive(Debug, Clone)]
pub enum Event {
    /// First event after launch
    Startup,
    /// A quota fetch finished
    FetchCompleted(Result<UsageSnapshot, FetchError>),
    /// The periodic refresh timer fired
    RefreshTimer,
    /// User asked for a refresh
    ManualRefresh,
    /// User asked to quit
    Quit,
    /// Terminal size changed
    Resize { width: u16, height: u16 },
    /// Animation ticker
    AnimationFrame,
    /// Pointer moved to terminal row `row`
    Pointer { row: u16 },
    /// A token log scan finished
    TokensScanned(TokenStats),
}

/// Follow-up work requested by the reducer, executed by the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start one asynchronous quota fetch
    Fetch,
    /// Post `Event::RefreshTimer` after the given delay
    ArmRefreshTimer(Duration),
    /// Aggregate token logs written since the given instant
    ScanTokens { since: DateTime<Utc> },
    /// Stop the event loop
    Quit,
}
