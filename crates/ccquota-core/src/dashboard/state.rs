use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::animation::BarAnimation;
use super::event::{Effect, Event};
use super::layout::{bar_width_for, hit_test, DEFAULT_BAR_WIDTH};
use crate::tokens::{window_start, TokenStats};
use crate::usage::{BarKind, FetchError, UsageSnapshot};

/// Spinner frames for the loading indicator
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SPINNER_INTERVAL_MS: i64 = 100;

/// Timing parameters of the dashboard
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Period of the automatic refresh
    pub refresh_interval: Duration,
    /// Minimum spacing between manual refreshes
    pub refresh_debounce: Duration,
    /// Window for local token totals; `None` disables token scanning
    pub token_window: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5 * 60),
            refresh_debounce: Duration::from_secs(10),
            token_window: Some(Duration::from_secs(5 * 60 * 60)),
        }
    }
}

/// Everything the renderer needs. Only the reducer mutates it.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Last successfully fetched snapshot
    pub usage: Option<UsageSnapshot>,
    /// Error from the most recent failed fetch
    pub error: Option<FetchError>,
    /// Serving `usage` after a later fetch failed
    pub stale: bool,
    /// When `usage` was fetched
    pub last_fetch: Option<DateTime<Utc>>,
    /// A fetch is in flight
    pub loading: bool,
    /// Last accepted manual refresh (debounce)
    pub last_manual_refresh: Option<DateTime<Utc>>,
    /// Bar under the pointer
    pub hovered: Option<BarKind>,
    pub width: u16,
    pub height: u16,
    /// Rendered bar width in cells
    pub bar_width: u16,
    pub spinner_frame: usize,
    last_spinner_at: Option<DateTime<Utc>>,
    /// Subscription tier from the credentials
    pub plan: Option<String>,
    /// Local token totals for the configured window
    pub tokens: Option<TokenStats>,
    bars: [BarAnimation; 3],
}

impl DashboardState {
    fn new(plan: Option<String>) -> Self {
        Self {
            usage: None,
            error: None,
            stale: false,
            last_fetch: None,
            loading: false,
            last_manual_refresh: None,
            hovered: None,
            width: 0,
            height: 0,
            bar_width: DEFAULT_BAR_WIDTH,
            spinner_frame: 0,
            last_spinner_at: None,
            plan,
            tokens: None,
            bars: [BarAnimation::default(); 3],
        }
    }

    pub fn bar(&self, kind: BarKind) -> &BarAnimation {
        &self.bars[kind.index()]
    }

    /// Bars the renderer draws, in order
    pub fn present_bars(&self) -> Vec<BarKind> {
        self.usage
            .as_ref()
            .map(UsageSnapshot::present_bars)
            .unwrap_or_default()
    }

    /// No fetch has ever succeeded and the last one failed
    pub fn is_error_only(&self) -> bool {
        self.usage.is_none() && self.error.is_some()
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }
}

/// Event-sourced dashboard: a reducer from events to state plus effects
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    state: DashboardState,
    quitting: bool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, plan: Option<String>) -> Self {
        Self {
            config,
            state: DashboardState::new(plan),
            quitting: false,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Whether an animation frame would change anything
    pub fn needs_animation_frame(&self) -> bool {
        self.state.loading || self.state.bars.iter().any(BarAnimation::is_animating)
    }

    /// Apply one event and return the work it triggers
    pub fn update(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Effect> {
        if self.quitting {
            return Vec::new();
        }

        match event {
            Event::Startup => {
                info!("Dashboard starting");
                self.state.loading = true;
                let mut effects = vec![
                    Effect::Fetch,
                    Effect::ArmRefreshTimer(self.config.refresh_interval),
                ];
                effects.extend(self.token_scan(now));
                effects
            }
            Event::FetchCompleted(Ok(snapshot)) => self.apply_snapshot(snapshot, now),
            Event::FetchCompleted(Err(error)) => {
                self.apply_failure(error);
                Vec::new()
            }
            Event::RefreshTimer => {
                debug!("Refresh timer fired");
                self.state.loading = true;
                vec![
                    Effect::Fetch,
                    Effect::ArmRefreshTimer(self.config.refresh_interval),
                ]
            }
            Event::ManualRefresh => self.manual_refresh(now),
            Event::Quit => {
                info!("Dashboard quitting");
                self.quitting = true;
                vec![Effect::Quit]
            }
            Event::Resize { width, height } => {
                self.state.width = width;
                self.state.height = height;
                self.state.bar_width = bar_width_for(width);
                Vec::new()
            }
            Event::AnimationFrame => {
                for bar in &mut self.state.bars {
                    bar.step();
                }
                self.tick_spinner(now);
                Vec::new()
            }
            Event::Pointer { row } => {
                let present = self.state.present_bars();
                self.state.hovered = hit_test(row, &present);
                Vec::new()
            }
            Event::TokensScanned(stats) => {
                self.state.tokens = Some(stats);
                Vec::new()
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: UsageSnapshot, now: DateTime<Utc>) -> Vec<Effect> {
        for kind in BarKind::ALL {
            if let Some(bucket) = snapshot.bucket(kind) {
                self.state.bars[kind.index()].set_target(bucket.fraction());
            }
        }
        debug!("Usage snapshot applied: {:?}", snapshot.present_bars());

        self.state.usage = Some(snapshot);
        self.state.error = None;
        self.state.stale = false;
        self.state.last_fetch = Some(now);
        self.state.loading = false;
        self.token_scan(now).into_iter().collect()
    }

    fn apply_failure(&mut self, error: FetchError) {
        warn!("Usage fetch failed: {}", error);
        self.state.loading = false;
        self.state.stale = self.state.usage.is_some();
        self.state.error = Some(error);
    }

    fn manual_refresh(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let debounce = chrono::Duration::from_std(self.config.refresh_debounce)
            .unwrap_or(chrono::Duration::MAX);
        if let Some(last) = self.state.last_manual_refresh {
            if now - last < debounce {
                debug!("Manual refresh ignored (debounce)");
                return Vec::new();
            }
        }
        self.state.last_manual_refresh = Some(now);
        self.state.loading = true;
        vec![Effect::Fetch]
    }

    /// Start of the token window: the session block start when the session
    /// bucket reports its reset, otherwise `now - window`.
    fn token_scan(&self, now: DateTime<Utc>) -> Option<Effect> {
        let window = self.config.token_window?;
        let block_start = self
            .state
            .usage
            .as_ref()
            .and_then(|usage| usage.five_hour.as_ref())
            .and_then(|bucket| bucket.resets_at)
            .filter(|reset| *reset > now)
            .map(|reset| window_start(reset, window));
        let since = block_start.unwrap_or_else(|| window_start(now, window)).min(now);
        Some(Effect::ScanTokens { since })
    }

    fn tick_spinner(&mut self, now: DateTime<Utc>) {
        if !self.state.loading {
            return;
        }
        let due = self
            .state
            .last_spinner_at
            .map_or(true, |last| (now - last).num_milliseconds() >= SPINNER_INTERVAL_MS);
        if due {
            self.state.spinner_frame = (self.state.spinner_frame + 1) % SPINNER_FRAMES.len();
            self.state.last_spinner_at = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageBucket;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    fn bucket(utilization: f64) -> UsageBucket {
        UsageBucket {
            utilization,
            resets_at: None,
        }
    }

    fn full_snapshot() -> UsageSnapshot {
        UsageSnapshot {
            five_hour: Some(bucket(42.0)),
            seven_day: Some(bucket(10.0)),
            seven_day_opus: Some(bucket(5.0)),
        }
    }

    fn no_tokens() -> DashboardConfig {
        DashboardConfig {
            token_window: None,
            ..Default::default()
        }
    }

    fn count_fetches(effects: &[Effect]) -> usize {
        effects.iter().filter(|e| **e == Effect::Fetch).count()
    }

    #[test]
    fn test_startup_fetches_and_arms_timer() {
        let mut dash = Dashboard::new(no_tokens(), None);
        let effects = dash.update(Event::Startup, t0());

        assert!(dash.state().loading);
        assert_eq!(
            effects,
            vec![
                Effect::Fetch,
                Effect::ArmRefreshTimer(Duration::from_secs(300))
            ]
        );
    }

    #[test]
    fn test_startup_scans_tokens_over_window() {
        let mut dash = Dashboard::new(DashboardConfig::default(), None);
        let effects = dash.update(Event::Startup, t0());
        assert!(effects.contains(&Effect::ScanTokens {
            since: t0() - chrono::Duration::hours(5)
        }));
    }

    #[test]
    fn test_success_sets_snapshot_and_targets() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::Startup, t0());
        dash.update(Event::FetchCompleted(Ok(full_snapshot())), t0());

        let state = dash.state();
        assert!(!state.loading);
        assert!(!state.stale);
        assert!(state.error.is_none());
        assert_eq!(state.last_fetch, Some(t0()));
        assert_eq!(state.bar(BarKind::Session).target, Some(0.42));
        assert_eq!(state.bar(BarKind::Premium).target, Some(0.05));
        assert!(dash.needs_animation_frame());
    }

    #[test]
    fn test_first_failure_is_error_only() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::Startup, t0());
        dash.update(
            Event::FetchCompleted(Err(FetchError::Network("dns".into()))),
            t0(),
        );

        let state = dash.state();
        assert!(!state.loading);
        assert!(!state.stale);
        assert!(state.is_error_only());
    }

    #[test]
    fn test_failure_after_success_serves_stale() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::FetchCompleted(Ok(full_snapshot())), t0());
        dash.update(Event::RefreshTimer, t0() + secs(300));
        dash.update(
            Event::FetchCompleted(Err(FetchError::AuthExpired)),
            t0() + secs(301),
        );

        let state = dash.state();
        assert!(state.stale);
        assert_eq!(state.error, Some(FetchError::AuthExpired));
        assert_eq!(state.usage, Some(full_snapshot()));
        assert_eq!(state.last_fetch, Some(t0()));
        assert!(!state.is_error_only());
    }

    #[test]
    fn test_success_clears_stale_even_with_fewer_buckets() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::FetchCompleted(Ok(full_snapshot())), t0());
        dash.update(
            Event::FetchCompleted(Err(FetchError::Parse("eof".into()))),
            t0() + secs(10),
        );
        assert!(dash.state().stale);

        let smaller = UsageSnapshot {
            five_hour: Some(bucket(50.0)),
            ..Default::default()
        };
        dash.update(Event::FetchCompleted(Ok(smaller.clone())), t0() + secs(20));

        let state = dash.state();
        assert!(!state.stale);
        assert!(state.error.is_none());
        assert_eq!(state.usage, Some(smaller));
        assert_eq!(state.present_bars(), vec![BarKind::Session]);
    }

    #[test]
    fn test_manual_refresh_debounce() {
        let mut dash = Dashboard::new(no_tokens(), None);

        let first = dash.update(Event::ManualRefresh, t0());
        let second = dash.update(Event::ManualRefresh, t0() + secs(3));
        assert_eq!(count_fetches(&first) + count_fetches(&second), 1);

        let mut dash = Dashboard::new(no_tokens(), None);
        let first = dash.update(Event::ManualRefresh, t0());
        let second = dash.update(Event::ManualRefresh, t0() + secs(11));
        assert_eq!(count_fetches(&first) + count_fetches(&second), 2);
        assert_eq!(dash.state().last_manual_refresh, Some(t0() + secs(11)));
    }

    #[test]
    fn test_debounced_refresh_changes_nothing() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::ManualRefresh, t0());
        dash.update(Event::FetchCompleted(Ok(full_snapshot())), t0() + secs(1));

        let effects = dash.update(Event::ManualRefresh, t0() + secs(2));
        assert!(effects.is_empty());
        assert!(!dash.state().loading);
        assert_eq!(dash.state().last_manual_refresh, Some(t0()));
    }

    #[test]
    fn test_timer_not_blocked_by_manual_refresh() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::ManualRefresh, t0());
        let effects = dash.update(Event::RefreshTimer, t0() + secs(1));
        assert_eq!(count_fetches(&effects), 1);
        assert!(effects.contains(&Effect::ArmRefreshTimer(Duration::from_secs(300))));
    }

    #[test]
    fn test_last_completion_wins() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::RefreshTimer, t0());
        dash.update(Event::ManualRefresh, t0());

        let older = UsageSnapshot {
            five_hour: Some(bucket(1.0)),
            ..Default::default()
        };
        dash.update(Event::FetchCompleted(Ok(full_snapshot())), t0() + secs(1));
        dash.update(Event::FetchCompleted(Ok(older.clone())), t0() + secs(2));
        assert_eq!(dash.state().usage, Some(older));
    }

    #[test]
    fn test_quit_stops_processing() {
        let mut dash = Dashboard::new(no_tokens(), None);
        assert_eq!(dash.update(Event::Quit, t0()), vec![Effect::Quit]);
        assert!(dash.is_quitting());

        assert!(dash.update(Event::RefreshTimer, t0()).is_empty());
        assert!(dash
            .update(Event::FetchCompleted(Ok(full_snapshot())), t0())
            .is_empty());
        assert!(dash.state().usage.is_none());
    }

    #[test]
    fn test_resize_sets_bar_width() {
        let mut dash = Dashboard::new(no_tokens(), None);
        assert_eq!(dash.state().bar_width, 30);

        dash.update(
            Event::Resize {
                width: 75,
                height: 20,
            },
            t0(),
        );
        assert_eq!(dash.state().width, 75);
        assert_eq!(dash.state().height, 20);
        assert_eq!(dash.state().bar_width, 35);
        assert!(dash.state().usage.is_none());
    }

    #[test]
    fn test_animation_converges() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::FetchCompleted(Ok(full_snapshot())), t0());

        let mut frames = 0;
        while dash.needs_animation_frame() {
            dash.update(Event::AnimationFrame, t0());
            frames += 1;
            assert!(frames < 500, "bars never settled");
        }
        assert_eq!(dash.state().bar(BarKind::Session).position, 0.42);
        assert_eq!(dash.state().bar(BarKind::Weekly).position, 0.10);
    }

    #[test]
    fn test_spinner_advances_only_while_loading() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::AnimationFrame, t0());
        assert_eq!(dash.state().spinner_frame, 0);

        dash.update(Event::Startup, t0());
        dash.update(Event::AnimationFrame, t0());
        assert_eq!(dash.state().spinner_frame, 1);
        dash.update(Event::AnimationFrame, t0() + chrono::Duration::milliseconds(50));
        assert_eq!(dash.state().spinner_frame, 1);
        dash.update(Event::AnimationFrame, t0() + chrono::Duration::milliseconds(120));
        assert_eq!(dash.state().spinner_frame, 2);
    }

    #[test]
    fn test_pointer_hover() {
        let mut dash = Dashboard::new(no_tokens(), None);
        dash.update(Event::FetchCompleted(Ok(full_snapshot())), t0());

        dash.update(Event::Pointer { row: 8 }, t0());
        assert_eq!(dash.state().hovered, Some(BarKind::Weekly));
        dash.update(Event::Pointer { row: 9 }, t0());
        assert_eq!(dash.state().hovered, None);
        dash.update(Event::Pointer { row: 4 }, t0());
        assert_eq!(dash.state().hovered, Some(BarKind::Session));
        dash.update(Event::Pointer { row: 1 }, t0());
        assert_eq!(dash.state().hovered, None);
    }

    #[test]
    fn test_success_scans_current_session_block() {
        let mut dash = Dashboard::new(DashboardConfig::default(), None);
        let reset = t0() + chrono::Duration::hours(2);
        let snapshot = UsageSnapshot {
            five_hour: Some(UsageBucket {
                utilization: 20.0,
                resets_at: Some(reset),
            }),
            ..Default::default()
        };

        let effects = dash.update(Event::FetchCompleted(Ok(snapshot)), t0());
        assert_eq!(
            effects,
            vec![Effect::ScanTokens {
                since: reset - chrono::Duration::hours(5)
            }]
        );

        dash.update(Event::TokensScanned(TokenStats::default()), t0());
        assert_eq!(dash.state().tokens, Some(TokenStats::default()));
    }

    #[test]
    fn test_huge_token_window_does_not_panic() {
        let config = DashboardConfig {
            token_window: Some(Duration::from_secs(10_000_000_000 * 3600)),
            ..Default::default()
        };
        let mut dash = Dashboard::new(config, None);

        let effects = dash.update(Event::Startup, t0());
        assert!(effects.contains(&Effect::ScanTokens {
            since: DateTime::<Utc>::MIN_UTC
        }));

        let snapshot = UsageSnapshot {
            five_hour: Some(UsageBucket {
                utilization: 1.0,
                resets_at: Some(t0() + secs(60)),
            }),
            ..Default::default()
        };
        let effects = dash.update(Event::FetchCompleted(Ok(snapshot)), t0());
        assert_eq!(
            effects,
            vec![Effect::ScanTokens {
                since: DateTime::<Utc>::MIN_UTC
            }]
        );
    }
}
