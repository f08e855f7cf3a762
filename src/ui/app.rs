use anyhow::Result;
use chrono::Utc;
use crossterm::event::EventStream;
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ccquota_core::credentials::Credentials;
use ccquota_core::dashboard::{Dashboard, Effect, Event};
use ccquota_core::tokens::{aggregate_sources, default_sources, LogSource};
use ccquota_core::usage::{FetchError, QuotaClient, UsageSource};

use crate::config::Settings;

use super::components::UsagePanel;
use super::input;
use super::Theme;

type EventSender = mpsc::UnboundedSender<Event>;

/// Idle redraw period so relative reset times keep counting down
const IDLE_REDRAW: Duration = Duration::from_secs(1);

/// How long exit waits for blocking fetches and scans still running
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Stop the runtime without waiting for in-flight blocking work
pub fn shutdown_runtime(runtime: Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

/// Main application: owns the dashboard and runs the event loop
pub struct App {
    settings: Settings,
    dashboard: Dashboard,
    source: Arc<dyn UsageSource>,
    log_sources: Arc<Vec<LogSource>>,
    theme: Theme,
}

impl App {
    /// Create an application that queries the usage endpoint with `credentials`
    pub fn new(settings: Settings, credentials: Credentials) -> Self {
        let client = QuotaClient::new(credentials.access_token, settings.request_timeout());
        let log_sources = default_sources(
            &settings.tokens.claude_roots,
            &settings.tokens.codex_roots,
        );
        Self::with_source(settings, Arc::new(client), log_sources, credentials.plan)
    }

    /// Create an application over an arbitrary usage source
    pub fn with_source(
        settings: Settings,
        source: Arc<dyn UsageSource>,
        log_sources: Vec<LogSource>,
        plan: Option<String>,
    ) -> Self {
        let dashboard = Dashboard::new(settings.dashboard_config(), plan);
        Self {
            settings,
            dashboard,
            source,
            log_sources: Arc::new(log_sources),
            theme: Theme::default(),
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::event::EnableMouseCapture
        )?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let input_task = spawn_input(tx.clone());
        let ticker_task = spawn_ticker(tx.clone(), self.settings.frame_interval());

        let size = terminal.size()?;
        self.dispatch(
            Event::Resize {
                width: size.width,
                height: size.height,
            },
            &tx,
        );
        self.dispatch(Event::Startup, &tx);

        let mut dirty = true;
        let mut last_draw = Instant::now();
        loop {
            if self.dashboard.is_quitting() {
                break;
            }

            if dirty || last_draw.elapsed() >= IDLE_REDRAW {
                terminal.draw(|frame| {
                    UsagePanel::render(
                        frame,
                        frame.area(),
                        self.dashboard.state(),
                        &self.theme,
                        Utc::now(),
                    );
                })?;
                dirty = false;
                last_draw = Instant::now();
            }

            let Some(event) = rx.recv().await else {
                break;
            };
            dirty |= self.handle(event, &tx);

            // Apply everything already queued before drawing again
            while let Ok(event) = rx.try_recv() {
                dirty |= self.handle(event, &tx);
            }
        }

        // In-flight fetches and scans are abandoned; see `shutdown_runtime`
        input_task.abort();
        ticker_task.abort();
        Ok(())
    }

    /// Apply one event. Returns whether the frame needs redrawing.
    fn handle(&mut self, event: Event, tx: &EventSender) -> bool {
        if matches!(event, Event::AnimationFrame) && !self.dashboard.needs_animation_frame() {
            return false;
        }
        self.dispatch(event, tx);
        true
    }

    fn dispatch(&mut self, event: Event, tx: &EventSender) {
        let effects = self.dashboard.update(event, Utc::now());
        for effect in effects {
            self.execute(effect, tx);
        }
    }

    /// Run one effect on a separate task; results come back as events
    fn execute(&self, effect: Effect, tx: &EventSender) {
        match effect {
            Effect::Fetch => {
                debug!("Starting usage fetch");
                let source = Arc::clone(&self.source);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = tokio::task::spawn_blocking(move || source.fetch_usage())
                        .await
                        .unwrap_or_else(|e| {
                            Err(FetchError::Network(format!("fetch task failed: {}", e)))
                        });
                    let _ = tx.send(Event::FetchCompleted(result));
                });
            }
            Effect::ArmRefreshTimer(delay) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Event::RefreshTimer);
                });
            }
            Effect::ScanTokens { since } => {
                let sources = Arc::clone(&self.log_sources);
                let tx = tx.clone();
                tokio::spawn(async move {
                    match tokio::task::spawn_blocking(move || aggregate_sources(&sources, since))
                        .await
                    {
                        Ok(stats) => {
                            let _ = tx.send(Event::TokensScanned(stats));
                        }
                        Err(e) => warn!("Token scan task failed: {}", e),
                    }
                });
            }
            Effect::Quit => {}
        }
    }
}

/// Forward terminal input until the queue closes or the stream ends
fn spawn_input(tx: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(result) = events.next().await {
            match result {
                Ok(event) => {
                    if let Some(event) = input::translate(event) {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!("Terminal input error: {}", e);
                    break;
                }
            }
        }
    })
}

/// Animation ticker
fn spawn_ticker(tx: EventSender, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(Event::AnimationFrame).is_err() {
                break;
            }
        }
    })
}
