use std::fs::{self, File};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ccquota::config::{Command, Config, Settings};
use ccquota::report;
use ccquota::ui::{shutdown_runtime, App};
use ccquota_core::credentials::load_credentials;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    if let Some(Command::Tokens { .. }) = cli.command {
        return report::run(&settings);
    }

    // Without credentials there is nothing to show
    let credentials = load_credentials().context("Failed to load Claude credentials")?;
    info!(
        "Starting dashboard (refresh every {}s)",
        settings.refresh_interval_secs
    );

    // Run the application; dropping a runtime would wait on blocking fetches
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(async {
        let mut app = App::new(settings, credentials);
        app.run().await
    });
    shutdown_runtime(runtime);
    result
}

/// Log to a file; the dashboard owns the terminal
fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("ccquota=debug,ccquota_core=debug")
    } else {
        EnvFilter::new("ccquota=info,ccquota_core=info")
    };

    let Some(log_dir) = dirs::cache_dir().map(|p| p.join("ccquota")) else {
        return;
    };
    if fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = File::create(log_dir.join("ccquota.log")) else {
        return;
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}
