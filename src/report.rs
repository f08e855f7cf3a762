//! `ccquota tokens`: one-shot token totals from local session logs.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use ccquota_core::tokens::{
    aggregate_sources, default_sources, format_token_count, window_start, TokenStats,
};

use crate::config::Settings;

/// Totals for one log ecosystem
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: &'static str,
    pub roots: usize,
    pub stats: TokenStats,
}

/// Aggregate every configured source over the settings' window and print the table
pub fn run(settings: &Settings) -> Result<()> {
    let since = window_start(Utc::now(), settings.token_window());

    let sources = default_sources(&settings.tokens.claude_roots, &settings.tokens.codex_roots);
    let rows: Vec<ReportRow> = sources
        .iter()
        .map(|source| ReportRow {
            name: source.name(),
            roots: source.roots.len(),
            stats: aggregate_sources(std::slice::from_ref(source), since),
        })
        .collect();

    info!("Token report over {}h since {}", settings.tokens.window_hours, since);
    print!("{}", render(&rows, settings.tokens.window_hours, since));
    Ok(())
}

/// Format the report table
pub fn render(rows: &[ReportRow], window_hours: u64, since: DateTime<Utc>) -> String {
    let mut out = String::new();
    let start = if since == DateTime::<Utc>::MIN_UTC {
        "the start of the logs".to_string()
    } else {
        since
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    };
    let _ = writeln!(out, "Token usage, last {}h (since {})", window_hours, start);
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "source", "total", "input", "output", "cache w", "cache r"
    );

    for row in rows {
        if row.roots == 0 {
            let _ = writeln!(out, "{:<10} (no log directories found)", row.name);
            continue;
        }
        push_row(&mut out, row.name, &row.stats);
    }

    let combined: TokenStats = rows.iter().map(|row| row.stats).sum();
    push_row(&mut out, "combined", &combined);
    out
}

fn push_row(out: &mut String, name: &str, stats: &TokenStats) {
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        name,
        format_token_count(stats.total()),
        format_token_count(stats.input),
        format_token_count(stats.output),
        format_token_count(stats.cache_write),
        format_token_count(stats.cache_read),
    );
}
