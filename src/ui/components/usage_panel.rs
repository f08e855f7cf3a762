//! Quota panel: title, one bar per present bucket, and the footer.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Padding, Paragraph},
    Frame,
};

use ccquota_core::dashboard::{footer_text, format_reset, DashboardState};
use ccquota_core::tokens::{format_token_count, TokenStats};
use ccquota_core::usage::{BarKind, UsageBucket};

use crate::ui::Theme;

/// Label column width; the reset line is indented by the same amount
const LABEL_WIDTH: usize = 16;
/// Border plus padding on each side
const HORIZONTAL_CHROME: u16 = 2 + 4;
const VERTICAL_CHROME: u16 = 2 + 2;

/// Usage panel widget
pub struct UsagePanel;

impl UsagePanel {
    /// Render the panel anchored at the top-left of `area`
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        state: &DashboardState,
        theme: &Theme,
        now: DateTime<Utc>,
    ) {
        let lines = Self::lines(state, theme, now);
        let content_width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
        let panel = Rect {
            x: area.x,
            y: area.y,
            width: (content_width + HORIZONTAL_CHROME).min(area.width),
            height: (lines.len() as u16 + VERTICAL_CHROME).min(area.height),
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme.border)
            .padding(Padding::new(2, 2, 1, 1));

        frame.render_widget(Paragraph::new(lines).block(block), panel);
    }

    /// Panel content lines, without border or padding
    pub fn lines(state: &DashboardState, theme: &Theme, now: DateTime<Utc>) -> Vec<Line<'static>> {
        let mut lines = vec![Self::title_line(state, theme), Line::default()];

        if let (true, Some(err)) = (state.is_error_only(), &state.error) {
            lines.push(Line::from(Span::styled(format!("  {}", err), theme.error)));
            return lines;
        }

        if let Some(usage) = &state.usage {
            for kind in usage.present_bars() {
                if let Some(bucket) = usage.bucket(kind) {
                    lines.extend(Self::bar_lines(state, theme, kind, bucket, now));
                }
            }
        }

        if let (true, Some(err)) = (state.stale, &state.error) {
            lines.push(Line::from(Span::styled(format!("  {}", err), theme.stale)));
            lines.push(Line::default());
        }

        if let Some(tokens) = &state.tokens {
            lines.push(Self::token_line(tokens, theme));
            lines.push(Line::default());
        }

        if let Some(footer) = footer_text(state.plan.as_deref(), state.last_fetch) {
            lines.push(Line::from(Span::styled(footer, theme.footer)));
        }

        lines
    }

    fn title_line(state: &DashboardState, theme: &Theme) -> Line<'static> {
        let mut spans = vec![Span::styled("claude-usage", theme.title)];
        if state.loading {
            spans.push(Span::styled(
                format!("  {}", state.spinner_char()),
                theme.spinner,
            ));
        } else if state.stale {
            spans.push(Span::styled("  stale", theme.stale));
        }
        Line::from(spans)
    }

    /// Bar line, reset line, separator
    fn bar_lines(
        state: &DashboardState,
        theme: &Theme,
        kind: BarKind,
        bucket: &UsageBucket,
        now: DateTime<Utc>,
    ) -> [Line<'static>; 3] {
        let hovered = state.hovered == Some(kind);
        let percent = if hovered {
            Span::styled(
                format!("{:>8}", format!("{:.2}%", bucket.percent())),
                theme.percent_hover,
            )
        } else {
            Span::styled(
                format!("{:>6}", format!("{:.0}%", bucket.percent())),
                theme.percent,
            )
        };

        let mut spans = vec![Span::styled(
            format!("{:w$}", kind.label(), w = LABEL_WIDTH),
            theme.label,
        )];
        spans.extend(Self::bar_spans(
            state.bar(kind).position,
            state.bar_width,
            theme,
        ));
        spans.push(Span::raw(" "));
        spans.push(percent);

        let reset = format!(
            "{:w$}{}",
            "",
            format_reset(bucket.resets_at, now),
            w = LABEL_WIDTH
        );

        [
            Line::from(spans),
            Line::from(Span::styled(reset, theme.reset)),
            Line::default(),
        ]
    }

    /// Filled cells follow the gradient across the filled part only
    fn bar_spans(position: f64, width: u16, theme: &Theme) -> Vec<Span<'static>> {
        let width = width as usize;
        let filled = ((position.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);

        let mut spans: Vec<Span<'static>> = (0..filled)
            .map(|i| {
                let t = if filled > 1 {
                    i as f64 / (filled - 1) as f64
                } else {
                    0.0
                };
                Span::styled("█", Style::default().fg(theme.gradient_at(t)))
            })
            .collect();
        if filled < width {
            spans.push(Span::styled("░".repeat(width - filled), theme.bar_empty));
        }
        spans
    }

    fn token_line(tokens: &TokenStats, theme: &Theme) -> Line<'static> {
        Line::from(Span::styled(
            format!(
                "tokens {}  (in {} · out {} · cache {}/{})",
                format_token_count(tokens.total()),
                format_token_count(tokens.input),
                format_token_count(tokens.output),
                format_token_count(tokens.cache_write),
                format_token_count(tokens.cache_read),
            ),
            theme.footer,
        ))
    }
}
