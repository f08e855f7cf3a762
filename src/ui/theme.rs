use ratatui::style::{Color, Modifier, Style};

/// Style table, built once at startup and passed to the renderer
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub spinner: Style,
    pub label: Style,
    pub percent: Style,
    pub percent_hover: Style,
    pub reset: Style,
    pub error: Style,
    pub stale: Style,
    pub footer: Style,
    pub border: Style,
    pub bar_empty: Style,
    /// Bar gradient endpoints (low utilization to high)
    pub gradient: [(u8, u8, u8); 2],
}

impl Default for Theme {
    fn default() -> Self {
        let accent = Color::Indexed(99);
        let muted = Color::Indexed(243);

        Self {
            title: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            spinner: Style::default().fg(accent),
            label: Style::default().fg(Color::Indexed(252)),
            percent: Style::default().fg(Color::Indexed(252)),
            percent_hover: Style::default()
                .fg(Color::Indexed(255))
                .add_modifier(Modifier::BOLD),
            reset: Style::default().fg(muted),
            error: Style::default().fg(Color::Indexed(196)),
            stale: Style::default().fg(muted).add_modifier(Modifier::ITALIC),
            footer: Style::default().fg(muted),
            border: Style::default().fg(accent),
            bar_empty: Style::default().fg(Color::Indexed(238)),
            gradient: [(0x76, 0xEE, 0xC6), (0xFF, 0x63, 0x47)],
        }
    }
}

impl Theme {
    /// Gradient color at `t` in [0, 1]
    pub fn gradient_at(&self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let [(r0, g0, b0), (r1, g1, b1)] = self.gradient;
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::Rgb(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let theme = Theme::default();
        assert_eq!(theme.gradient_at(0.0), Color::Rgb(0x76, 0xEE, 0xC6));
        assert_eq!(theme.gradient_at(1.0), Color::Rgb(0xFF, 0x63, 0x47));
        assert_eq!(theme.gradient_at(7.0), theme.gradient_at(1.0));
    }
}
