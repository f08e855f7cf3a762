//! Text helpers for reset times and the footer.

use chrono::{DateTime, Local, Utc};

/// Placeholder for a window that does not reset under current usage
pub const NO_RESET: &str = "—";

/// Human-readable reset time relative to `now`
pub fn format_reset(resets_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(resets_at) = resets_at else {
        return NO_RESET.to_string();
    };

    let until = resets_at - now;
    let millis = until.num_milliseconds();
    if millis <= 0 {
        return "resetting...".to_string();
    }

    const MINUTE_MS: i64 = 60_000;
    const HOUR_MS: i64 = 60 * MINUTE_MS;
    if millis < HOUR_MS {
        let minutes = (millis + MINUTE_MS - 1) / MINUTE_MS;
        return format!("resets in {}m", minutes);
    }
    if millis < 24 * HOUR_MS {
        let hours = millis / HOUR_MS;
        let minutes = (millis / MINUTE_MS) % 60;
        return format!("resets in {}h {}m", hours, minutes);
    }

    format!(
        "resets {}",
        resets_at.with_timezone(&Local).format("%a %b %-d")
    )
}

/// Footer combining the plan tier and the last update time
pub fn footer_text(plan: Option<&str>, last_fetch: Option<DateTime<Utc>>) -> Option<String> {
    let plan = plan.filter(|p| !p.is_empty()).map(capitalize);
    let updated = last_fetch.map(|t| format!("updated {}", t.with_timezone(&Local).format("%H:%M")));

    match (plan, updated) {
        (Some(plan), Some(updated)) => Some(format!("{}  •  {}", plan, updated)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_format_reset_relative() {
        let now = now();
        assert_eq!(format_reset(None, now), "—");
        assert_eq!(format_reset(Some(now), now), "resetting...");
        assert_eq!(
            format_reset(Some(now - Duration::seconds(5)), now),
            "resetting..."
        );
        assert_eq!(
            format_reset(Some(now + Duration::seconds(90)), now),
            "resets in 2m"
        );
        assert_eq!(
            format_reset(Some(now + Duration::seconds(1)), now),
            "resets in 1m"
        );
        assert_eq!(
            format_reset(Some(now + Duration::minutes(150)), now),
            "resets in 2h 30m"
        );
        assert_eq!(
            format_reset(Some(now + Duration::hours(23) + Duration::minutes(59)), now),
            "resets in 23h 59m"
        );
    }

    #[test]
    fn test_format_reset_far() {
        let now = now();
        let reset = now + Duration::hours(26);
        let local = reset.with_timezone(&Local);
        let expected = format!("resets {}", local.format("%a %b %-d"));

        let text = format_reset(Some(reset), now);
        assert_eq!(text, expected);
        assert!(!text.contains(" in "));
    }

    #[test]
    fn test_footer_text() {
        let fetched = now();
        let stamp = fetched.with_timezone(&Local).format("%H:%M").to_string();

        assert_eq!(
            footer_text(Some("max"), Some(fetched)),
            Some(format!("Max  •  updated {}", stamp))
        );
        assert_eq!(footer_text(Some("pro"), None), Some("Pro".to_string()));
        assert_eq!(
            footer_text(None, Some(fetched)),
            Some(format!("updated {}", stamp))
        );
        assert_eq!(footer_text(Some(""), None), None);
        assert_eq!(footer_text(None, None), None);
    }
}
