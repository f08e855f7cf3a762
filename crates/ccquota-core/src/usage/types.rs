//! Quota snapshot types returned by the OAuth usage endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One usage-limit window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageBucket {
    /// Utilization percentage (0.0-100.0)
    pub utilization: f64,
    /// When the window resets; `None` when it does not reset under current usage
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub resets_at: Option<DateTime<Utc>>,
}

impl UsageBucket {
    /// Utilization clamped to [0, 100]
    pub fn percent(&self) -> f64 {
        if self.utilization.is_nan() {
            return 0.0;
        }
        self.utilization.clamp(0.0, 100.0)
    }

    /// Utilization as a bar fraction in [0, 1]
    pub fn fraction(&self) -> f64 {
        self.percent() / 100.0
    }
}

/// Complete quota snapshot. An absent bucket means that limit does not
/// apply to the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Rolling 5-hour session window
    #[serde(default)]
    pub five_hour: Option<UsageBucket>,
    /// Rolling 7-day window (all models)
    #[serde(default)]
    pub seven_day: Option<UsageBucket>,
    /// Rolling 7-day window for the premium model
    #[serde(default)]
    pub seven_day_opus: Option<UsageBucket>,
}

/// The three quota bars, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BarKind {
    Session,
    Weekly,
    Premium,
}

impl BarKind {
    pub const ALL: [BarKind; 3] = [BarKind::Session, BarKind::Weekly, BarKind::Premium];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            BarKind::Session => "Session (5h)",
            BarKind::Weekly => "Weekly (7d)",
            BarKind::Premium => "Opus (7d)",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            BarKind::Session => 0,
            BarKind::Weekly => 1,
            BarKind::Premium => 2,
        }
    }
}

impl UsageSnapshot {
    pub fn bucket(&self, kind: BarKind) -> Option<&UsageBucket> {
        match kind {
            BarKind::Session => self.five_hour.as_ref(),
            BarKind::Weekly => self.seven_day.as_ref(),
            BarKind::Premium => self.seven_day_opus.as_ref(),
        }
    }

    /// Populated buckets in render order
    pub fn present_bars(&self) -> Vec<BarKind> {
        BarKind::ALL
            .into_iter()
            .filter(|kind| self.bucket(*kind).is_some())
            .collect()
    }
}

/// Accept RFC 3339 or null; anything else becomes `None` instead of failing
/// the whole response.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("Ignoring unparseable resets_at {:?}: {}", s, e);
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_response() {
        let json = r#"{
            "five_hour": {"utilization": 42.5, "resets_at": "2026-01-19T15:00:00.123456+00:00"},
            "seven_day": {"utilization": 10.0, "resets_at": null},
            "seven_day_opus": null,
            "seven_day_oauth_apps": null,
            "iguana_necktie": {"whatever": 1}
        }"#;
        let snapshot: UsageSnapshot = serde_json::from_str(json).unwrap();

        let session = snapshot.five_hour.as_ref().unwrap();
        assert_eq!(session.utilization, 42.5);
        assert!(session.resets_at.is_some());
        assert!(snapshot.seven_day.as_ref().unwrap().resets_at.is_none());
        assert!(snapshot.seven_day_opus.is_none());
        assert_eq!(
            snapshot.present_bars(),
            vec![BarKind::Session, BarKind::Weekly]
        );
    }

    #[test]
    fn test_missing_resets_at_and_bad_timestamp() {
        let json = r#"{"seven_day_opus": {"utilization": 3.0}, "seven_day": {"utilization": 1.0, "resets_at": "soon"}}"#;
        let snapshot: UsageSnapshot = serde_json::from_str(json).unwrap();

        assert!(snapshot.seven_day_opus.unwrap().resets_at.is_none());
        assert!(snapshot.seven_day.unwrap().resets_at.is_none());
    }

    #[test]
    fn test_percent_is_clamped() {
        let over = UsageBucket {
            utilization: 130.0,
            resets_at: None,
        };
        let under = UsageBucket {
            utilization: -2.0,
            resets_at: None,
        };
        assert_eq!(over.percent(), 100.0);
        assert_eq!(under.percent(), 0.0);
        assert_eq!(over.fraction(), 1.0);
    }
}
