//! Core data model — the validated race record and its derived identifier.

use serde::{Deserialize, Serialize};

/// One validated row of the daily feed. Immutable once produced by the
/// validator; every later stage (send-time calculation, rendering,
/// scheduling) reads from it without modification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceRecord {
    /// Venue name, e.g. "Flemington".
    pub track: String,
    /// Race number as it appears in the feed (display only).
    pub race: String,
    /// Raw start time string, strict 24-hour `HH:MM`, no date.
    pub race_time: String,
    /// Selection (runner) number — digits only.
    pub selection: String,
    /// Selection display name.
    pub selection_name: String,
    /// Stake units, non-negative.
    pub units: f64,
    /// Optional per-row delivery destination override.
    pub channel_override: Option<String>,
}

impl RaceRecord {
    /// Derived identifier used for dedup and job naming. Stable across runs
    /// that re-read the same feed on the same day; unique within one feed.
    pub fn event_id(&self) -> EventId {
        EventId(format!(
            "{}_{}_{}",
            self.track, self.race_time, self.selection
        ))
    }
}

/// Event identifier: `{track}_{race_time}_{selection}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RaceRecord {
        RaceRecord {
            track: "Flemington".into(),
            race: "7".into(),
            race_time: "14:30".into(),
            selection: "4".into(),
            selection_name: "Fast Lad".into(),
            units: 2.0,
            channel_override: None,
        }
    }

    #[test]
    fn test_event_id_format() {
        assert_eq!(record().event_id().as_str(), "Flemington_14:30_4");
    }

    #[test]
    fn test_event_id_stable() {
        // Same feed row read twice yields the same identifier.
        assert_eq!(record().event_id(), record().event_id());
    }
}
