//! Persisted engagement blob.
//!
//! The blob is a cache of the event log fold: `totalPoints` and `level` are
//! written for the convenience of other readers, but restoring always
//! recomputes them from `pointsHistory` and `archived`.

use crate::event::{Event, EventLog, Tally};
use crate::progress::Progress;
use crate::rules::{AchievementRecord, RuleBook};
use serde::{Deserialize, Serialize};

const fn default_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub total_points: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub last_activity: Option<u64>,
    #[serde(default)]
    pub achievements: Vec<AchievementRecord>,
    #[serde(default)]
    pub points_history: Vec<Event>,
    #[serde(default)]
    pub archived: Tally,
    #[serde(default)]
    pub next_event_id: u64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            total_points: 0,
            level: default_level(),
            last_activity: None,
            achievements: Vec::new(),
            points_history: Vec::new(),
            archived: Tally::default(),
            next_event_id: 1,
        }
    }
}

impl Snapshot {
    /// Capture the current engine state.
    #[must_use]
    pub fn capture(log: &EventLog, progress: &Progress, rules: &RuleBook) -> Self {
        Self {
            total_points: progress.total_points,
            level: progress.level,
            last_activity: progress.last_activity,
            achievements: rules.records(),
            points_history: log.iter().cloned().collect(),
            archived: log.archived().clone(),
            next_event_id: log.next_id(),
        }
    }

    /// Parse a stored blob, falling back to an empty snapshot when the value
    /// is missing or malformed. Never fails.
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("discarding malformed engagement snapshot: {err}");
                Self::default()
            }
        }
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
