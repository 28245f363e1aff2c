//! Score aggregation: folds the event log into points and a level.
use crate::event::EventLog;
use crate::numbers::ratio_f32;
use serde::{Deserialize, Serialize};

/// Derived score state. Always recomputable from the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total_points: u64,
    pub level: u32,
    /// Timestamp of the most recent event, if any.
    #[serde(default)]
    pub last_activity: Option<u64>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            total_points: 0,
            level: 1,
            last_activity: None,
        }
    }
}

/// A level increase detected between two recomputations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
}

/// `floor(total / span) + 1`, saturating at `u32::MAX`.
///
/// A zero span is treated as one so the function stays total; configuration
/// validation rejects zero spans before they reach here.
#[must_use]
pub fn level_for(total_points: u64, span: u32) -> u32 {
    let steps = total_points / u64::from(span.max(1));
    u32::try_from(steps).unwrap_or(u32::MAX).saturating_add(1)
}

/// Fold the log into a [`Progress`]. Pure and order-independent.
#[must_use]
pub fn recompute(log: &EventLog, span: u32) -> Progress {
    let total_points = log.total_points();
    Progress {
        total_points,
        level: level_for(total_points, span),
        last_activity: log.iter().map(|event| event.timestamp).max(),
    }
}

impl Progress {
    /// Level increase from `previous` to `self`, if any.
    #[must_use]
    pub const fn level_change(&self, previous: &Self) -> Option<LevelUp> {
        if self.level > previous.level {
            Some(LevelUp {
                from: previous.level,
                to: self.level,
            })
        } else {
            None
        }
    }

    /// Points still needed to reach the next level.
    #[must_use]
    pub fn points_to_next_level(&self, span: u32) -> u64 {
        let span = u64::from(span.max(1));
        span - (self.total_points % span)
    }

    /// Fraction of the current level already earned, in `0.0..1.0`.
    #[must_use]
    pub fn level_fraction(&self, span: u32) -> f32 {
        let span = u64::from(span.max(1));
        ratio_f32(self.total_points % span, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;
    use crate::points::PointsTable;

    #[test]
    fn level_formula_matches_boundaries() {
        assert_eq!(level_for(0, 100), 1);
        assert_eq!(level_for(99, 100), 1);
        assert_eq!(level_for(100, 100), 2);
        assert_eq!(level_for(250, 100), 3);
        assert_eq!(level_for(u64::MAX, 1), u32::MAX);
        assert_eq!(level_for(5, 0), 6);
    }

    #[test]
    fn recompute_sums_points_and_tracks_last_activity() {
        let table = PointsTable::default();
        let mut log = EventLog::new(10);
        log.append(NewEvent::new("page_load").points(5), &table, 10);
        log.append(NewEvent::new("weather_check").points(20), &table, 30);
        let progress = recompute(&log, 100);
        assert_eq!(progress.total_points, 25);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.last_activity, Some(30));
        assert_eq!(recompute(&log, 100), progress);
    }

    #[test]
    fn level_change_only_reports_increases() {
        let low = Progress {
            total_points: 90,
            level: 1,
            last_activity: None,
        };
        let high = Progress {
            total_points: 210,
            level: 3,
            last_activity: None,
        };
        assert_eq!(high.level_change(&low), Some(LevelUp { from: 1, to: 3 }));
        assert_eq!(low.level_change(&high), None);
        assert_eq!(low.level_change(&low), None);
    }

    #[test]
    fn next_level_helpers() {
        let progress = Progress {
            total_points: 125,
            level: 2,
            last_activity: None,
        };
        assert_eq!(progress.points_to_next_level(100), 75);
        assert!((progress.level_fraction(100) - 0.25).abs() < f32::EPSILON);
        assert_eq!(Progress::default().points_to_next_level(100), 100);
    }
}
