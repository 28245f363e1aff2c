//! Append-only visitor event log.
//!
//! Every point-earning interaction becomes an immutable [`Event`]. The log
//! retains at most `cap` entries; older entries are folded into an archived
//! [`Tally`] so totals and action counts stay exact after the cap drops them.

use crate::points::PointsTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Monotonic identifier assigned by the log at append time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evt-{}", self.0)
    }
}

/// Coarse grouping used for lead scoring and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Browsing,
    Research,
    Social,
    Engagement,
    Booking,
    /// Reward credits emitted when an achievement unlocks.
    Achievement,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Browsing,
        Self::Research,
        Self::Social,
        Self::Engagement,
        Self::Booking,
        Self::Achievement,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::Research => "research",
            Self::Social => "social",
            Self::Engagement => "engagement",
            Self::Booking => "booking",
            Self::Achievement => "achievement",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A single recorded visitor action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub action: String,
    pub points: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub category: Category,
    /// Opaque collaborator identifier (trip slug, booking id, rule id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Request to append an event; unset fields come from the points table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub action: String,
    pub points: Option<u32>,
    pub category: Option<Category>,
    pub subject: Option<String>,
}

impl NewEvent {
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            points: None,
            category: None,
            subject: None,
        }
    }

    #[must_use]
    pub const fn points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    #[must_use]
    pub const fn maybe_points(mut self, points: Option<u32>) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub const fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl From<&str> for NewEvent {
    fn from(action: &str) -> Self {
        Self::new(action)
    }
}

/// Aggregate of events that the history cap has dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub events: u64,
    #[serde(default)]
    pub actions: BTreeMap<String, u64>,
    #[serde(default)]
    pub categories: BTreeMap<Category, u64>,
}

impl Tally {
    fn absorb(&mut self, event: &Event) {
        self.points = self.points.saturating_add(u64::from(event.points));
        self.events = self.events.saturating_add(1);
        *self.actions.entry(event.action.clone()).or_default() += 1;
        *self.categories.entry(event.category).or_default() += 1;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events == 0
    }
}

/// Bounded, insertion-ordered event history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<Event>,
    archived: Tally,
    next_id: u64,
    cap: usize,
}

impl EventLog {
    /// Create an empty log retaining at most `cap` entries (minimum 1).
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            archived: Tally::default(),
            next_id: 1,
            cap: cap.max(1),
        }
    }

    /// Rebuild a log from persisted parts.
    ///
    /// Entries beyond `cap` are folded into the tally oldest-first, and the id
    /// counter is bumped past any persisted id so ids are never reused.
    #[must_use]
    pub fn from_parts(entries: Vec<Event>, archived: Tally, next_id: u64, cap: usize) -> Self {
        let highest = entries.iter().map(|event| event.id.0).max().unwrap_or(0);
        let mut log = Self {
            entries: entries.into(),
            archived,
            next_id: next_id.max(highest.saturating_add(1)).max(1),
            cap: cap.max(1),
        };
        log.enforce_cap();
        log
    }

    /// Append an event stamped with `timestamp`. Never fails.
    pub fn append(&mut self, new: NewEvent, table: &PointsTable, timestamp: u64) -> Event {
        let defaults = table.lookup(&new.action);
        let event = Event {
            id: EventId(self.next_id),
            points: new.points.unwrap_or(defaults.points),
            category: new.category.unwrap_or(defaults.category),
            action: new.action,
            timestamp,
            subject: new.subject,
        };
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push_back(event.clone());
        self.enforce_cap();
        event
    }

    fn enforce_cap(&mut self) {
        while self.entries.len() > self.cap {
            if let Some(dropped) = self.entries.pop_front() {
                self.archived.absorb(&dropped);
            }
        }
    }

    /// Retained events in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Event> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Number of events still held in the history. Archived events are not
    /// counted; see [`EventLog::total_events`].
    #[must_use]
    pub fn retained_len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was ever recorded. Unlike [`EventLog::retained_len`]
    /// this also looks at archived events, so a log whose history was folded
    /// away entirely is not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.archived.is_empty()
    }

    /// Total number of events ever appended, including archived ones.
    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.archived
            .events
            .saturating_add(u64::try_from(self.entries.len()).unwrap_or(u64::MAX))
    }

    #[must_use]
    pub fn last(&self) -> Option<&Event> {
        self.entries.back()
    }

    #[must_use]
    pub const fn archived(&self) -> &Tally {
        &self.archived
    }

    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Sum of points across retained and archived events.
    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.entries
            .iter()
            .fold(self.archived.points, |acc, event| {
                acc.saturating_add(u64::from(event.points))
            })
    }

    /// Number of events whose action is in `actions`, archived ones included.
    #[must_use]
    pub fn count_actions<S: AsRef<str>>(&self, actions: &[S]) -> u64 {
        let matches = |action: &str| actions.iter().any(|a| a.as_ref() == action);
        let archived: u64 = self
            .archived
            .actions
            .iter()
            .filter(|(action, _)| matches(action))
            .map(|(_, count)| *count)
            .sum();
        let retained = self
            .entries
            .iter()
            .filter(|event| matches(&event.action))
            .count();
        archived.saturating_add(u64::try_from(retained).unwrap_or(u64::MAX))
    }

    /// Number of events in `category`, archived ones included.
    #[must_use]
    pub fn count_category(&self, category: Category) -> u64 {
        let archived = self
            .archived
            .categories
            .get(&category)
            .copied()
            .unwrap_or(0);
        let retained = self
            .entries
            .iter()
            .filter(|event| event.category == category)
            .count();
        archived.saturating_add(u64::try_from(retained).unwrap_or(u64::MAX))
    }

    /// Consume the log into its persisted parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Event>, Tally, u64) {
        (self.entries.into(), self.archived, self.next_id)
    }

    /// Forget everything, keeping the cap.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.archived = Tally::default();
        self.next_id = 1;
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(crate::constants::HISTORY_CAP)
    }
}
