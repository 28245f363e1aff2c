//! Default point values per visitor action.
use crate::constants::{
    ACTION_ACHIEVEMENT_UNLOCKED, ACTION_BOOKING_CREATED, ACTION_BOOKING_STARTED,
    ACTION_CALENDAR_CHECK, ACTION_FAQ_OPEN, ACTION_GALLERY_OPEN, ACTION_ITINERARY_VIEW,
    ACTION_LEAD_FORM_SUBMIT, ACTION_NEWSLETTER_SIGNUP, ACTION_PAGE_LOAD,
    ACTION_PAYMENT_METHOD_SELECT, ACTION_PAYMENT_PROOF_SUBMITTED, ACTION_PRICE_CALCULATOR,
    ACTION_QUIZ_COMPLETE, ACTION_REVIEW_READ, ACTION_SHARE, ACTION_TRIP_VIEW,
    ACTION_WEATHER_CHECK,
};
use crate::event::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points and category credited for an action when the caller omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub points: u32,
    pub category: Category,
}

impl PointsEntry {
    #[must_use]
    pub const fn new(points: u32, category: Category) -> Self {
        Self { points, category }
    }
}

const UNKNOWN_ACTION: PointsEntry = PointsEntry::new(0, Category::Engagement);

/// Lookup table from action key to its default [`PointsEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsTable(BTreeMap<String, PointsEntry>);

impl PointsTable {
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Default entry for `action`; unknown actions earn nothing.
    #[must_use]
    pub fn lookup(&self, action: &str) -> PointsEntry {
        self.0.get(action).copied().unwrap_or(UNKNOWN_ACTION)
    }

    #[must_use]
    pub fn contains(&self, action: &str) -> bool {
        self.0.contains_key(action)
    }

    pub fn insert(&mut self, action: impl Into<String>, entry: PointsEntry) {
        self.0.insert(action.into(), entry);
    }

    /// Overlay `other` on top of this table.
    pub fn merge(&mut self, other: &Self) {
        for (action, entry) in &other.0 {
            self.0.insert(action.clone(), *entry);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PointsEntry)> {
        self.0.iter().map(|(action, entry)| (action.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PointsTable {
    fn default() -> Self {
        use Category::{Achievement, Booking, Browsing, Engagement, Research, Social};
        let entries = [
            (ACTION_PAGE_LOAD, 5, Browsing),
            (ACTION_TRIP_VIEW, 10, Browsing),
            (ACTION_GALLERY_OPEN, 5, Browsing),
            (ACTION_WEATHER_CHECK, 20, Research),
            (ACTION_ITINERARY_VIEW, 15, Research),
            (ACTION_PRICE_CALCULATOR, 25, Research),
            (ACTION_CALENDAR_CHECK, 15, Research),
            (ACTION_FAQ_OPEN, 5, Research),
            (ACTION_SHARE, 30, Social),
            (ACTION_REVIEW_READ, 10, Social),
            (ACTION_NEWSLETTER_SIGNUP, 50, Engagement),
            (ACTION_QUIZ_COMPLETE, 40, Engagement),
            (ACTION_LEAD_FORM_SUBMIT, 75, Booking),
            (ACTION_PAYMENT_METHOD_SELECT, 40, Booking),
            (ACTION_BOOKING_STARTED, 100, Booking),
            (ACTION_BOOKING_CREATED, 150, Booking),
            (ACTION_PAYMENT_PROOF_SUBMITTED, 150, Booking),
            (ACTION_ACHIEVEMENT_UNLOCKED, 0, Achievement),
        ];
        Self(
            entries
                .into_iter()
                .map(|(action, points, category)| {
                    (action.to_string(), PointsEntry::new(points, category))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_booking_funnel() {
        let table = PointsTable::default();
        assert_eq!(table.lookup("page_load"), PointsEntry::new(5, Category::Browsing));
        assert_eq!(table.lookup("booking_created").points, 150);
        assert_eq!(table.lookup("nope"), UNKNOWN_ACTION);
        assert_eq!(table.len(), 18);
    }

    #[test]
    fn merge_overrides_and_extends() {
        let mut table = PointsTable::default();
        let overlay: PointsTable = serde_json::from_str(
            r#"{
                "page_load": { "points": 1, "category": "browsing" },
                "video_play": { "points": 12, "category": "engagement" }
            }"#,
        )
        .unwrap();
        table.merge(&overlay);
        assert_eq!(table.lookup("page_load").points, 1);
        assert!(table.contains("video_play"));
        assert_eq!(table.lookup("weather_check").points, 20);
    }
}
