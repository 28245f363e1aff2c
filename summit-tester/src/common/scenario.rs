use summit_engagement::LeadTier;
use summit_engagement::constants::{
    ACTION_BOOKING_STARTED, ACTION_CALENDAR_CHECK, ACTION_FAQ_OPEN, ACTION_GALLERY_OPEN,
    ACTION_ITINERARY_VIEW, ACTION_LEAD_FORM_SUBMIT, ACTION_NEWSLETTER_SIGNUP, ACTION_PAGE_LOAD,
    ACTION_PAYMENT_METHOD_SELECT, ACTION_PRICE_CALCULATOR, ACTION_REVIEW_READ, ACTION_SHARE,
    ACTION_TRIP_VIEW, ACTION_WEATHER_CHECK, RULE_CENTURY, RULE_FIRST_STEPS, RULE_READY_TO_ROLL,
    RULE_WEATHER_WATCHER,
};

/// Trip slugs attached to trip-scoped actions.
pub const TRIP_SLUGS: &[&str] = &[
    "patagonia-w-trek",
    "annapurna-circuit",
    "kilimanjaro-machame",
    "dolomites-alta-via",
    "torres-del-paine-o",
];

/// Weighted action mix for synthetic visitors.
#[derive(Debug, Clone)]
pub struct VisitorProfile {
    pub weights: &'static [(&'static str, u32)],
    pub min_steps: usize,
    pub max_steps: usize,
    /// Upper bound on the pause before each action.
    pub max_dwell_ms: u64,
    /// Actions every journey ends with, in order.
    pub closing: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub enum Journey {
    /// Fixed actions with explicit points; identical for every seed.
    Scripted(&'static [(&'static str, u32)]),
    Synthetic(VisitorProfile),
}

/// Scenario-specific outcome checks on top of the engine invariants.
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    pub unlocked: &'static [&'static str],
    pub total_points: Option<u64>,
    pub level: Option<u32>,
    pub min_tier: Option<LeadTier>,
    pub max_tier: Option<LeadTier>,
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub journey: Journey,
    pub expect: Expectations,
}

pub fn all_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario {
            key: "smoke",
            name: "Smoke",
            description: "page_load then weather_check with fixed points",
            journey: Journey::Scripted(&[(ACTION_PAGE_LOAD, 5), (ACTION_WEATHER_CHECK, 20)]),
            expect: Expectations {
                unlocked: &[RULE_FIRST_STEPS, RULE_WEATHER_WATCHER],
                // 25 earned plus the 5 and 10 point rewards.
                total_points: Some(40),
                level: Some(1),
                ..Expectations::default()
            },
        },
        TestScenario {
            key: "researcher",
            name: "Researcher",
            description: "Compares itineraries, prices and forecasts without booking",
            journey: Journey::Synthetic(VisitorProfile {
                weights: &[
                    (ACTION_TRIP_VIEW, 4),
                    (ACTION_ITINERARY_VIEW, 3),
                    (ACTION_WEATHER_CHECK, 2),
                    (ACTION_PRICE_CALCULATOR, 2),
                    (ACTION_CALENDAR_CHECK, 2),
                    (ACTION_FAQ_OPEN, 2),
                    (ACTION_REVIEW_READ, 1),
                ],
                min_steps: 8,
                max_steps: 40,
                max_dwell_ms: 45_000,
                closing: &[ACTION_WEATHER_CHECK],
            }),
            expect: Expectations {
                unlocked: &[RULE_FIRST_STEPS, RULE_WEATHER_WATCHER],
                ..Expectations::default()
            },
        },
        TestScenario {
            key: "booker",
            name: "Booker",
            description: "Browses briefly, submits a lead form and starts a booking",
            journey: Journey::Synthetic(VisitorProfile {
                weights: &[
                    (ACTION_PAGE_LOAD, 2),
                    (ACTION_TRIP_VIEW, 3),
                    (ACTION_PRICE_CALCULATOR, 2),
                    (ACTION_CALENDAR_CHECK, 2),
                    (ACTION_SHARE, 1),
                    (ACTION_NEWSLETTER_SIGNUP, 1),
                    (ACTION_PAYMENT_METHOD_SELECT, 1),
                ],
                min_steps: 3,
                max_steps: 20,
                max_dwell_ms: 30_000,
                closing: &[ACTION_LEAD_FORM_SUBMIT, ACTION_BOOKING_STARTED],
            }),
            expect: Expectations {
                unlocked: &[RULE_READY_TO_ROLL, RULE_CENTURY],
                min_tier: Some(LeadTier::Warm),
                ..Expectations::default()
            },
        },
        TestScenario {
            key: "window_shopper",
            name: "Window Shopper",
            description: "Scrolls trip pages and galleries, never engages",
            journey: Journey::Synthetic(VisitorProfile {
                weights: &[
                    (ACTION_PAGE_LOAD, 3),
                    (ACTION_TRIP_VIEW, 2),
                    (ACTION_GALLERY_OPEN, 3),
                ],
                min_steps: 1,
                max_steps: 10,
                max_dwell_ms: 15_000,
                closing: &[],
            }),
            expect: Expectations {
                max_tier: Some(LeadTier::Cold),
                ..Expectations::default()
            },
        },
    ]
}

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    all_scenarios().into_iter().find(|s| s.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    all_scenarios()
        .into_iter()
        .map(|s| (s.key, s.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_keys_are_unique_and_resolvable() {
        let listed = list_scenarios();
        for (key, _) in &listed {
            assert_eq!(get_scenario(key).map(|s| s.key), Some(*key));
        }
        let mut keys: Vec<_> = listed.iter().map(|(k, _)| *k).collect();
        keys.dedup();
        assert_eq!(keys.len(), 4);
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn synthetic_profiles_are_well_formed() {
        for scenario in all_scenarios() {
            if let Journey::Synthetic(profile) = scenario.journey {
                assert!(!profile.weights.is_empty(), "{}", scenario.key);
                assert!(profile.weights.iter().all(|(_, w)| *w > 0));
                assert!(profile.min_steps <= profile.max_steps);
            }
        }
    }
}
