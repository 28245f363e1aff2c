//! Heuristic lead scoring over the visitor event stream.
//!
//! The score estimates how likely a visitor is to book. It is a weighted
//! count of event categories, plus one-off bonuses for high-intent actions
//! and a small bonus per level, clamped to `0..=100`.

use crate::constants::{
    ACTION_BOOKING_STARTED, ACTION_CALENDAR_CHECK, ACTION_LEAD_FORM_SUBMIT,
    ACTION_PRICE_CALCULATOR, LEAD_HOT_AT, LEAD_INTENT_BOOKING_STARTED, LEAD_INTENT_CALENDAR_CHECK,
    LEAD_INTENT_LEAD_FORM, LEAD_INTENT_PRICE_CALCULATOR, LEAD_LEVEL_BONUS, LEAD_SCORE_MAX,
    LEAD_WARM_AT, LEAD_WEIGHT_ACHIEVEMENT, LEAD_WEIGHT_BOOKING, LEAD_WEIGHT_BROWSING,
    LEAD_WEIGHT_ENGAGEMENT, LEAD_WEIGHT_RESEARCH, LEAD_WEIGHT_SOCIAL,
};
use crate::event::{Category, EventLog};
use crate::numbers::{round_f64_to_u32, u64_to_f64};
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lead scoring weights and tier boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadScoringCfg {
    pub category_weights: BTreeMap<Category, f32>,
    /// Bonus granted once when the action appears at least once.
    pub intent_bonuses: BTreeMap<String, u32>,
    pub level_bonus: u32,
    pub warm_at: u32,
    pub hot_at: u32,
    pub max_score: u32,
}

impl Default for LeadScoringCfg {
    fn default() -> Self {
        let category_weights = [
            (Category::Browsing, LEAD_WEIGHT_BROWSING),
            (Category::Research, LEAD_WEIGHT_RESEARCH),
            (Category::Social, LEAD_WEIGHT_SOCIAL),
            (Category::Engagement, LEAD_WEIGHT_ENGAGEMENT),
            (Category::Booking, LEAD_WEIGHT_BOOKING),
            (Category::Achievement, LEAD_WEIGHT_ACHIEVEMENT),
        ]
        .into_iter()
        .collect();
        let intent_bonuses = [
            (ACTION_PRICE_CALCULATOR, LEAD_INTENT_PRICE_CALCULATOR),
            (ACTION_CALENDAR_CHECK, LEAD_INTENT_CALENDAR_CHECK),
            (ACTION_LEAD_FORM_SUBMIT, LEAD_INTENT_LEAD_FORM),
            (ACTION_BOOKING_STARTED, LEAD_INTENT_BOOKING_STARTED),
        ]
        .into_iter()
        .map(|(action, bonus)| (action.to_string(), bonus))
        .collect();
        Self {
            category_weights,
            intent_bonuses,
            level_bonus: LEAD_LEVEL_BONUS,
            warm_at: LEAD_WARM_AT,
            hot_at: LEAD_HOT_AT,
            max_score: LEAD_SCORE_MAX,
        }
    }
}

/// Sales-readiness bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadTier {
    Cold,
    Warm,
    Hot,
}

impl std::fmt::Display for LeadTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cold => write!(f, "cold"),
            Self::Warm => write!(f, "warm"),
            Self::Hot => write!(f, "hot"),
        }
    }
}

/// One contribution to a lead score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSignal {
    pub source: String,
    pub points: u32,
}

/// Result of scoring a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScore {
    pub score: u32,
    pub tier: LeadTier,
    /// Non-zero contributions, categories first, then intents, then level.
    pub signals: Vec<LeadSignal>,
}

impl LeadScoringCfg {
    #[must_use]
    pub const fn tier_for(&self, score: u32) -> LeadTier {
        if score >= self.hot_at {
            LeadTier::Hot
        } else if score >= self.warm_at {
            LeadTier::Warm
        } else {
            LeadTier::Cold
        }
    }

    /// Score the visitor behind `log`.
    #[must_use]
    pub fn score(&self, log: &EventLog, progress: &Progress) -> LeadScore {
        let mut signals = Vec::new();

        for category in Category::ALL {
            let weight = self.category_weights.get(&category).copied().unwrap_or(0.0);
            let count = log.count_category(category);
            let points = round_f64_to_u32(f64::from(weight) * u64_to_f64(count));
            if points > 0 {
                signals.push(LeadSignal {
                    source: category.key().to_string(),
                    points,
                });
            }
        }

        for (action, bonus) in &self.intent_bonuses {
            if *bonus > 0 && log.count_actions(&[action.as_str()]) > 0 {
                signals.push(LeadSignal {
                    source: action.clone(),
                    points: *bonus,
                });
            }
        }

        let level_points = self
            .level_bonus
            .saturating_mul(progress.level.saturating_sub(1));
        if level_points > 0 {
            signals.push(LeadSignal {
                source: "level".to_string(),
                points: level_points,
            });
        }

        let raw = signals
            .iter()
            .fold(0_u32, |acc, signal| acc.saturating_add(signal.points));
        let score = raw.min(self.max_score);
        LeadScore {
            score,
            tier: self.tier_for(score),
            signals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;
    use crate::points::PointsTable;
    use crate::progress::recompute;

    fn score_for(actions: &[&str]) -> LeadScore {
        let table = PointsTable::default();
        let mut log = EventLog::new(100);
        for action in actions {
            log.append(NewEvent::new(*action), &table, 0);
        }
        let progress = recompute(&log, 100);
        LeadScoringCfg::default().score(&log, &progress)
    }

    #[test]
    fn empty_visitor_is_cold() {
        let lead = score_for(&[]);
        assert_eq!(lead.score, 0);
        assert_eq!(lead.tier, LeadTier::Cold);
        assert!(lead.signals.is_empty());
    }

    #[test]
    fn researcher_warms_up() {
        // 2 browsing (2) + 2 research (6) + price calculator intent (10) + calendar intent (8)
        let lead = score_for(&["page_load", "trip_view", "price_calculator", "calendar_check"]);
        assert_eq!(lead.score, 26);
        assert_eq!(lead.tier, LeadTier::Cold);

        let lead = score_for(&[
            "page_load",
            "trip_view",
            "price_calculator",
            "calendar_check",
            "newsletter_signup",
        ]);
        // + 1 engagement (5), and 105 points lifts the visitor to level 2 (+2)
        assert_eq!(lead.score, 33);
        assert_eq!(lead.tier, LeadTier::Warm);
        assert!(lead.signals.iter().any(|s| s.source == "level" && s.points == 2));
        assert!(lead.signals.iter().any(|s| s.source == "engagement" && s.points == 5));
    }

    #[test]
    fn booker_is_hot_and_clamped() {
        let lead = score_for(&[
            "booking_started",
            "booking_created",
            "payment_method_select",
            "payment_proof_submitted",
            "lead_form_submit",
            "price_calculator",
        ]);
        assert_eq!(lead.score, 100);
        assert_eq!(lead.tier, LeadTier::Hot);
    }

    #[test]
    fn tier_boundaries() {
        let cfg = LeadScoringCfg::default();
        assert_eq!(cfg.tier_for(29), LeadTier::Cold);
        assert_eq!(cfg.tier_for(30), LeadTier::Warm);
        assert_eq!(cfg.tier_for(69), LeadTier::Warm);
        assert_eq!(cfg.tier_for(70), LeadTier::Hot);
    }
}
