//! Achievement rules and their monotonic unlock evaluation.
//!
//! A [`Rule`] pairs a [`Threshold`] predicate with a [`Reward`]. The
//! [`RuleBook`] owns the static catalog plus the set of unlocked rule ids.
//! Unlocking is one-way: nothing in this module can lock a rule again.

use crate::event::EventLog;
use crate::numbers::ratio_f32;
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Action or rule id list; catalogs rarely name more than a handful.
pub type IdSet = SmallVec<[String; 4]>;

/// Unlock predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Threshold {
    /// Total points at least `at_least`.
    Points { at_least: u64 },
    /// At least `at_least` events whose action is one of `actions`.
    Actions { actions: IdSet, at_least: u64 },
    /// Session open for at least `at_least_ms` milliseconds.
    SessionTime { at_least_ms: u64 },
    /// Every rule in `requires` already unlocked.
    Combo { requires: IdSet },
}

/// Display tier for a reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Points and presentation metadata granted on unlock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub points: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub rarity: Rarity,
}

impl Reward {
    #[must_use]
    pub fn new(title: impl Into<String>, points: u32) -> Self {
        Self {
            points,
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub const fn rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }
}

/// A static achievement definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub threshold: Threshold,
    pub reward: Reward,
}

impl Rule {
    #[must_use]
    pub fn points(id: impl Into<String>, at_least: u64, reward: Reward) -> Self {
        Self {
            id: id.into(),
            threshold: Threshold::Points { at_least },
            reward,
        }
    }

    #[must_use]
    pub fn actions(id: impl Into<String>, actions: &[&str], at_least: u64, reward: Reward) -> Self {
        Self {
            id: id.into(),
            threshold: Threshold::Actions {
                actions: actions.iter().map(|a| (*a).to_string()).collect(),
                at_least,
            },
            reward,
        }
    }

    #[must_use]
    pub fn session_time(id: impl Into<String>, at_least_ms: u64, reward: Reward) -> Self {
        Self {
            id: id.into(),
            threshold: Threshold::SessionTime { at_least_ms },
            reward,
        }
    }

    #[must_use]
    pub fn combo(id: impl Into<String>, requires: &[&str], reward: Reward) -> Self {
        Self {
            id: id.into(),
            threshold: Threshold::Combo {
                requires: requires.iter().map(|r| (*r).to_string()).collect(),
            },
            reward,
        }
    }
}

/// Inputs a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub progress: &'a Progress,
    pub log: &'a EventLog,
    /// Milliseconds since the session opened.
    pub elapsed_ms: u64,
    /// Timestamp stamped onto unlocks.
    pub now: u64,
}

/// Numeric progress toward a rule, used by challenge displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleProgress {
    pub current: u64,
    pub target: u64,
}

impl RuleProgress {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.current >= self.target
    }

    /// Completion in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.is_complete() {
            return 1.0;
        }
        ratio_f32(self.current, self.target)
    }
}

/// A rule that transitioned to unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unlock {
    pub rule_id: String,
    pub reward: Reward,
    pub unlocked_at: u64,
}

/// Persisted form of an unlocked rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRecord {
    pub id: String,
    pub unlocked_at: u64,
}

/// Catalog entry joined with its unlock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementView<'a> {
    pub rule: &'a Rule,
    pub unlocked_at: Option<u64>,
}

impl AchievementView<'_> {
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

impl Threshold {
    fn measure(&self, ctx: &EvaluationContext<'_>, unlocked: &BTreeMap<String, u64>) -> RuleProgress {
        match self {
            Self::Points { at_least } => RuleProgress {
                current: ctx.progress.total_points,
                target: *at_least,
            },
            Self::Actions { actions, at_least } => RuleProgress {
                current: ctx.log.count_actions(actions.as_slice()),
                target: *at_least,
            },
            Self::SessionTime { at_least_ms } => RuleProgress {
                current: ctx.elapsed_ms,
                target: *at_least_ms,
            },
            Self::Combo { requires } => RuleProgress {
                current: u64::try_from(
                    requires
                        .iter()
                        .filter(|id| unlocked.contains_key(id.as_str()))
                        .count(),
                )
                .unwrap_or(u64::MAX),
                target: u64::try_from(requires.len()).unwrap_or(u64::MAX),
            },
        }
    }
}

/// Static rule catalog plus monotonic unlock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBook {
    rules: Vec<Rule>,
    unlocked: BTreeMap<String, u64>,
}

impl RuleBook {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            unlocked: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    #[must_use]
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains_key(id)
    }

    #[must_use]
    pub fn unlocked_at(&self, id: &str) -> Option<u64> {
        self.unlocked.get(id).copied()
    }

    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Every rule in catalog order with its unlock state.
    pub fn achievements(&self) -> impl Iterator<Item = AchievementView<'_>> {
        self.rules.iter().map(|rule| AchievementView {
            rule,
            unlocked_at: self.unlocked.get(&rule.id).copied(),
        })
    }

    /// Unlocked rules as persisted records, in catalog order.
    #[must_use]
    pub fn records(&self) -> Vec<AchievementRecord> {
        self.achievements()
            .filter_map(|view| {
                view.unlocked_at.map(|unlocked_at| AchievementRecord {
                    id: view.rule.id.clone(),
                    unlocked_at,
                })
            })
            .collect()
    }

    /// Re-apply persisted unlocks. Unknown ids are ignored; nothing is locked.
    pub fn restore<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = AchievementRecord>,
    {
        for record in records {
            if self.rule(&record.id).is_none() {
                log::debug!("ignoring persisted achievement for unknown rule {}", record.id);
                continue;
            }
            self.unlocked.entry(record.id).or_insert(record.unlocked_at);
        }
    }

    /// Progress toward rule `id`, or `None` for unknown ids.
    #[must_use]
    pub fn progress(&self, id: &str, ctx: &EvaluationContext<'_>) -> Option<RuleProgress> {
        self.rule(id)
            .map(|rule| rule.threshold.measure(ctx, &self.unlocked))
    }

    /// Single evaluation pass against the unlock set as it stood when the
    /// pass began. A combo whose prerequisites unlock in this pass waits for
    /// the next one.
    pub fn evaluate_pass(&mut self, ctx: &EvaluationContext<'_>) -> Vec<Unlock> {
        let ready: Vec<usize> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| !self.unlocked.contains_key(&rule.id))
            .filter(|(_, rule)| rule.threshold.measure(ctx, &self.unlocked).is_complete())
            .map(|(index, _)| index)
            .collect();

        ready
            .into_iter()
            .map(|index| {
                let rule = &self.rules[index];
                self.unlocked.insert(rule.id.clone(), ctx.now);
                log::debug!("achievement unlocked: {}", rule.id);
                Unlock {
                    rule_id: rule.id.clone(),
                    reward: rule.reward.clone(),
                    unlocked_at: ctx.now,
                }
            })
            .collect()
    }

    /// Evaluate passes until no further rule unlocks.
    ///
    /// Combo rules therefore unlock in the same call as their prerequisites.
    /// Each productive pass unlocks at least one rule, so this runs at most
    /// `rules.len() + 1` passes.
    pub fn evaluate(&mut self, ctx: &EvaluationContext<'_>) -> Vec<Unlock> {
        let mut unlocks = Vec::new();
        loop {
            let pass = self.evaluate_pass(ctx);
            if pass.is_empty() {
                return unlocks;
            }
            unlocks.extend(pass);
        }
    }

    /// Drop all unlock state.
    pub fn reset(&mut self) {
        self.unlocked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;
    use crate::points::PointsTable;
    use crate::progress::recompute;

    fn book() -> RuleBook {
        RuleBook::new(vec![
            Rule::points("ten", 10, Reward::new("Ten", 0)),
            Rule::actions("weather", &["weather_check"], 1, Reward::new("Weather", 0)),
            Rule::session_time("minute", 60_000, Reward::new("Minute", 0)),
            Rule::combo("both", &["ten", "weather"], Reward::new("Both", 0)),
        ])
    }

    fn log_with(actions: &[(&str, u32)]) -> EventLog {
        let table = PointsTable::default();
        let mut log = EventLog::new(50);
        for (action, points) in actions {
            log.append(NewEvent::new(*action).points(*points), &table, 0);
        }
        log
    }

    #[test]
    fn single_pass_lags_combo_by_one_pass() {
        let log = log_with(&[("weather_check", 20)]);
        let progress = recompute(&log, 100);
        let ctx = EvaluationContext {
            progress: &progress,
            log: &log,
            elapsed_ms: 0,
            now: 7,
        };
        let mut rules = book();

        let first: Vec<String> = rules.evaluate_pass(&ctx).into_iter().map(|u| u.rule_id).collect();
        assert_eq!(first, vec!["ten".to_string(), "weather".to_string()]);
        assert!(!rules.is_unlocked("both"));

        let second: Vec<String> = rules.evaluate_pass(&ctx).into_iter().map(|u| u.rule_id).collect();
        assert_eq!(second, vec!["both".to_string()]);
        assert_eq!(rules.unlocked_at("both"), Some(7));
    }

    #[test]
    fn fixed_point_unlocks_combo_in_same_call() {
        let log = log_with(&[("weather_check", 20)]);
        let progress = recompute(&log, 100);
        let ctx = EvaluationContext {
            progress: &progress,
            log: &log,
            elapsed_ms: 0,
            now: 1,
        };
        let mut rules = book();
        let unlocked = rules.evaluate(&ctx);
        assert_eq!(unlocked.len(), 3);
        assert!(rules.is_unlocked("both"));
        assert!(rules.evaluate(&ctx).is_empty());
    }

    #[test]
    fn session_time_and_progress_reporting() {
        let log = log_with(&[]);
        let progress = recompute(&log, 100);
        let mut ctx = EvaluationContext {
            progress: &progress,
            log: &log,
            elapsed_ms: 30_000,
            now: 0,
        };
        let mut rules = book();
        let halfway = rules.progress("minute", &ctx).unwrap();
        assert!((halfway.fraction() - 0.5).abs() < f32::EPSILON);
        assert!(rules.evaluate(&ctx).is_empty());

        ctx.elapsed_ms = 60_000;
        let unlocked = rules.evaluate(&ctx);
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].rule_id, "minute");
        assert!(rules.progress("missing", &ctx).is_none());
    }

    #[test]
    fn restore_is_monotonic_and_skips_unknown_ids() {
        let mut rules = book();
        rules.restore(vec![
            AchievementRecord {
                id: "ten".into(),
                unlocked_at: 5,
            },
            AchievementRecord {
                id: "retired".into(),
                unlocked_at: 6,
            },
        ]);
        rules.restore(vec![AchievementRecord {
            id: "ten".into(),
            unlocked_at: 99,
        }]);
        assert_eq!(rules.unlocked_at("ten"), Some(5));
        assert_eq!(rules.unlocked_count(), 1);
        assert_eq!(rules.records().len(), 1);
    }

    #[test]
    fn threshold_json_shape() {
        let rule: Rule = serde_json::from_str(
            r#"{
                "id": "planner",
                "threshold": { "kind": "actions", "actions": ["price_calculator", "calendar_check"], "at_least": 3 },
                "reward": { "title": "Planner", "points": 30, "rarity": "rare" }
            }"#,
        )
        .unwrap();
        assert_eq!(
            rule.threshold,
            Threshold::Actions {
                actions: IdSet::from_vec(vec!["price_calculator".into(), "calendar_check".into()]),
                at_least: 3,
            }
        );
        assert_eq!(rule.reward.rarity, Rarity::Rare);
        assert!(rule.reward.icon.is_none());
    }
}
