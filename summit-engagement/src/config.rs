//! Engine configuration and the built-in achievement catalog.
use crate::constants::{
    ACTION_BOOKING_STARTED, ACTION_CALENDAR_CHECK, ACTION_PRICE_CALCULATOR, ACTION_SHARE,
    ACTION_TRIP_VIEW, ACTION_WEATHER_CHECK, DEDICATED_SESSION_MS, HISTORY_CAP, LEVEL_SPAN,
    RULE_CENTURY, RULE_DEDICATED, RULE_EXPLORER, RULE_FIRST_STEPS, RULE_HIGH_ROLLER,
    RULE_PLANNER, RULE_READY_TO_ROLL, RULE_SOCIAL_BUTTERFLY, RULE_TRAILBLAZER,
    RULE_WEATHER_WATCHER, STORAGE_KEY,
};
use crate::lead::LeadScoringCfg;
use crate::points::PointsTable;
use crate::rules::{Rarity, Reward, Rule, Threshold};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("level span must be greater than zero")]
    ZeroLevelSpan,
    #[error("history cap must be greater than zero")]
    ZeroHistoryCap,
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),
    #[error("rule {rule} requires unknown rule {missing}")]
    UnknownPrerequisite { rule: String, missing: String },
    #[error("rule {0} requires itself")]
    SelfReferentialCombo(String),
    #[error("rule {0} has no actions or prerequisites")]
    EmptyRule(String),
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Points per level.
    pub level_span: u32,
    /// Maximum retained event history.
    pub history_cap: usize,
    pub storage_key: String,
    /// Entries here overlay the built-in table.
    #[serde(deserialize_with = "overlay_default_points")]
    pub points: PointsTable,
    pub rules: Vec<Rule>,
    pub lead: LeadScoringCfg,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            level_span: LEVEL_SPAN,
            history_cap: HISTORY_CAP,
            storage_key: STORAGE_KEY.to_string(),
            points: PointsTable::default(),
            rules: default_rules(),
            lead: LeadScoringCfg::default(),
        }
    }
}

impl EngagementConfig {
    /// Parse configuration JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check catalog consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level_span == 0 {
            return Err(ConfigError::ZeroLevelSpan);
        }
        if self.history_cap == 0 {
            return Err(ConfigError::ZeroHistoryCap);
        }

        let mut ids = HashSet::new();
        for rule in &self.rules {
            if !ids.insert(rule.id.as_str()) {
                return Err(ConfigError::DuplicateRule(rule.id.clone()));
            }
        }

        for rule in &self.rules {
            match &rule.threshold {
                Threshold::Actions { actions, .. } if actions.is_empty() => {
                    return Err(ConfigError::EmptyRule(rule.id.clone()));
                }
                Threshold::Combo { requires } => {
                    if requires.is_empty() {
                        return Err(ConfigError::EmptyRule(rule.id.clone()));
                    }
                    for required in requires {
                        if *required == rule.id {
                            return Err(ConfigError::SelfReferentialCombo(rule.id.clone()));
                        }
                        if !ids.contains(required.as_str()) {
                            return Err(ConfigError::UnknownPrerequisite {
                                rule: rule.id.clone(),
                                missing: required.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn overlay_default_points<'de, D>(deserializer: D) -> Result<PointsTable, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overlay = PointsTable::deserialize(deserializer)?;
    let mut points = PointsTable::default();
    points.merge(&overlay);
    Ok(points)
}

/// Built-in achievement catalog.
#[must_use]
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::points(
            RULE_FIRST_STEPS,
            10,
            Reward::new("First Steps", 5)
                .describe("Started exploring our adventures")
                .icon("boot"),
        ),
        Rule::actions(
            RULE_EXPLORER,
            &[ACTION_TRIP_VIEW],
            3,
            Reward::new("Explorer", 15)
                .describe("Viewed three different trips")
                .icon("compass"),
        ),
        Rule::actions(
            RULE_WEATHER_WATCHER,
            &[ACTION_WEATHER_CHECK],
            1,
            Reward::new("Weather Watcher", 10)
                .describe("Checked conditions at a destination")
                .icon("cloud-sun"),
        ),
        Rule::actions(
            RULE_PLANNER,
            &[ACTION_PRICE_CALCULATOR, ACTION_CALENDAR_CHECK],
            3,
            Reward::new("Planner", 25)
                .describe("Compared prices and dates")
                .icon("calendar")
                .rarity(Rarity::Rare),
        ),
        Rule::actions(
            RULE_SOCIAL_BUTTERFLY,
            &[ACTION_SHARE],
            2,
            Reward::new("Social Butterfly", 20)
                .describe("Shared trips with friends")
                .icon("share")
                .rarity(Rarity::Rare),
        ),
        Rule::session_time(
            RULE_DEDICATED,
            DEDICATED_SESSION_MS,
            Reward::new("Dedicated Adventurer", 20)
                .describe("Spent five minutes planning")
                .icon("hourglass")
                .rarity(Rarity::Rare),
        ),
        Rule::points(
            RULE_CENTURY,
            100,
            Reward::new("Century", 10)
                .describe("Earned 100 points")
                .icon("medal"),
        ),
        Rule::points(
            RULE_HIGH_ROLLER,
            500,
            Reward::new("High Roller", 50)
                .describe("Earned 500 points")
                .icon("trophy")
                .rarity(Rarity::Epic),
        ),
        Rule::actions(
            RULE_READY_TO_ROLL,
            &[ACTION_BOOKING_STARTED],
            1,
            Reward::new("Ready to Roll", 50)
                .describe("Started a booking")
                .icon("backpack")
                .rarity(Rarity::Epic),
        ),
        Rule::combo(
            RULE_TRAILBLAZER,
            &[RULE_EXPLORER, RULE_PLANNER, RULE_WEATHER_WATCHER],
            Reward::new("Trailblazer", 100)
                .describe("Explored, planned and checked the forecast")
                .icon("mountain")
                .rarity(Rarity::Legendary),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = EngagementConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.rules.len(), 10);
        assert_eq!(cfg.storage_key, "summit.engagement");
    }

    #[test]
    fn partial_json_keeps_defaults_and_overlays_points() {
        let cfg = EngagementConfig::from_json(
            r#"{ "level_span": 50, "points": { "page_load": { "points": 2, "category": "browsing" } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.level_span, 50);
        assert_eq!(cfg.history_cap, 100);
        assert_eq!(cfg.points.lookup("page_load").points, 2);
        assert_eq!(cfg.points.lookup("weather_check").points, 20);
        assert_eq!(cfg.rules.len(), 10);
    }

    #[test]
    fn validation_rejects_broken_catalogs() {
        let mut cfg = EngagementConfig::default();
        cfg.level_span = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroLevelSpan));

        let mut cfg = EngagementConfig::default();
        cfg.rules.push(Rule::points(RULE_CENTURY, 1, Reward::new("Dup", 0)));
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DuplicateRule(RULE_CENTURY.to_string()))
        );

        let mut cfg = EngagementConfig::default();
        cfg.rules.push(Rule::combo("loop", &["loop"], Reward::new("Loop", 0)));
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::SelfReferentialCombo("loop".to_string()))
        );

        let mut cfg = EngagementConfig::default();
        cfg.rules.push(Rule::combo("ghost", &["missing"], Reward::new("Ghost", 0)));
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnknownPrerequisite { .. })
        ));

        let mut cfg = EngagementConfig::default();
        cfg.rules.push(Rule::actions("nothing", &[], 1, Reward::new("Nothing", 0)));
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyRule("nothing".to_string())));
    }
}
