use std::hash::Hasher;

use serde_json::{Map, Value};
use summit_engagement::{
    Category, EngagementConfig, EngagementSession, ManualClock, Rule, Snapshot, Threshold,
    default_rules,
};
use twox_hash::XxHash64;

const SHIPPED_CONFIG: &str = include_str!("../../summit-web/static/assets/data/engagement.json");

#[test]
fn shipped_config_matches_built_in_catalog() {
    let shipped = EngagementConfig::from_json(SHIPPED_CONFIG).unwrap();
    shipped.validate().unwrap();
    assert_eq!(shipped, EngagementConfig::default());
}

#[test]
fn catalog_fingerprint_is_stable_and_change_sensitive() {
    let baseline = catalog_hash(&default_rules());
    assert_eq!(baseline, catalog_hash(&default_rules()));

    let mut tweaked = default_rules();
    if let Some(Rule {
        threshold: Threshold::Points { at_least },
        ..
    }) = tweaked.iter_mut().find(|rule| rule.id == "century")
    {
        *at_least = 101;
    }
    assert_ne!(baseline, catalog_hash(&tweaked));
}

#[test]
fn snapshot_roundtrip_preserves_session() {
    let clock = ManualClock::starting_at(1_700_000_000_000);
    let mut session = EngagementSession::new(EngagementConfig::default(), clock.clone());
    for action in ["page_load", "trip_view", "weather_check", "share", "share"] {
        clock.advance(4_000);
        session.award(action, None);
    }
    session.record(
        summit_engagement::NewEvent::new("booking_created")
            .subject("patagonia-w-trek")
            .category(Category::Booking),
    );

    let json = session.snapshot().to_json().unwrap();
    let restored_snapshot = Snapshot::parse_or_default(Some(&json));
    assert_eq!(restored_snapshot, session.snapshot());

    let restored = EngagementSession::restore(EngagementConfig::default(), restored_snapshot, clock);
    assert_eq!(restored.progress(), session.progress());
    assert_eq!(restored.rules().records(), session.rules().records());
    assert_eq!(restored.lead_score(), session.lead_score());
    assert_eq!(
        restored.log().last().and_then(|event| event.subject.as_deref()),
        Some("patagonia-w-trek")
    );
}

fn catalog_hash(rules: &[Rule]) -> u64 {
    let value = canonicalize_value(serde_json::to_value(rules).unwrap());
    let canonical = serde_json::to_string(&value).unwrap();
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(canonical.as_bytes());
    hasher.finish()
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_value).collect()),
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut result = Map::with_capacity(entries.len());
            for (key, value) in entries {
                result.insert(key, canonicalize_value(value));
            }
            Value::Object(result)
        }
        other => other,
    }
}
