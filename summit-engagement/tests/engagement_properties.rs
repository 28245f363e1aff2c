use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use summit_engagement::{
    EngagementConfig, EngagementSession, EvaluationContext, EventLog, ManualClock, NewEvent,
    PointsTable, Reward, Rule, RuleBook, level_for, recompute,
};

const ACTIONS: [&str; 8] = [
    "page_load",
    "trip_view",
    "weather_check",
    "price_calculator",
    "calendar_check",
    "share",
    "newsletter_signup",
    "booking_started",
];

fn random_journey(rng: &mut ChaCha20Rng, len: usize) -> Vec<(&'static str, u32)> {
    (0..len)
        .map(|_| {
            let action = ACTIONS[rng.gen_range(0..ACTIONS.len())];
            (action, rng.gen_range(0..60))
        })
        .collect()
}

fn replay(journey: &[(&str, u32)], cap: usize) -> EventLog {
    let table = PointsTable::default();
    let mut log = EventLog::new(cap);
    for (i, (action, points)) in journey.iter().enumerate() {
        log.append(
            NewEvent::new(*action).points(*points),
            &table,
            u64::try_from(i).unwrap(),
        );
    }
    log
}

#[test]
fn total_points_is_sum_regardless_of_order() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED_0001);
    for _ in 0..50 {
        let mut journey = random_journey(&mut rng, 40);
        let expected: u64 = journey.iter().map(|(_, p)| u64::from(*p)).sum();

        let forward = recompute(&replay(&journey, 100), 100);
        journey.shuffle(&mut rng);
        let shuffled = recompute(&replay(&journey, 100), 100);
        // A small cap archives most of the journey; totals must still match.
        let capped = recompute(&replay(&journey, 5), 100);

        assert_eq!(forward.total_points, expected);
        assert_eq!(shuffled.total_points, expected);
        assert_eq!(capped.total_points, expected);
        assert_eq!(forward.level, level_for(expected, 100));
    }
}

#[test]
fn level_examples() {
    for (total, level) in [(0, 1), (99, 1), (100, 2), (250, 3)] {
        assert_eq!(level_for(total, 100), level, "total {total}");
    }
}

#[test]
fn unlocks_never_revert_as_the_log_grows() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED_0002);
    let clock = ManualClock::starting_at(0);
    let mut session = EngagementSession::new(EngagementConfig::default(), clock.clone());
    let mut seen: Vec<String> = Vec::new();

    for (action, points) in random_journey(&mut rng, 200) {
        clock.advance(2_500);
        session.award(action, Some(points));
        for id in &seen {
            assert!(session.rules().is_unlocked(id), "{id} re-locked");
        }
        seen = session
            .rules()
            .records()
            .into_iter()
            .map(|record| record.id)
            .collect();
    }
    assert!(!seen.is_empty());
}

#[test]
fn evaluating_twice_without_new_events_is_idempotent() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED_0003);
    let table = PointsTable::default();
    let mut log = EventLog::new(100);
    let mut rules = RuleBook::new(EngagementConfig::default().rules);

    for (action, points) in random_journey(&mut rng, 30) {
        log.append(NewEvent::new(action).points(points), &table, 0);
        let progress = recompute(&log, 100);
        let ctx = EvaluationContext {
            progress: &progress,
            log: &log,
            elapsed_ms: 0,
            now: 0,
        };
        rules.evaluate(&ctx);
        let before = rules.clone();
        assert!(rules.evaluate(&ctx).is_empty());
        assert_eq!(rules, before);
    }
}

#[test]
fn combo_unlocks_no_later_than_the_following_pass() {
    let table = PointsTable::default();
    let mut log = EventLog::new(100);
    log.append(NewEvent::new("share").points(1), &table, 0);
    log.append(NewEvent::new("faq_open").points(1), &table, 0);
    let progress = recompute(&log, 100);
    let ctx = EvaluationContext {
        progress: &progress,
        log: &log,
        elapsed_ms: 0,
        now: 0,
    };
    let catalog = vec![
        Rule::actions("a", &["share"], 1, Reward::new("A", 0)),
        Rule::actions("b", &["faq_open"], 1, Reward::new("B", 0)),
        Rule::combo("ab", &["a", "b"], Reward::new("AB", 0)),
    ];

    let mut single = RuleBook::new(catalog.clone());
    single.evaluate_pass(&ctx);
    single.evaluate_pass(&ctx);
    assert!(single.is_unlocked("ab"));

    let mut fixed = RuleBook::new(catalog);
    let unlocked = fixed.evaluate(&ctx);
    assert_eq!(unlocked.len(), 3);
    assert!(fixed.is_unlocked("ab"));
}

#[test]
fn default_catalog_trailblazer_path() {
    let mut session = EngagementSession::new(EngagementConfig::default(), ManualClock::default());
    for _ in 0..3 {
        session.award("trip_view", None);
    }
    session.award("price_calculator", None);
    session.award("calendar_check", None);
    session.award("weather_check", None);
    assert!(!session.rules().is_unlocked("trailblazer"));

    let outcome = session.award("price_calculator", None);
    let ids: Vec<&str> = outcome.unlocked.iter().map(|u| u.rule_id.as_str()).collect();
    assert!(ids.contains(&"planner"));
    assert!(ids.contains(&"trailblazer"));
    assert!(session.challenges().iter().all(|c| c.rule_id != "trailblazer"));
}
