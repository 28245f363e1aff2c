//! Engine invariants checked after every replayed journey.

use anyhow::{Result, bail, ensure};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeSet;
use summit_engagement::{
    Clock, EngagementEngine, EngagementSession, EvaluationContext, Event, EventLog, ManualClock,
    NewEvent, level_for, recompute,
};

use super::harness::{MemoryStorage, TesterLoader};

/// Total equals the sum of every recorded event, including reward credits.
pub fn check_sum(session: &EngagementSession<ManualClock>, recorded: &[Event]) -> Result<()> {
    let expected: u64 = recorded.iter().map(|e| u64::from(e.points)).sum();
    let total = session.progress().total_points;
    ensure!(
        total == expected,
        "total {total} differs from summed events {expected}"
    );
    ensure!(
        session.log().total_points() == expected,
        "log total {} differs from summed events {expected}",
        session.log().total_points()
    );
    Ok(())
}

pub fn check_level(session: &EngagementSession<ManualClock>) -> Result<()> {
    let progress = session.progress();
    let expected = level_for(progress.total_points, session.config().level_span);
    ensure!(
        progress.level == expected,
        "level {} for {} points, expected {expected}",
        progress.level,
        progress.total_points
    );
    Ok(())
}

/// Replaying the recorded events in a shuffled order yields the same total.
pub fn check_permutation(
    session: &EngagementSession<ManualClock>,
    recorded: &[Event],
    seed: u64,
) -> Result<()> {
    let mut shuffled = recorded.to_vec();
    shuffled.shuffle(&mut ChaCha20Rng::seed_from_u64(seed ^ 0x9E37_79B9));
    let config = session.config();
    let mut log = EventLog::new(config.history_cap);
    for event in shuffled {
        log.append(
            NewEvent::new(event.action)
                .points(event.points)
                .category(event.category),
            &config.points,
            event.timestamp,
        );
    }
    let replayed = recompute(&log, config.level_span);
    let progress = session.progress();
    ensure!(
        replayed.total_points == progress.total_points && replayed.level == progress.level,
        "permuted replay gives {} pts level {}, session has {} pts level {}",
        replayed.total_points,
        replayed.level,
        progress.total_points,
        progress.level
    );
    Ok(())
}

/// Every id in `before` is still unlocked.
pub fn check_monotonic(
    before: &BTreeSet<String>,
    session: &EngagementSession<ManualClock>,
) -> Result<()> {
    for id in before {
        if !session.rules().is_unlocked(id) {
            bail!("achievement {id} re-locked");
        }
    }
    Ok(())
}

/// A further evaluation with no new events unlocks nothing.
pub fn check_idempotent(session: &EngagementSession<ManualClock>) -> Result<()> {
    let mut rules = session.rules().clone();
    let ctx = EvaluationContext {
        progress: session.progress(),
        log: session.log(),
        elapsed_ms: session.elapsed_ms(),
        now: session.clock().now_ms(),
    };
    let extra = rules.evaluate(&ctx);
    ensure!(
        extra.is_empty(),
        "re-evaluation unlocked {:?}",
        extra.iter().map(|u| u.rule_id.as_str()).collect::<Vec<_>>()
    );
    Ok(())
}

/// Persisting and reopening through the engine restores the same state.
pub fn check_snapshot_roundtrip(
    engine: &EngagementEngine<TesterLoader, MemoryStorage>,
    session: &EngagementSession<ManualClock>,
) -> Result<()> {
    engine.persist(session)?;
    let reopened = engine.open_session(session.clock().clone());
    ensure!(
        reopened.progress() == session.progress(),
        "restored progress {:?} vs {:?}",
        reopened.progress(),
        session.progress()
    );
    ensure!(
        reopened.rules().records() == session.rules().records(),
        "restored achievements differ"
    );
    ensure!(
        reopened.lead_score() == session.lead_score(),
        "restored lead score differs"
    );
    Ok(())
}
