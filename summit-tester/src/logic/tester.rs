use anyhow::{Result, ensure};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use summit_engagement::{
    EngagementEngine, EngagementSession, Event, LeadScore, LeadTier, ManualClock,
};

use super::harness::{MemoryStorage, TesterLoader};
use super::invariants;
use super::journey::build_journey;
use crate::common::scenario::{Expectations, TestScenario};

/// Visitors start on a fixed wall-clock instant so runs are reproducible.
const JOURNEY_EPOCH_MS: u64 = 1_700_000_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// What one replayed journey ended with.
#[derive(Debug, Clone)]
pub struct JourneySummary {
    pub steps: usize,
    pub total_points: u64,
    pub level: u32,
    pub unlocked: Vec<String>,
    pub lead: LeadScore,
}

pub struct LogicTester {
    loader: TesterLoader,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(loader: TesterLoader, verbose: bool) -> Self {
        Self { loader, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (seed: {})",
                    scenario.name.bright_white(),
                    seed
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            match self.run_journey(scenario, iteration_seed) {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) steps:{} points:{} level:{} badges:{} lead:{} ({})",
                            i + 1,
                            iterations,
                            summary.steps,
                            summary.total_points,
                            summary.level,
                            summary.unlocked.len(),
                            summary.lead.score,
                            summary.lead.tier
                        );
                    }
                }
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): {err:#}",
                        i + 1
                    ));
                    if self.verbose {
                        println!(
                            "  {} Iteration {}/{} failed: {err:#}",
                            "❌".red(),
                            i + 1,
                            iterations
                        );
                    }
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }

    /// Replay one seeded journey and check every invariant along the way.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant or scenario expectation.
    pub fn run_journey(&self, scenario: &TestScenario, seed: u64) -> Result<JourneySummary> {
        let engine = EngagementEngine::new(self.loader.clone(), MemoryStorage::default());
        let clock = ManualClock::starting_at(JOURNEY_EPOCH_MS);
        let mut session = engine.open_session(clock.clone());
        let steps = build_journey(&scenario.journey, seed);

        let mut recorded: Vec<Event> = Vec::new();
        let mut unlocked: BTreeSet<String> = BTreeSet::new();
        for step in &steps {
            clock.advance(step.dwell_ms);
            let outcome = session.record(step.to_event());
            recorded.push(outcome.event);
            recorded.extend(outcome.rewards);
            invariants::check_monotonic(&unlocked, &session)?;
            invariants::check_level(&session)?;
            unlocked.extend(outcome.unlocked.into_iter().map(|u| u.rule_id));
        }
        let first_tick_id = session.log().next_id();
        session.tick();
        recorded.extend(
            session
                .log()
                .iter()
                .filter(|e| e.id.0 >= first_tick_id)
                .cloned(),
        );

        invariants::check_sum(&session, &recorded)?;
        invariants::check_level(&session)?;
        invariants::check_monotonic(&unlocked, &session)?;
        invariants::check_permutation(&session, &recorded, seed)?;
        invariants::check_idempotent(&session)?;
        invariants::check_snapshot_roundtrip(&engine, &session)?;

        let summary = JourneySummary {
            steps: steps.len(),
            total_points: session.progress().total_points,
            level: session.progress().level,
            unlocked: session
                .rules()
                .records()
                .into_iter()
                .map(|r| r.id)
                .collect(),
            lead: session.lead_score(),
        };
        check_expectations(&scenario.expect, &session, &summary)?;
        Ok(summary)
    }
}

fn check_expectations(
    expect: &Expectations,
    session: &EngagementSession<ManualClock>,
    summary: &JourneySummary,
) -> Result<()> {
    for id in expect.unlocked {
        ensure!(session.rules().is_unlocked(id), "expected {id} to be unlocked");
    }
    if let Some(total) = expect.total_points {
        ensure!(
            summary.total_points == total,
            "expected {total} points, got {}",
            summary.total_points
        );
    }
    if let Some(level) = expect.level {
        ensure!(
            summary.level == level,
            "expected level {level}, got {}",
            summary.level
        );
    }
    let tier: LeadTier = summary.lead.tier;
    if let Some(min) = expect.min_tier {
        ensure!(tier >= min, "lead tier {tier} below {min}");
    }
    if let Some(max) = expect.max_tier {
        ensure!(tier <= max, "lead tier {tier} above {max}");
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
