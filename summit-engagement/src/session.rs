//! Engagement session: the event log, its fold and the rule book, wired
//! together and recomputed synchronously after every recorded action.
use crate::bus::{Notification, NotificationBus, SubscriptionId};
use crate::clock::{Clock, SystemClock};
use crate::config::EngagementConfig;
use crate::constants::ACTION_ACHIEVEMENT_UNLOCKED;
use crate::event::{Category, Event, EventLog, NewEvent};
use crate::lead::LeadScore;
use crate::progress::{LevelUp, Progress, recompute};
use crate::rules::{EvaluationContext, RuleBook, RuleProgress, Unlock};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// Everything that changed as a result of one recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    /// The event appended for the action itself.
    pub event: Event,
    /// Reward credits appended for achievements unlocked along the way.
    pub rewards: Vec<Event>,
    pub progress: Progress,
    pub level_up: Option<LevelUp>,
    pub unlocked: Vec<Unlock>,
}

/// Locked achievement with its current progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub rule_id: String,
    pub title: String,
    pub description: String,
    pub reward_points: u32,
    pub progress: RuleProgress,
}

#[derive(Debug, Default)]
struct Settled {
    rewards: Vec<Event>,
    unlocked: Vec<Unlock>,
    level_up: Option<LevelUp>,
}

pub struct EngagementSession<C: Clock = SystemClock> {
    config: EngagementConfig,
    log: EventLog,
    progress: Progress,
    rules: RuleBook,
    bus: NotificationBus,
    clock: C,
    started_at: u64,
}

impl<C: Clock> std::fmt::Debug for EngagementSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementSession")
            .field("progress", &self.progress)
            .field("events", &self.log.total_events())
            .field("unlocked", &self.rules.unlocked_count())
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> EngagementSession<C> {
    /// Start an empty session.
    #[must_use]
    pub fn new(config: EngagementConfig, clock: C) -> Self {
        Self::restore(config, Snapshot::default(), clock)
    }

    /// Rebuild a session from a persisted snapshot.
    ///
    /// Progress is recomputed from the stored history; a disagreeing stored
    /// total is logged and ignored.
    #[must_use]
    pub fn restore(config: EngagementConfig, snapshot: Snapshot, clock: C) -> Self {
        let log = EventLog::from_parts(
            snapshot.points_history,
            snapshot.archived,
            snapshot.next_event_id,
            config.history_cap,
        );
        let progress = recompute(&log, config.level_span);
        if progress.total_points != snapshot.total_points || progress.level != snapshot.level {
            log::warn!(
                "persisted progress ({} pts, level {}) disagrees with event history ({} pts, level {}); using history",
                snapshot.total_points,
                snapshot.level,
                progress.total_points,
                progress.level
            );
        }
        let mut rules = RuleBook::new(config.rules.clone());
        rules.restore(snapshot.achievements);
        let started_at = clock.now_ms();
        Self {
            config,
            log,
            progress,
            rules,
            bus: NotificationBus::new(),
            clock,
            started_at,
        }
    }

    /// Record a visitor action, then recompute progress and unlocks.
    pub fn record(&mut self, new: impl Into<NewEvent>) -> RecordOutcome {
        let now = self.clock.now_ms();
        let previous = self.progress;
        let event = self.log.append(new.into(), &self.config.points, now);
        self.progress = recompute(&self.log, self.config.level_span);
        let settled = self.settle(previous, now);

        self.bus.publish(&Notification::PointsAwarded {
            event: event.clone(),
        });
        self.publish(&settled);

        RecordOutcome {
            event,
            rewards: settled.rewards,
            progress: self.progress,
            level_up: settled.level_up,
            unlocked: settled.unlocked,
        }
    }

    /// Record `action`, taking points from the table when `points` is `None`.
    pub fn award(&mut self, action: &str, points: Option<u32>) -> RecordOutcome {
        self.record(NewEvent::new(action).maybe_points(points))
    }

    /// Re-evaluate time-based rules without recording an action.
    pub fn tick(&mut self) -> Vec<Unlock> {
        let now = self.clock.now_ms();
        let previous = self.progress;
        let settled = self.settle(previous, now);
        self.publish(&settled);
        settled.unlocked
    }

    fn settle(&mut self, previous: Progress, now: u64) -> Settled {
        let elapsed_ms = now.saturating_sub(self.started_at);
        let mut settled = Settled::default();
        loop {
            let ctx = EvaluationContext {
                progress: &self.progress,
                log: &self.log,
                elapsed_ms,
                now,
            };
            let batch = self.rules.evaluate(&ctx);
            if batch.is_empty() {
                break;
            }
            for unlock in &batch {
                if unlock.reward.points == 0 {
                    continue;
                }
                let reward = NewEvent::new(ACTION_ACHIEVEMENT_UNLOCKED)
                    .points(unlock.reward.points)
                    .category(Category::Achievement)
                    .subject(unlock.rule_id.clone());
                settled
                    .rewards
                    .push(self.log.append(reward, &self.config.points, now));
            }
            self.progress = recompute(&self.log, self.config.level_span);
            settled.unlocked.extend(batch);
        }
        settled.level_up = self.progress.level_change(&previous);
        if let Some(level_up) = settled.level_up {
            log::debug!("level up: {} -> {}", level_up.from, level_up.to);
        }
        settled
    }

    fn publish(&mut self, settled: &Settled) {
        for reward in &settled.rewards {
            self.bus.publish(&Notification::PointsAwarded {
                event: reward.clone(),
            });
        }
        if let Some(level_up) = settled.level_up {
            self.bus.publish(&Notification::LevelUp(level_up));
        }
        for unlock in &settled.unlocked {
            self.bus.publish(&Notification::AchievementUnlocked {
                unlock: unlock.clone(),
            });
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Notification) + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleBook {
        &self.rules
    }

    #[must_use]
    pub const fn config(&self) -> &EngagementConfig {
        &self.config
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Milliseconds since the session opened.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.started_at)
    }

    #[must_use]
    pub fn lead_score(&self) -> LeadScore {
        self.config.lead.score(&self.log, &self.progress)
    }

    /// Locked achievements with progress, in catalog order.
    #[must_use]
    pub fn challenges(&self) -> Vec<Challenge> {
        let now = self.clock.now_ms();
        let ctx = EvaluationContext {
            progress: &self.progress,
            log: &self.log,
            elapsed_ms: now.saturating_sub(self.started_at),
            now,
        };
        self.rules
            .achievements()
            .filter(|view| !view.is_unlocked())
            .filter_map(|view| {
                self.rules.progress(&view.rule.id, &ctx).map(|progress| Challenge {
                    rule_id: view.rule.id.clone(),
                    title: view.rule.reward.title.clone(),
                    description: view.rule.reward.description.clone(),
                    reward_points: view.rule.reward.points,
                    progress,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.log, &self.progress, &self.rules)
    }

    /// Forget all history and unlocks and restart the session timer.
    pub fn reset(&mut self) {
        self.log.clear();
        self.rules.reset();
        self.progress = Progress::default();
        self.started_at = self.clock.now_ms();
    }
}
