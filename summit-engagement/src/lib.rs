//! Summit Engagement Engine
//!
//! Platform-agnostic visitor engagement logic for the Summit trip site:
//! an append-only event log, the points/level fold over it, monotonic
//! achievement rules, lead scoring and a notification bus. This crate has no
//! browser dependencies; platforms plug in through [`DataLoader`] and
//! [`EngagementStorage`].

pub mod bus;
pub mod clock;
pub mod config;
pub mod constants;
pub mod event;
pub mod lead;
pub mod numbers;
pub mod points;
pub mod progress;
pub mod rules;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use bus::{ListenerHandle, Notification, NotificationBus, SubscriptionId};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngagementConfig, default_rules};
pub use event::{Category, Event, EventId, EventLog, NewEvent, Tally};
pub use lead::{LeadScore, LeadScoringCfg, LeadSignal, LeadTier};
pub use points::{PointsEntry, PointsTable};
pub use progress::{LevelUp, Progress, level_for, recompute};
pub use rules::{
    AchievementRecord, AchievementView, EvaluationContext, Rarity, Reward, Rule, RuleBook,
    RuleProgress, Threshold, Unlock,
};
pub use session::{Challenge, EngagementSession, RecordOutcome};
pub use snapshot::Snapshot;

use anyhow::Context;

/// Trait for abstracting configuration loading.
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting snapshot persistence.
/// Platform-specific implementations should provide this
pub trait EngagementStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the snapshot under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_snapshot(&self, key: &str, snapshot: &Snapshot) -> Result<(), Self::Error>;

    /// Raw stored value for `key`, if any. Parsing is left to the engine so
    /// malformed values degrade to defaults instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable.
    fn load_snapshot(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Delete the stored value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be removed.
    fn delete_snapshot(&self, key: &str) -> Result<(), Self::Error>;
}

/// Main engine binding a config source to snapshot storage.
pub struct EngagementEngine<L, S>
where
    L: DataLoader,
    S: EngagementStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> EngagementEngine<L, S>
where
    L: DataLoader,
    S: EngagementStorage,
{
    /// Create a new engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load and validate the `engagement` configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn load_config(&self) -> Result<EngagementConfig, anyhow::Error> {
        let config: EngagementConfig = self
            .data_loader
            .load_config("engagement")
            .context("loading engagement config")?;
        config.validate().context("validating engagement config")?;
        Ok(config)
    }

    /// Open a session from persisted state.
    ///
    /// Never fails: an unusable config falls back to the built-in catalog and
    /// unreadable storage starts from zero, both with a warning.
    pub fn open_session<C: Clock>(&self, clock: C) -> EngagementSession<C> {
        let config = self.load_config().unwrap_or_else(|err| {
            log::warn!("falling back to built-in engagement config: {err:#}");
            EngagementConfig::default()
        });
        let raw = self
            .storage
            .load_snapshot(&config.storage_key)
            .unwrap_or_else(|err| {
                log::warn!("engagement storage unavailable: {err}");
                None
            });
        let snapshot = Snapshot::parse_or_default(raw.as_deref());
        EngagementSession::restore(config, snapshot, clock)
    }

    /// Persist the session's snapshot. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn persist<C: Clock>(&self, session: &EngagementSession<C>) -> Result<(), S::Error> {
        self.storage
            .save_snapshot(&session.config().storage_key, &session.snapshot())
    }

    /// Reset the session and remove its persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored snapshot cannot be deleted.
    pub fn clear<C: Clock>(&self, session: &mut EngagementSession<C>) -> Result<(), S::Error> {
        session.reset();
        self.storage.delete_snapshot(&session.config().storage_key)
    }
}
