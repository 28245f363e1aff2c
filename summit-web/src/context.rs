//! Shared engagement handle for UI components.
//!
//! One [`EngagementContext`] is created at startup and cloned into whatever
//! needs to award points. Every recorded action is persisted before
//! listeners run. Listeners may record further actions from inside a
//! notification; those are queued and delivered after the current batch.
//! Listeners may also subscribe or unsubscribe while being notified. A
//! listener removed mid-batch hears nothing further, and one added mid-batch
//! starts with the next notification.

use crate::backend::BackendEvent;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use summit_engagement::{
    AchievementRecord, Challenge, Clock, DataLoader, EngagementEngine, EngagementSession,
    EngagementStorage, LeadScore, NewEvent, Notification, NotificationBus, Progress,
    RecordOutcome, Snapshot, SubscriptionId, Unlock,
};

pub struct EngagementContext<L, S, C>
where
    L: DataLoader,
    S: EngagementStorage,
    C: Clock,
{
    engine: Rc<EngagementEngine<L, S>>,
    session: Rc<RefCell<EngagementSession<C>>>,
    listeners: Rc<RefCell<NotificationBus>>,
    pending: Rc<RefCell<VecDeque<Notification>>>,
    dispatching: Rc<Cell<bool>>,
}

impl<L, S, C> Clone for EngagementContext<L, S, C>
where
    L: DataLoader,
    S: EngagementStorage,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            session: Rc::clone(&self.session),
            listeners: Rc::clone(&self.listeners),
            pending: Rc::clone(&self.pending),
            dispatching: Rc::clone(&self.dispatching),
        }
    }
}

impl<L, S, C> std::fmt::Debug for EngagementContext<L, S, C>
where
    L: DataLoader,
    S: EngagementStorage,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementContext")
            .field("session", &self.session)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl<L, S, C> EngagementContext<L, S, C>
where
    L: DataLoader,
    S: EngagementStorage,
    C: Clock,
{
    /// Open the persisted session behind `engine`.
    pub fn open(engine: EngagementEngine<L, S>, clock: C) -> Self {
        let mut session = engine.open_session(clock);
        let pending = Rc::new(RefCell::new(VecDeque::new()));
        {
            let pending = Rc::clone(&pending);
            session.subscribe(move |note| pending.borrow_mut().push_back(note.clone()));
        }
        log::debug!("engagement session opened: {session:?}");
        Self {
            engine: Rc::new(engine),
            session: Rc::new(RefCell::new(session)),
            listeners: Rc::new(RefCell::new(NotificationBus::new())),
            pending,
            dispatching: Rc::new(Cell::new(false)),
        }
    }

    pub fn record(&self, new: impl Into<NewEvent>) -> RecordOutcome {
        let outcome = self.session.borrow_mut().record(new);
        self.persist();
        self.dispatch();
        outcome
    }

    /// Record `action`, taking points from the table when `points` is `None`.
    pub fn award(&self, action: &str, points: Option<u32>) -> RecordOutcome {
        self.record(NewEvent::new(action).maybe_points(points))
    }

    /// Log a point-earning event for a confirmed backend operation.
    pub fn notify(&self, event: BackendEvent) -> RecordOutcome {
        self.record(event)
    }

    /// Re-evaluate time-based achievements. Hosts call this from their own timer.
    pub fn tick(&self) -> Vec<Unlock> {
        let unlocked = self.session.borrow_mut().tick();
        if !unlocked.is_empty() {
            self.persist();
        }
        self.dispatch();
        unlocked
    }

    /// Register a listener.
    pub fn subscribe(&self, listener: impl FnMut(&Notification) + 'static) -> SubscriptionId {
        self.listeners.borrow_mut().subscribe(listener)
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().unsubscribe(id)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        *self.session.borrow().progress()
    }

    #[must_use]
    pub fn lead_score(&self) -> LeadScore {
        self.session.borrow().lead_score()
    }

    #[must_use]
    pub fn challenges(&self) -> Vec<Challenge> {
        self.session.borrow().challenges()
    }

    #[must_use]
    pub fn achievements(&self) -> Vec<AchievementRecord> {
        self.session.borrow().rules().records()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.session.borrow().snapshot()
    }

    /// Run `f` against the underlying session.
    pub fn with_session<R>(&self, f: impl FnOnce(&EngagementSession<C>) -> R) -> R {
        f(&self.session.borrow())
    }

    /// Forget everything and delete the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored snapshot cannot be deleted.
    pub fn reset(&self) -> Result<(), S::Error> {
        self.pending.borrow_mut().clear();
        self.engine.clear(&mut self.session.borrow_mut())
    }

    fn persist(&self) {
        if let Err(err) = self.engine.persist(&self.session.borrow()) {
            log::warn!("failed to persist engagement snapshot: {err}");
        }
    }

    fn dispatch(&self) {
        // Re-entrant calls leave their notifications for the outer loop.
        if self.dispatching.replace(true) {
            return;
        }
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(note) = next else {
                break;
            };
            let handles = self.listeners.borrow().handles();
            for handle in handles {
                // Skip listeners removed earlier in this batch.
                if self.listeners.borrow().is_subscribed(handle.id()) {
                    handle.deliver(&note);
                }
            }
        }
        self.dispatching.set(false);
    }
}
