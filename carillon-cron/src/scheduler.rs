//! The clock: entry store and poll processing.

use carillon_log::{debug, info};

use crate::action::{Action, ActionContext, ActionId, ActionInfo};
use crate::error::{CronError, CronResult};
use crate::expression::{CronExpression, TickTime};

/// A caller-owned scheduler instance.
///
/// The clock owns its scheduled actions and drives the time matcher over
/// them on each poll. It is single-threaded and cooperative: every
/// mutating operation takes `&mut self`, so one logical owner serializes
/// all access, and callbacks run synchronously inside [`process`].
///
/// The host must call [`process`] at least once per minute boundary; a
/// minute in which no poll happens is silently skipped; there is no
/// backlog or catch-up.
///
/// [`process`]: Clock::process
pub struct Clock {
    actions: Vec<Action>,
    next_id: ActionId,
    last_tick: Option<TickTime>,
}

impl Clock {
    /// Create an empty clock.
    pub fn new() -> Self {
        debug!("clock created");
        Self {
            actions: Vec::new(),
            next_id: 0,
            last_tick: None,
        }
    }

    /// Register an action under a cron expression.
    ///
    /// On success the action is appended in insertion order and its id
    /// returned. On a parse failure nothing is registered and the id
    /// counter does not advance.
    ///
    /// # Examples
    ///
    /// ```
    /// use carillon_cron::{Clock, TickTime};
    ///
    /// let mut clock = Clock::new();
    /// let id = clock
    ///     .schedule("*/5 * * * *", |ctx| {
    ///         println!("five-minute mark at {}", ctx.tick);
    ///     })
    ///     .unwrap();
    ///
    /// let fired = clock.process(TickTime::new(5, 12, 10, 6, 2)).unwrap();
    /// assert_eq!(fired, 1);
    /// clock.unschedule(id).unwrap();
    /// ```
    pub fn schedule<F>(&mut self, expression: &str, action: F) -> CronResult<ActionId>
    where
        F: FnMut(ActionContext) + Send + 'static,
    {
        let schedule = CronExpression::parse(expression)?;

        let id = self.next_id;
        self.next_id += 1;
        info!("action {} scheduled with '{}'", id, schedule.expression());
        self.actions.push(Action::new(id, schedule, Box::new(action)));
        Ok(id)
    }

    /// Remove an action by id. The relative order of the remaining
    /// actions is preserved; the id is never reassigned.
    pub fn unschedule(&mut self, id: ActionId) -> CronResult<()> {
        let index = self
            .actions
            .iter()
            .position(|action| action.id == id)
            .ok_or(CronError::UnknownAction(id))?;
        self.actions.remove(index);
        info!("action {} unscheduled", id);
        Ok(())
    }

    /// Evaluate every action against the tick, firing matching callbacks
    /// synchronously in insertion order. Returns the number fired.
    ///
    /// The tick is validated first; an out-of-domain component returns an
    /// error before anything is evaluated. An action whose previous firing
    /// used this exact tick is skipped, so polling more than once within a
    /// matched minute fires it only once.
    pub fn process(&mut self, tick: TickTime) -> CronResult<u32> {
        tick.validate()?;

        let mut fired = 0u32;
        for action in &mut self.actions {
            if action.fire_if_due(tick) {
                fired += 1;
            }
        }
        self.last_tick = Some(tick);

        if fired > 0 {
            debug!("{} action(s) fired at {}", fired, tick);
        }
        Ok(fired)
    }

    /// Number of live actions.
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are scheduled.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Snapshot of one action's schedule and firing history.
    pub fn action_info(&self, id: ActionId) -> CronResult<ActionInfo> {
        self.actions
            .iter()
            .find(|action| action.id == id)
            .map(Action::info)
            .ok_or(CronError::UnknownAction(id))
    }

    /// Snapshots of every action, in insertion order.
    pub fn actions(&self) -> Vec<ActionInfo> {
        self.actions.iter().map(Action::info).collect()
    }

    /// The most recent successfully validated tick.
    pub fn last_tick(&self) -> Option<TickTime> {
        self.last_tick
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        debug!("clock destroyed, {} action(s) released", self.actions.len());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn count_fires(clock: &mut Clock, expression: &str) -> (ActionId, Arc<AtomicU32>) {
        let fired = Arc::new(AtomicU32::new(0));
        let observer = fired.clone();
        let id = clock
            .schedule(expression, move |_ctx| {
                observer.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        (id, fired)
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut clock = Clock::new();
        for expected in 0..5u64 {
            let (id, _) = count_fires(&mut clock, "* * * * *");
            assert_eq!(id, expected);
        }
        assert_eq!(clock.action_count(), 5);
    }

    #[test]
    fn test_parse_failure_registers_nothing() {
        let mut clock = Clock::new();
        assert_eq!(
            clock.schedule("60 * * * *", |_ctx| {}),
            Err(CronError::MinuteRange)
        );
        assert_eq!(clock.action_count(), 0);

        // the failed call must not have consumed an id
        let (id, _) = count_fires(&mut clock, "* * * * *");
        assert_eq!(id, 0);
    }

    #[test]
    fn test_unschedule_unknown_id() {
        let mut clock = Clock::new();
        assert_eq!(clock.unschedule(42), Err(CronError::UnknownAction(42)));
    }

    #[test]
    fn test_unschedule_preserves_order_and_never_reuses_ids() {
        let mut clock = Clock::new();
        for _ in 0..3 {
            count_fires(&mut clock, "* * * * *");
        }
        clock.unschedule(1).unwrap();

        let remaining: Vec<ActionId> = clock.actions().iter().map(|info| info.id).collect();
        assert_eq!(remaining, vec![0, 2]);

        let (id, _) = count_fires(&mut clock, "* * * * *");
        assert_eq!(id, 3);
    }

    #[test]
    fn test_process_validates_tick_first() {
        let mut clock = Clock::new();
        let (_, fired) = count_fires(&mut clock, "* * * * *");

        assert_eq!(
            clock.process(TickTime::new(60, 0, 1, 1, 0)),
            Err(CronError::OutOfRange(60))
        );
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(clock.last_tick().is_none());
    }

    #[test]
    fn test_process_is_idempotent_per_tick() {
        let mut clock = Clock::new();
        let (_, fired) = count_fires(&mut clock, "* * * * *");

        let tick = TickTime::new(7, 8, 10, 11, 6);
        assert_eq!(clock.process(tick).unwrap(), 1);
        assert_eq!(clock.process(tick).unwrap(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        assert_eq!(clock.process(TickTime::new(8, 8, 10, 11, 6)).unwrap(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_matching_actions_fire_in_insertion_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut clock = Clock::new();
        for _ in 0..3 {
            let log = order.clone();
            clock
                .schedule("* * * * *", move |ctx| {
                    log.lock().unwrap().push(ctx.id);
                })
                .unwrap();
        }

        clock.process(TickTime::new(0, 0, 1, 1, 0)).unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_only_matching_actions_fire() {
        let mut clock = Clock::new();
        let (_, on_the_hour) = count_fires(&mut clock, "0 * * * *");
        let (_, every_minute) = count_fires(&mut clock, "* * * * *");

        assert_eq!(clock.process(TickTime::new(30, 9, 1, 6, 1)).unwrap(), 1);
        assert_eq!(on_the_hour.load(Ordering::SeqCst), 0);
        assert_eq!(every_minute.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_action_info() {
        let mut clock = Clock::new();
        let (id, _) = count_fires(&mut clock, "0 12 * * *");

        let info = clock.action_info(id).unwrap();
        assert_eq!(info.expression, "0 12 * * *");
        assert_eq!(info.fire_count, 0);
        assert!(info.last_fired.is_none());

        let tick = TickTime::new(0, 12, 1, 6, 1);
        clock.process(tick).unwrap();
        let info = clock.action_info(id).unwrap();
        assert_eq!(info.fire_count, 1);
        assert_eq!(info.last_fired, Some(tick));

        assert_eq!(clock.action_info(99), Err(CronError::UnknownAction(99)));
    }

    #[test]
    fn test_last_tick_tracks_validated_polls() {
        let mut clock = Clock::new();
        assert!(clock.last_tick().is_none());

        let tick = TickTime::new(5, 5, 5, 5, 5);
        clock.process(tick).unwrap();
        assert_eq!(clock.last_tick(), Some(tick));
    }
}
