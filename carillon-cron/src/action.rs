//! Scheduled entries and the callback capability.

use crate::expression::{CronExpression, TickTime};

/// Identifier of a scheduled action. Monotonically increasing, never
/// reused, even after the action is unscheduled.
pub type ActionId = u64;

/// Callback invoked when an action's schedule matches a poll tick.
///
/// Context travels inside the closure's captures; the engine assumes
/// nothing about it beyond the entry's lifetime.
pub type ActionFn = Box<dyn FnMut(ActionContext) + Send>;

/// Snapshot handed to a callback at each firing.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext {
    /// The fired action's id.
    pub id: ActionId,
    /// The tick that matched.
    pub tick: TickTime,
    /// Number of earlier firings of this action.
    pub fire_count: u64,
}

/// One scheduled entry: schedule, callback and firing history. Owned
/// exclusively by the clock's entry store.
pub(crate) struct Action {
    pub(crate) id: ActionId,
    schedule: CronExpression,
    callback: ActionFn,
    last_fired: Option<TickTime>,
    fire_count: u64,
}

impl Action {
    pub(crate) fn new(id: ActionId, schedule: CronExpression, callback: ActionFn) -> Self {
        Self {
            id,
            schedule,
            callback,
            last_fired: None,
            fire_count: 0,
        }
    }

    /// Fire the callback if the tick matches the schedule and differs from
    /// the tick of the previous firing. Returns whether it fired.
    ///
    /// The duplicate check is what makes polling idempotent: a host that
    /// polls several times within one matched minute sees exactly one
    /// firing.
    pub(crate) fn fire_if_due(&mut self, tick: TickTime) -> bool {
        if !self.schedule.matches(tick) {
            return false;
        }
        if self.last_fired == Some(tick) {
            return false;
        }

        let context = ActionContext {
            id: self.id,
            tick,
            fire_count: self.fire_count,
        };
        (self.callback)(context);

        self.last_fired = Some(tick);
        self.fire_count += 1;
        true
    }

    pub(crate) fn info(&self) -> ActionInfo {
        ActionInfo {
            id: self.id,
            expression: self.schedule.expression().to_string(),
            fire_count: self.fire_count,
            last_fired: self.last_fired,
        }
    }
}

/// Public snapshot of one scheduled action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    /// The action's id.
    pub id: ActionId,
    /// The schedule expression as given by the caller.
    pub expression: String,
    /// Total number of firings so far.
    pub fire_count: u64,
    /// The tick of the most recent firing, if any.
    pub last_fired: Option<TickTime>,
}
