//! Minute-resolution cron scheduling for Carillon.
//!
//! Provides a host-polled cron engine with support for:
//! - ⏰ Five-field cron expressions with `@`-shorthand aliases
//! - 🧮 Compact bitmask field representation
//! - 🔁 At-most-once-per-matched-minute firing
//! - 📋 Insertion-ordered action store with stable ids
//! - ❌ Field-precise parse errors
//!
//! The engine never reads the wall clock. The host decomposes its own
//! time source into a [`TickTime`] and polls [`Clock::process`] at least
//! once per minute boundary; callbacks for matching actions run
//! synchronously inside the poll, in the order they were scheduled.
//!
//! ## Quick Start
//!
//! ```
//! use carillon_cron::{Clock, TickTime};
//!
//! let mut clock = Clock::new();
//!
//! // Fire at minute 30 of every hour
//! let id = clock
//!     .schedule("30 * * * *", |ctx| {
//!         println!("half past, firing #{}", ctx.fire_count + 1);
//!     })
//!     .unwrap();
//!
//! // Host poll: 09:30 on Monday June 1st
//! let fired = clock.process(TickTime::new(30, 9, 1, 6, 1)).unwrap();
//! assert_eq!(fired, 1);
//!
//! // Polling again inside the same minute is a no-op
//! let fired = clock.process(TickTime::new(30, 9, 1, 6, 1)).unwrap();
//! assert_eq!(fired, 0);
//!
//! clock.unschedule(id).unwrap();
//! assert_eq!(clock.action_count(), 0);
//! ```
//!
//! ## Expression Grammar
//!
//! Each of the five fields (minute, hour, day of month, month, day of
//! week) is a comma-separated list of items: a literal value, an
//! inclusive range `a-b`, a stepped range `a-b/s`, `*`, or a stepped
//! asterisk `*/s`. Day of month and day of week combine disjunctively:
//! when both are constrained, matching either is enough.
//!
//! ```
//! use carillon_cron::CronExpression;
//!
//! let expr = CronExpression::parse("*/15 9-17 * * 1-5").unwrap();
//! assert_eq!(expr.expression(), "*/15 9-17 * * 1-5");
//!
//! // Shorthand aliases expand before parsing
//! assert!(CronExpression::parse("@daily").is_ok());
//! ```

pub mod action;
pub mod error;
pub mod expression;
pub mod field;
pub mod scheduler;

pub use action::{ActionContext, ActionFn, ActionId, ActionInfo};
pub use error::{CronError, CronResult};
pub use expression::{CronExpression, TickTime, presets};
pub use field::{FieldKind, FieldMask};
pub use scheduler::Clock;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::{ActionContext, ActionId, ActionInfo};
    pub use crate::error::{CronError, CronResult};
    pub use crate::expression::{CronExpression, TickTime, presets};
    pub use crate::field::FieldMask;
    pub use crate::scheduler::Clock;
}
