//! Schedule expression parsing and time matching.

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone, Timelike};

use crate::error::{CronError, CronResult};
use crate::field::{FieldKind, FieldMask, parse_field};

/// Host-supplied decomposed wall-clock time for one poll.
///
/// The engine never reads the clock itself; the host decomposes its time
/// source into this tuple and passes it to [`Clock::process`] at least once
/// per minute boundary.
///
/// [`Clock::process`]: crate::Clock::process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTime {
    /// 0-59
    pub minute: u8,
    /// 0-23
    pub hour: u8,
    /// 1-31
    pub day_of_month: u8,
    /// 1-12
    pub month: u8,
    /// 0-7 (0 or 7 is Sunday)
    pub day_of_week: u8,
}

impl TickTime {
    /// Assemble a tick from its five components.
    pub fn new(minute: u8, hour: u8, day_of_month: u8, month: u8, day_of_week: u8) -> Self {
        Self {
            minute,
            hour,
            day_of_month,
            month,
            day_of_week,
        }
    }

    /// Decompose a chrono datetime into a tick. Months come out 1-12 and
    /// weekdays 0-6 Sunday-based, matching the tuple domains.
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        Self {
            minute: datetime.minute() as u8,
            hour: datetime.hour() as u8,
            day_of_month: datetime.day() as u8,
            month: datetime.month() as u8,
            day_of_week: datetime.weekday().num_days_from_sunday() as u8,
        }
    }

    /// Check every component against its domain.
    pub(crate) fn validate(&self) -> CronResult<()> {
        let out_of_range = |value: u8| CronError::OutOfRange(i64::from(value));
        if self.minute > 59 {
            return Err(out_of_range(self.minute));
        }
        if self.hour > 23 {
            return Err(out_of_range(self.hour));
        }
        if self.day_of_month < 1 || self.day_of_month > 31 {
            return Err(out_of_range(self.day_of_month));
        }
        if self.month < 1 || self.month > 12 {
            return Err(out_of_range(self.month));
        }
        if self.day_of_week > 7 {
            return Err(out_of_range(self.day_of_week));
        }
        Ok(())
    }
}

impl fmt::Display for TickTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} dom {} month {} dow {}",
            self.hour, self.minute, self.day_of_month, self.month, self.day_of_week
        )
    }
}

/// Parsed schedule expression: five bitmask fields plus the original text.
///
/// Immutable once parsed; owned by the entry it schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    minute: FieldMask,
    hour: FieldMask,
    day_of_month: FieldMask,
    month: FieldMask,
    day_of_week: FieldMask,
    expression: String,
}

impl CronExpression {
    /// Parse a five-field cron expression.
    ///
    /// Fields are minute, hour, day of month, month, day of week, separated
    /// by whitespace. `@`-shorthand aliases (`@hourly`, `@daily`,
    /// `@midnight`, `@weekly`, `@monthly`, `@yearly`, `@annually`) expand
    /// to their five-field equivalents before parsing.
    ///
    /// # Examples
    ///
    /// ```
    /// use carillon_cron::CronExpression;
    ///
    /// // Minute 0 of every hour
    /// let expr = CronExpression::parse("0 * * * *").unwrap();
    /// assert_eq!(expr.expression(), "0 * * * *");
    ///
    /// // Every third minute during the odd hours of the morning, in November
    /// let expr = CronExpression::parse("*/3 1-10/2 * 11 *").unwrap();
    /// assert!(expr.minute().contains(6));
    /// assert!(!expr.minute().contains(7));
    /// ```
    pub fn parse(expression: &str) -> CronResult<Self> {
        let text = expression.trim();
        let expanded = expand_alias(text)?;

        let fields: Vec<&str> = expanded.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount(fields.len()));
        }

        Ok(Self {
            minute: parse_field(fields[0], FieldKind::Minute)?,
            hour: parse_field(fields[1], FieldKind::Hour)?,
            day_of_month: parse_field(fields[2], FieldKind::DayOfMonth)?,
            month: parse_field(fields[3], FieldKind::Month)?,
            day_of_week: parse_field(fields[4], FieldKind::DayOfWeek)?,
            expression: text.to_string(),
        })
    }

    /// Whether this schedule matches the candidate tick.
    ///
    /// Minute, hour and month must each be unconstrained or contain the
    /// candidate value. Day of month and day of week combine under cron's
    /// disjunctive rule: when both are constrained, a candidate matching
    /// **either** day field matches.
    pub fn matches(&self, tick: TickTime) -> bool {
        self.minute.contains(tick.minute)
            && self.hour.contains(tick.hour)
            && self.month.contains(tick.month)
            && self.day_matches(tick)
    }

    fn day_matches(&self, tick: TickTime) -> bool {
        match (self.day_of_month.is_any(), self.day_of_week.is_any()) {
            (true, true) => true,
            (false, true) => self.day_of_month.contains(tick.day_of_month),
            (true, false) => self.day_of_week.contains(tick.day_of_week),
            (false, false) => {
                self.day_of_month.contains(tick.day_of_month)
                    || self.day_of_week.contains(tick.day_of_week)
            }
        }
    }

    /// The expression text as given by the caller.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The minute field mask.
    pub fn minute(&self) -> FieldMask {
        self.minute
    }

    /// The hour field mask.
    pub fn hour(&self) -> FieldMask {
        self.hour
    }

    /// The day-of-month field mask.
    pub fn day_of_month(&self) -> FieldMask {
        self.day_of_month
    }

    /// The month field mask.
    pub fn month(&self) -> FieldMask {
        self.month
    }

    /// The day-of-week field mask.
    pub fn day_of_week(&self) -> FieldMask {
        self.day_of_week
    }
}

/// Expand an `@`-shorthand into its five-field form. Anything else passes
/// through untouched; an unknown `@`-word is a malformed token.
fn expand_alias(expression: &str) -> CronResult<&str> {
    if !expression.starts_with('@') {
        return Ok(expression);
    }
    match expression {
        "@yearly" | "@annually" => Ok("0 0 1 1 *"),
        "@monthly" => Ok("0 0 1 * *"),
        "@weekly" => Ok("0 0 * * 0"),
        "@daily" | "@midnight" => Ok("0 0 * * *"),
        "@hourly" => Ok("0 * * * *"),
        other => Err(CronError::UnrecognizedToken(other.to_string())),
    }
}

/// Common schedule expressions.
pub mod presets {
    /// Every minute.
    pub const EVERY_MINUTE: &str = "* * * * *";

    /// Minute 0 of every hour.
    pub const HOURLY: &str = "0 * * * *";

    /// Midnight every day.
    pub const DAILY: &str = "0 0 * * *";

    /// Midnight every Sunday.
    pub const WEEKLY: &str = "0 0 * * 0";

    /// Midnight on the first of every month.
    pub const MONTHLY: &str = "0 0 1 * *";

    /// Midnight on January 1st.
    pub const YEARLY: &str = "0 0 1 1 *";
}
