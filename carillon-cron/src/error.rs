//! Error types for scheduling operations.

use thiserror::Error;

use crate::action::ActionId;

/// Result type for scheduling operations.
pub type CronResult<T> = Result<T, CronError>;

/// Scheduling errors.
///
/// Parse errors are reported synchronously by [`Clock::schedule`] and leave
/// the clock untouched; nothing is ever partially registered.
///
/// [`Clock::schedule`]: crate::Clock::schedule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronError {
    /// The expression does not split into exactly five fields
    #[error("expected 5 whitespace-separated fields, found {0}")]
    FieldCount(usize),

    /// Minute field holds a value outside 0-59
    #[error("minute field out of range (0-59)")]
    MinuteRange,

    /// Hour field holds a value outside 0-23
    #[error("hour field out of range (0-23)")]
    HourRange,

    /// Day of month field holds a value outside 1-31
    #[error("day of month field out of range (1-31)")]
    DayOfMonthRange,

    /// Month field holds a value outside 1-12
    #[error("month field out of range (1-12)")]
    MonthRange,

    /// Day of week field holds a value outside 0-7
    #[error("day of week field out of range (0-7)")]
    DayOfWeekRange,

    /// A number that cannot be represented: a schedule literal outside the
    /// 0-63 bit-index domain, or a poll tuple component outside its
    /// documented range
    #[error("value {0} out of range")]
    OutOfRange(i64),

    /// A schedule token the grammar cannot account for
    #[error("unrecognized token `{0}` in schedule expression")]
    UnrecognizedToken(String),

    /// No scheduled action carries the given id
    #[error("unknown action id {0}")]
    UnknownAction(ActionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CronError::UnrecognizedToken("1-".to_string());
        assert!(format!("{}", err).contains("1-"));

        let err = CronError::OutOfRange(1000);
        assert!(format!("{}", err).contains("1000"));

        let err = CronError::UnknownAction(7);
        assert!(format!("{}", err).contains("7"));
    }
}
