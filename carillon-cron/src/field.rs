//! Bitmask representation of one schedule field and its text parser.
//!
//! Each of the five cron fields parses independently into a [`FieldMask`]:
//! either the unconstrained sentinel or a 64-bit set where bit `i` means
//! value `i` is permitted. Comma-separated sub-tokens (values, ranges,
//! stepped ranges, stepped asterisks) union into one mask.

use crate::error::{CronError, CronResult};

/// Which of the five schedule fields a mask belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldKind {
    /// Highest value a constrained mask may contain.
    pub fn ceiling(self) -> u8 {
        match self {
            FieldKind::Minute => 59,
            FieldKind::Hour => 23,
            FieldKind::DayOfMonth => 31,
            FieldKind::Month => 12,
            FieldKind::DayOfWeek => 7,
        }
    }

    /// Field name as it appears in expressions and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day of month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day of week",
        }
    }

    fn range_error(self) -> CronError {
        match self {
            FieldKind::Minute => CronError::MinuteRange,
            FieldKind::Hour => CronError::HourRange,
            FieldKind::DayOfMonth => CronError::DayOfMonthRange,
            FieldKind::Month => CronError::MonthRange,
            FieldKind::DayOfWeek => CronError::DayOfWeekRange,
        }
    }
}

/// One schedule field: unconstrained, or a 64-bit set of permitted values.
///
/// The sentinel is a distinct variant, so a legitimate all-bits mask can
/// never be mistaken for "match everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMask {
    /// Matches any value (`*`).
    Any,
    /// Bit `i` set ⇔ value `i` permitted.
    Set(u64),
}

impl FieldMask {
    /// Whether `value` satisfies this field.
    pub fn contains(&self, value: u8) -> bool {
        match self {
            FieldMask::Any => true,
            FieldMask::Set(bits) => value < 64 && bits & (1u64 << value) != 0,
        }
    }

    /// Whether this is the unconstrained sentinel.
    pub fn is_any(&self) -> bool {
        matches!(self, FieldMask::Any)
    }

    /// The raw bit set, or `None` for the sentinel.
    pub fn bits(&self) -> Option<u64> {
        match self {
            FieldMask::Any => None,
            FieldMask::Set(bits) => Some(*bits),
        }
    }
}

/// Parse one field's text into a validated mask.
///
/// Sub-tokens are assembled first, rejecting any raw literal outside the
/// 0-63 bit-index domain; the assembled mask is then checked against the
/// field's semantic ceiling, yielding the field-specific range error.
pub(crate) fn parse_field(text: &str, kind: FieldKind) -> CronResult<FieldMask> {
    if text.is_empty() {
        return Err(CronError::UnrecognizedToken(text.to_string()));
    }

    let mut bits = 0u64;
    let mut unconstrained = false;
    for item in text.split(',') {
        match parse_item(item, kind)? {
            // `*` absorbs every other contribution
            None => unconstrained = true,
            Some(item_bits) => bits |= item_bits,
        }
    }

    if unconstrained {
        return Ok(FieldMask::Any);
    }

    let ceiling = kind.ceiling();
    if bits & !low_bits(ceiling) != 0 {
        return Err(kind.range_error());
    }

    if kind == FieldKind::DayOfWeek {
        bits = mirror_sunday(bits);
    }

    Ok(FieldMask::Set(bits))
}

/// One comma-separated sub-token. `None` means the plain asterisk.
fn parse_item(item: &str, kind: FieldKind) -> CronResult<Option<u64>> {
    if item == "*" {
        return Ok(None);
    }

    if let Some(step_text) = item.strip_prefix("*/") {
        // Stepped asterisk: every step-th value from 0 to the ceiling.
        // Bypasses the 0-63 literal check entirely.
        let step = u64::from(parse_step(step_text, item)?);
        let mut bits = 0u64;
        let mut value = 0u64;
        while value <= u64::from(kind.ceiling()) {
            bits |= 1u64 << value;
            value += step;
        }
        return Ok(Some(bits));
    }

    let (span, step) = match item.split_once('/') {
        Some((span, step_text)) => (span, parse_step(step_text, item)?),
        None => (item, 1),
    };

    if let Some((start_text, stop_text)) = span.split_once('-') {
        let start = u64::from(parse_literal(start_text)?);
        let stop = u64::from(parse_literal(stop_text)?);
        let mut bits = 0u64;
        let mut value = start;
        while value <= stop {
            bits |= 1u64 << value;
            value += u64::from(step);
        }
        Ok(Some(bits))
    } else {
        // A step is only meaningful after a range or asterisk
        if step != 1 || item.contains('/') {
            return Err(CronError::UnrecognizedToken(item.to_string()));
        }
        let value = parse_literal(span)?;
        Ok(Some(1u64 << value))
    }
}

/// A raw schedule literal: decimal digits, confined to the bit-index domain.
fn parse_literal(text: &str) -> CronResult<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CronError::UnrecognizedToken(text.to_string()));
    }
    let value = text.parse::<i64>().unwrap_or(i64::MAX);
    if !(0..=63).contains(&value) {
        return Err(CronError::OutOfRange(value));
    }
    Ok(value as u32)
}

/// A step divisor: decimal digits, nonzero. Not subject to the 0-63 check;
/// an oversized step simply leaves only the start value set.
fn parse_step(text: &str, item: &str) -> CronResult<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CronError::UnrecognizedToken(item.to_string()));
    }
    match text.parse::<u32>() {
        Ok(step) if step > 0 => Ok(step),
        _ => Err(CronError::UnrecognizedToken(item.to_string())),
    }
}

/// Bits 0..=highest inclusive.
fn low_bits(highest: u8) -> u64 {
    debug_assert!(highest < 63);
    (1u64 << (highest + 1)) - 1
}

/// 0 and 7 both mean Sunday; keep the two bits in lockstep so a schedule
/// written with either spelling matches a host tuple using either.
fn mirror_sunday(bits: u64) -> u64 {
    let mut bits = bits;
    if bits & (1 << 0) != 0 {
        bits |= 1 << 7;
    }
    if bits & (1 << 7) != 0 {
        bits |= 1 << 0;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_of(values: &[u8]) -> u64 {
        values.iter().fold(0u64, |bits, v| bits | 1u64 << v)
    }

    #[test]
    fn test_asterisk_is_unconstrained() {
        for kind in [
            FieldKind::Minute,
            FieldKind::Hour,
            FieldKind::DayOfMonth,
            FieldKind::Month,
            FieldKind::DayOfWeek,
        ] {
            assert_eq!(parse_field("*", kind).unwrap(), FieldMask::Any);
        }
    }

    #[test]
    fn test_single_value_sets_exactly_one_bit() {
        for value in 0..=59u8 {
            let mask = parse_field(&value.to_string(), FieldKind::Minute).unwrap();
            assert_eq!(mask, FieldMask::Set(1u64 << value));
        }
    }

    #[test]
    fn test_stepped_asterisk_from_zero_to_ceiling() {
        let mask = parse_field("*/15", FieldKind::Minute).unwrap();
        assert_eq!(mask, FieldMask::Set(bits_of(&[0, 15, 30, 45])));

        let mask = parse_field("*/6", FieldKind::Hour).unwrap();
        assert_eq!(mask, FieldMask::Set(bits_of(&[0, 6, 12, 18])));
    }

    #[test]
    fn test_range_is_inclusive() {
        let mask = parse_field("8-10", FieldKind::Hour).unwrap();
        assert_eq!(mask, FieldMask::Set(bits_of(&[8, 9, 10])));
    }

    #[test]
    fn test_stepped_range() {
        let mask = parse_field("1-10/2", FieldKind::Hour).unwrap();
        assert_eq!(mask, FieldMask::Set(bits_of(&[1, 3, 5, 7, 9])));
    }

    #[test]
    fn test_list_unions_members() {
        let combined = parse_field("1,5-9,20", FieldKind::Minute).unwrap();
        let single = parse_field("1", FieldKind::Minute).unwrap();
        let range = parse_field("5-9", FieldKind::Minute).unwrap();
        let tail = parse_field("20", FieldKind::Minute).unwrap();
        let expected = single.bits().unwrap() | range.bits().unwrap() | tail.bits().unwrap();
        assert_eq!(combined, FieldMask::Set(expected));
    }

    #[test]
    fn test_asterisk_in_list_absorbs() {
        assert_eq!(parse_field("5,*", FieldKind::Minute).unwrap(), FieldMask::Any);
    }

    #[test]
    fn test_literal_beyond_bit_domain_is_generic_out_of_range() {
        assert_eq!(
            parse_field("1-1000", FieldKind::Hour),
            Err(CronError::OutOfRange(1000))
        );
        assert_eq!(parse_field("64", FieldKind::Minute), Err(CronError::OutOfRange(64)));
    }

    #[test]
    fn test_ceiling_violations_are_field_specific() {
        assert_eq!(parse_field("60", FieldKind::Minute), Err(CronError::MinuteRange));
        assert_eq!(parse_field("24", FieldKind::Hour), Err(CronError::HourRange));
        assert_eq!(
            parse_field("32", FieldKind::DayOfMonth),
            Err(CronError::DayOfMonthRange)
        );
        assert_eq!(parse_field("13", FieldKind::Month), Err(CronError::MonthRange));
        assert_eq!(parse_field("8", FieldKind::DayOfWeek), Err(CronError::DayOfWeekRange));
    }

    #[test]
    fn test_maxima_are_accepted() {
        assert!(parse_field("59", FieldKind::Minute).is_ok());
        assert!(parse_field("23", FieldKind::Hour).is_ok());
        assert!(parse_field("31", FieldKind::DayOfMonth).is_ok());
        assert!(parse_field("12", FieldKind::Month).is_ok());
        assert!(parse_field("7", FieldKind::DayOfWeek).is_ok());
    }

    #[test]
    fn test_malformed_tokens_are_unrecognized() {
        assert!(matches!(
            parse_field("", FieldKind::Minute),
            Err(CronError::UnrecognizedToken(_))
        ));
        assert!(matches!(
            parse_field("abc", FieldKind::Minute),
            Err(CronError::UnrecognizedToken(_))
        ));
        assert!(matches!(
            parse_field("5-", FieldKind::Minute),
            Err(CronError::UnrecognizedToken(_))
        ));
        assert!(matches!(
            parse_field("1-10/0", FieldKind::Minute),
            Err(CronError::UnrecognizedToken(_))
        ));
        // a step without a range is outside the grammar
        assert!(matches!(
            parse_field("5/2", FieldKind::Minute),
            Err(CronError::UnrecognizedToken(_))
        ));
    }

    #[test]
    fn test_sunday_bits_mirror() {
        let mask = parse_field("0", FieldKind::DayOfWeek).unwrap();
        assert!(mask.contains(0) && mask.contains(7));

        let mask = parse_field("7", FieldKind::DayOfWeek).unwrap();
        assert!(mask.contains(0) && mask.contains(7));

        let mask = parse_field("1-5", FieldKind::DayOfWeek).unwrap();
        assert!(!mask.contains(0) && !mask.contains(7));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let mask = parse_field("9-5", FieldKind::Hour).unwrap();
        assert_eq!(mask, FieldMask::Set(0));
    }

    #[test]
    fn test_oversized_step_keeps_start_only() {
        let mask = parse_field("1-10/100", FieldKind::Hour).unwrap();
        assert_eq!(mask, FieldMask::Set(1u64 << 1));
    }
}
