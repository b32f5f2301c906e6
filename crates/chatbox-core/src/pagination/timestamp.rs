//! Unix-seconds encoding of cursor timestamps.
//!
//! Cursor timestamps travel as decimal seconds (`1700000000.123456`). Decimal
//! input is parsed exactly rather than through `f64` so a value emitted by
//! [`format_unix_seconds`] always decodes to the same microsecond.

use chrono::{DateTime, Utc};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// 0000-01-01T00:00:00Z. Keys are stored as four-digit-year text, so
/// timestamps outside years 0000..=9999 cannot be compared in the store.
const MIN_MICROS: i64 = -62_167_219_200 * MICROS_PER_SECOND;

/// 9999-12-31T23:59:59.999999Z
const MAX_MICROS: i64 = 253_402_300_800 * MICROS_PER_SECOND - 1;

/// Parse unix seconds (fractional allowed) into a UTC timestamp with
/// microsecond precision. Digits past the sixth decimal are dropped.
///
/// Returns `None` for non-numeric or non-finite input, and for instants
/// outside years 0000 to 9999.
pub fn parse_unix_seconds(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let micros = parse_decimal_micros(raw).or_else(|| parse_float_micros(raw))?;
    if !(MIN_MICROS..=MAX_MICROS).contains(&micros) {
        return None;
    }
    DateTime::from_timestamp_micros(micros)
}

/// Render a timestamp as unix seconds with exactly six decimals.
pub fn format_unix_seconds(ts: &DateTime<Utc>) -> String {
    let micros = ts.timestamp_micros();
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    let per_second = MICROS_PER_SECOND as u64;
    format!("{sign}{}.{:06}", abs / per_second, abs % per_second)
}

fn parse_decimal_micros(raw: &str) -> Option<i64> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let seconds: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut sub_micros: i64 = 0;
    for (i, digit) in fraction.bytes().take(6).enumerate() {
        sub_micros += i64::from(digit - b'0') * 10_i64.pow(5 - i as u32);
    }

    let magnitude = seconds
        .checked_mul(MICROS_PER_SECOND)?
        .checked_add(sub_micros)?;
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_float_micros(raw: &str) -> Option<i64> {
    let seconds: f64 = raw.parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * MICROS_PER_SECOND as f64).trunc();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return None;
    }
    Some(micros as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_integer_seconds() {
        let ts = parse_unix_seconds("1700000000").unwrap();
        assert_eq!(ts, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    }

    #[test]
    fn test_parse_fractional_seconds_exactly() {
        let ts = parse_unix_seconds("1700000000.123456").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_parse_drops_sub_microsecond_digits() {
        let ts = parse_unix_seconds("10.1234569").unwrap();
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_parse_short_fraction_and_bare_dot() {
        assert_eq!(
            parse_unix_seconds("10.5").unwrap().timestamp_subsec_micros(),
            500_000
        );
        assert_eq!(parse_unix_seconds(".25").unwrap().timestamp_subsec_micros(), 250_000);
        assert_eq!(parse_unix_seconds("7.").unwrap().timestamp(), 7);
    }

    #[test]
    fn test_parse_scientific_notation() {
        let ts = parse_unix_seconds("1.7e9").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", ".", "-", "abc", "12:30", "1.2.3", "NaN", "inf", "-inf", "1e400"] {
            assert!(parse_unix_seconds(raw).is_none(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(parse_unix_seconds("99999999999999999").is_none());
    }

    #[test]
    fn test_parse_accepts_four_digit_years_only() {
        let last = parse_unix_seconds("253402300799.999999").unwrap();
        assert_eq!(last.to_rfc3339(), "9999-12-31T23:59:59.999999+00:00");
        assert!(parse_unix_seconds("253402300800").is_none());
        assert!(parse_unix_seconds("2.534023008e11").is_none());

        let first = parse_unix_seconds("-62167219200").unwrap();
        assert_eq!(first.to_rfc3339(), "0000-01-01T00:00:00+00:00");
        assert!(parse_unix_seconds("-62167219200.000001").is_none());
    }

    #[test]
    fn test_format_six_decimals() {
        let ts = Utc.timestamp_opt(1_700_000_000, 5_000).unwrap();
        assert_eq!(format_unix_seconds(&ts), "1700000000.000005");
    }

    #[test]
    fn test_format_negative() {
        let ts = DateTime::from_timestamp_micros(-1_500_000).unwrap();
        assert_eq!(format_unix_seconds(&ts), "-1.500000");
        assert_eq!(parse_unix_seconds("-1.500000"), Some(ts));
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        let ts = DateTime::from_timestamp_micros(1_712_345_678_901_234).unwrap();
        assert_eq!(parse_unix_seconds(&format_unix_seconds(&ts)), Some(ts));
    }
}
