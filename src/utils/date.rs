//! UTC date utilities without timezone dependencies.
//!
//! Document metadata carries dates in a handful of hand-written forms. They
//! are normalized to `YYYY-MM-DD` so the recency index can order records by
//! plain string comparison.
//!
//! # Examples
//!
//! ```ignore
//! assert_eq!(normalize_date("2024/06/15").as_deref(), Some("2024-06-15"));
//! assert_eq!(normalize_date("2024-06-15T14:30:45Z").as_deref(), Some("2024-06-15"));
//! assert_eq!(normalize_date("June 15"), None);
//! ```

use anyhow::{Result, bail};

/// Placeholder date for documents without a (valid) `date` entry.
pub const PLACEHOLDER_DATE: &str = "1970-01-01";

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Parse one of the accepted forms:
    ///
    /// - `YYYY-MM-DD` / `YYYY/MM/DD`
    /// - `YYYY-MM-DD HH:MM` (optionally `:SS`)
    /// - RFC 3339: `YYYY-MM-DDTHH:MM:SS` followed by `Z`, an offset or
    ///   fractional seconds. The offset is ignored; only the calendar date
    ///   matters for ordering.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();

        // Minimum: "YYYY-MM-DD" (10 chars)
        if bytes.len() < 10 {
            return None;
        }

        let sep = bytes[4];
        if !matches!(sep, b'-' | b'/') || bytes[7] != sep {
            return None;
        }
        let year = parse_u16(&bytes[0..4])?;
        let month = parse_u8(&bytes[5..7])?;
        let day = parse_u8(&bytes[8..10])?;

        let (hour, minute, second) = match bytes.get(10) {
            None => (0, 0, 0),
            Some(b'T' | b' ') if sep == b'-' => parse_time(&bytes[11..])?,
            Some(_) => return None,
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)] // Method style is more idiomatic
    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Format the calendar date as `YYYY-MM-DD`.
    pub fn to_date_string(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Current UTC time from the system clock.
    #[allow(clippy::cast_possible_truncation)] // Civil components always fit
    pub fn now() -> Self {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let days = (secs / 86_400) as i64;
        let rem = secs % 86_400;

        // Days since epoch to civil date (Howard Hinnant's algorithm)
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self::new(
            year as u16,
            month as u8,
            day as u8,
            (rem / 3600) as u8,
            (rem % 3600 / 60) as u8,
            (rem % 60) as u8,
        )
    }
}

/// Normalize a metadata date to `YYYY-MM-DD`, or `None` if unrecognized.
pub fn normalize_date(s: &str) -> Option<String> {
    DateTimeUtc::parse(s).map(DateTimeUtc::to_date_string)
}

/// Parse `HH:MM` with optional `:SS` and an optional RFC 3339 tail
/// (fraction, `Z` or `+HH:MM`).
fn parse_time(bytes: &[u8]) -> Option<(u8, u8, u8)> {
    if bytes.len() < 5 || bytes[2] != b':' {
        return None;
    }
    let hour = parse_u8(&bytes[0..2])?;
    let minute = parse_u8(&bytes[3..5])?;

    let mut rest = &bytes[5..];
    let mut second = 0;
    if rest.first() == Some(&b':') {
        second = parse_u8(rest.get(1..3)?)?;
        rest = &rest[3..];
    }
    if let Some(digits) = rest.strip_prefix(b".") {
        let n = digits.iter().take_while(|b| b.is_ascii_digit()).count();
        if n == 0 {
            return None;
        }
        rest = &digits[n..];
    }

    match rest {
        [] | [b'Z'] => Some((hour, minute, second)),
        [b'+' | b'-', h1, h2, b':', m1, m2] => {
            parse_u8(&[*h1, *h2])?;
            parse_u8(&[*m1, *m2])?;
            Some((hour, minute, second))
        }
        _ => None,
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date_forms() {
        assert_eq!(normalize_date("2024-06-15").as_deref(), Some("2024-06-15"));
        assert_eq!(normalize_date("2024/06/15").as_deref(), Some("2024-06-15"));
        assert_eq!(normalize_date(" 2024-06-15 ").as_deref(), Some("2024-06-15"));
        assert_eq!(
            normalize_date("2024-06-15 09:30").as_deref(),
            Some("2024-06-15")
        );
        assert_eq!(
            normalize_date("2024-06-15T14:30:45Z").as_deref(),
            Some("2024-06-15")
        );
        assert_eq!(
            normalize_date("2024-06-15T14:30:45.123+02:00").as_deref(),
            Some("2024-06-15")
        );
    }

    #[test]
    fn test_normalize_date_rejects() {
        assert_eq!(normalize_date("June 15, 2024"), None);
        assert_eq!(normalize_date("2024-6-15"), None);
        assert_eq!(normalize_date("2024/06-15"), None);
        assert_eq!(normalize_date("2024/06/15T10:00"), None);
        assert_eq!(normalize_date("2024-02-30"), None);
        assert_eq!(normalize_date("2024-06-15T25:00"), None);
        assert_eq!(normalize_date("2024-06-15Tjunk"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_parse_keeps_time() {
        let dt = DateTimeUtc::parse("2024-06-15 14:30:45").unwrap();
        assert_eq!(dt, DateTimeUtc::new(2024, 6, 15, 14, 30, 45));
        assert_eq!(dt.to_date_string(), "2024-06-15");
    }

    #[test]
    fn test_datetime_utc_validate_invalid_day() {
        // Day 0
        assert!(DateTimeUtc::new(2024, 6, 0, 12, 0, 0).validate().is_err());

        // Day 31 in a 30-day month
        assert!(DateTimeUtc::new(2024, 4, 31, 12, 0, 0).validate().is_err());

        // Day 29 in February (non-leap year)
        assert!(DateTimeUtc::new(2023, 2, 29, 12, 0, 0).validate().is_err());
    }

    #[test]
    fn test_datetime_utc_validate_leap_year() {
        assert!(DateTimeUtc::new(2024, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2000, 2, 29, 12, 0, 0).validate().is_ok()); // divisible by 400
        assert!(DateTimeUtc::new(1900, 2, 29, 12, 0, 0).validate().is_err()); // divisible by 100 but not 400
    }

    #[test]
    fn test_now_is_valid() {
        let now = DateTimeUtc::now();
        assert!(now.validate().is_ok());
        assert!(now.year >= 2024);
    }

    #[test]
    fn test_placeholder_sorts_first() {
        assert!(PLACEHOLDER_DATE < "2000-01-01");
        assert_eq!(normalize_date(PLACEHOLDER_DATE).as_deref(), Some(PLACEHOLDER_DATE));
    }
}
