//! UTC dates for sitemap `<lastmod>` values.
//!
//! Commit timestamps and file mtimes both arrive as seconds since the Unix
//! epoch; `DateTimeUtc` turns them into calendar fields without pulling in a
//! timezone database.
//!
//! ```ignore
//! let dt = DateTimeUtc::from_unix_secs(1_718_461_845);
//! assert_eq!(dt.to_date_string(), "2024-06-15");
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: i64 = 86_400;

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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

    /// Convert seconds since the Unix epoch. Times before 1970 clamp to the epoch.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_unix_secs(secs: i64) -> Self {
        let secs = secs.max(0);
        let days = secs.div_euclid(SECS_PER_DAY);
        let rem = secs.rem_euclid(SECS_PER_DAY);

        // Civil-from-days over 400-year eras
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

    /// Convert a filesystem timestamp. `None` if it predates the epoch.
    pub fn from_system_time(time: SystemTime) -> Option<Self> {
        let secs = time.duration_since(UNIX_EPOCH).ok()?.as_secs();
        Some(Self::from_unix_secs(i64::try_from(secs).ok()?))
    }

    /// Current time; the epoch if the clock is set before it.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now()).unwrap_or_else(|| Self::from_unix_secs(0))
    }

    /// `YYYY-MM-DD`, the W3C date form sitemaps use.
    pub fn to_date_string(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_unix_secs_epoch() {
        assert_eq!(
            DateTimeUtc::from_unix_secs(0),
            DateTimeUtc::new(1970, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_from_unix_secs_known_instant() {
        let dt = DateTimeUtc::from_unix_secs(1_718_461_845);
        assert_eq!(dt, DateTimeUtc::new(2024, 6, 15, 14, 30, 45));
        assert_eq!(dt.to_date_string(), "2024-06-15");
    }

    #[test]
    fn test_from_unix_secs_leap_day() {
        // 2024-02-29T00:00:00Z
        let dt = DateTimeUtc::from_unix_secs(1_709_164_800);
        assert_eq!(dt, DateTimeUtc::new(2024, 2, 29, 0, 0, 0));
    }

    #[test]
    fn test_from_unix_secs_end_of_year() {
        // 2023-12-31T23:59:59Z
        let dt = DateTimeUtc::from_unix_secs(1_704_067_199);
        assert_eq!(dt, DateTimeUtc::new(2023, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_from_unix_secs_negative_clamps() {
        assert_eq!(DateTimeUtc::from_unix_secs(-5).year, 1970);
    }

    #[test]
    fn test_from_system_time() {
        let time = UNIX_EPOCH + Duration::from_secs(1_718_461_845);
        assert_eq!(
            DateTimeUtc::from_system_time(time).map(DateTimeUtc::to_date_string),
            Some("2024-06-15".to_string())
        );
    }
}
