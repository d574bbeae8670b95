//! US Eastern session clock.
//!
//! Converts a UTC instant to Eastern wall-clock time and flags the pre-market window
//! (`[04:00, 09:30)` local). No time zone database is consulted: daylight saving is
//! taken to run from the second Sunday of March through the day before the first
//! Sunday of November, decided on the UTC calendar date. Known approximation:
//! - transition days switch at 00:00 UTC instead of 02:00 local, so the few hours
//!   around each switch can be off by one hour;
//! - only the post-2007 US rule is applied, with no historical rules or leap seconds.
//!
//! That is close enough for labelling a same-day report and choosing the reference price.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Pre-market opens at 04:00 Eastern, in minutes after midnight.
const PREMARKET_OPEN_MIN: u32 = 4 * 60;
/// Regular session opens at 09:30 Eastern.
const REGULAR_OPEN_MIN: u32 = 9 * 60 + 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasternZone {
    /// Eastern Daylight Time, UTC-4.
    Edt,
    /// Eastern Standard Time, UTC-5.
    Est,
}

impl EasternZone {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            EasternZone::Edt => "EDT",
            EasternZone::Est => "EST",
        }
    }

    pub fn utc_offset_hours(&self) -> i64 {
        match self {
            EasternZone::Edt => -4,
            EasternZone::Est => -5,
        }
    }
}

/// The Eastern view of one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTime {
    pub local: NaiveDateTime,
    pub zone: EasternZone,
    pub is_premarket: bool,
}

impl SessionTime {
    pub fn from_utc(now: DateTime<Utc>) -> Self {
        let utc = now.naive_utc();
        let zone = if is_us_dst(utc.date()) {
            EasternZone::Edt
        } else {
            EasternZone::Est
        };
        let local = utc + Duration::hours(zone.utc_offset_hours());
        Self {
            local,
            zone,
            is_premarket: is_premarket(&local),
        }
    }

    /// Wall-clock timestamp as shown in the report, `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.local.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn timezone_abbreviation(&self) -> &'static str {
        self.zone.abbreviation()
    }
}

/// Whether US daylight saving is in effect on `date`.
pub fn is_us_dst(date: NaiveDate) -> bool {
    let day = date.day();
    // Weekday (Sunday = 0) of the day before the 1st: the first Sunday of the
    // month falls on `7 - lead`, the second on `14 - lead`.
    let lead = (date.weekday().num_days_from_sunday() + 7 - day % 7) % 7;
    match date.month() {
        4..=10 => true,
        3 => day >= 14 - lead,
        11 => day < 7 - lead,
        _ => false,
    }
}

/// Local time within `[04:00, 09:30)`.
pub fn is_premarket(local: &NaiveDateTime) -> bool {
    let minutes = local.hour() * 60 + local.minute();
    (PREMARKET_OPEN_MIN..REGULAR_OPEN_MIN).contains(&minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> SessionTime {
        SessionTime::from_utc(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    #[test]
    fn dst_boundaries() {
        // 2024: DST from Sun Mar 10 through Sat Nov 2.
        assert!(!is_us_dst(date(2024, 3, 9)));
        assert!(is_us_dst(date(2024, 3, 10)));
        assert!(is_us_dst(date(2024, 11, 2)));
        assert!(!is_us_dst(date(2024, 11, 3)));
        // 2026: Mar 8 and Nov 1, a year where November starts on a Sunday.
        assert!(!is_us_dst(date(2026, 3, 7)));
        assert!(is_us_dst(date(2026, 3, 8)));
        assert!(is_us_dst(date(2026, 10, 31)));
        assert!(!is_us_dst(date(2026, 11, 1)));
        // March starting on a Sunday: second Sunday is the 8th (2020).
        assert!(!is_us_dst(date(2020, 3, 7)));
        assert!(is_us_dst(date(2020, 3, 8)));
        // Deep winter and summer.
        assert!(!is_us_dst(date(2024, 1, 15)));
        assert!(is_us_dst(date(2024, 7, 4)));
        assert!(!is_us_dst(date(2024, 12, 31)));
    }

    #[test]
    fn matches_tz_database_away_from_switch_hours() {
        // At 15:00 UTC every date, including both switch days, is already past the
        // 02:00 local transition, so the approximation must agree with the real rule.
        for year in [2023, 2024, 2025, 2026] {
            let mut d = date(year, 1, 1);
            while d.year() == year {
                let utc = Utc.from_utc_datetime(&d.and_hms_opt(15, 0, 0).unwrap());
                let ours = SessionTime::from_utc(utc);
                let real = utc.with_timezone(&New_York);
                assert_eq!(ours.local, real.naive_local(), "{d}");
                assert_eq!(ours.timezone_abbreviation(), real.format("%Z").to_string(), "{d}");
                d = d.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn premarket_window_is_half_open() {
        // July: EDT, so local = UTC - 4.
        assert!(!at(2024, 7, 10, 7, 59).is_premarket); // 03:59
        assert!(at(2024, 7, 10, 8, 0).is_premarket); // 04:00
        assert!(at(2024, 7, 10, 13, 29).is_premarket); // 09:29
        assert!(!at(2024, 7, 10, 13, 30).is_premarket); // 09:30
        // January: EST, so local = UTC - 5.
        assert!(at(2024, 1, 10, 14, 0).is_premarket); // 09:00
        assert!(!at(2024, 1, 10, 15, 0).is_premarket); // 10:00
    }

    #[test]
    fn timestamp_and_abbreviation() {
        let s = at(2024, 1, 10, 14, 5);
        assert_eq!(s.timestamp(), "2024-01-10 09:05:00");
        assert_eq!(s.timezone_abbreviation(), "EST");

        let s = at(2024, 7, 1, 2, 30);
        assert_eq!(s.timestamp(), "2024-06-30 22:30:00");
        assert_eq!(s.timezone_abbreviation(), "EDT");
    }
}
