//! Time handling utilities.
//!
//! All canonical datasets carry time as a continuous Julian day number
//! (`days since -4712-01-01T12:00`). Instruments and models encode time in
//! their own epochs; this module converts between those encodings, calendar
//! timestamps and Julian days.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AlcfError;

/// Julian day of the Unix epoch (1970-01-01T00:00:00Z).
pub const JD_UNIX_EPOCH: f64 = 2440587.5;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Units string of canonical time.
pub const JULIAN_UNITS: &str = "days since -4712-01-01T12:00";

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Invalid time units: {0}")]
    InvalidUnits(String),
}

impl From<TimeParseError> for AlcfError {
    fn from(err: TimeParseError) -> Self {
        AlcfError::format("time", err.to_string())
    }
}

/// Convert milliseconds since the Unix epoch to a Julian day.
///
/// Every conversion to Julian days goes through here so that equal instants
/// map to bit-equal values whatever epoch they were encoded in.
pub fn julian_from_unix_millis(millis: f64) -> f64 {
    millis / (SECONDS_PER_DAY * 1000.0) + JD_UNIX_EPOCH
}

/// Convert seconds since `epoch_offset` (seconds relative to the Unix epoch)
/// to a Julian day.
pub fn julian_from_epoch_seconds(seconds: f64, epoch_offset: f64) -> f64 {
    julian_from_unix_millis((seconds + epoch_offset) * 1000.0)
}

/// Convert a UTC timestamp to a Julian day.
pub fn to_julian(dt: DateTime<Utc>) -> f64 {
    julian_from_unix_millis(dt.timestamp_millis() as f64)
}

/// Convert a Julian day to a UTC timestamp (millisecond resolution).
pub fn from_julian(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - JD_UNIX_EPOCH) * SECONDS_PER_DAY * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(millis).single()
}

/// Parse a calendar timestamp of the form `YYYY-MM-DD[THH:MM[:SS]]`.
///
/// A trailing `Z` is accepted. Returns the timestamp as a Julian day.
pub fn parse_iso(s: &str) -> Result<f64, TimeParseError> {
    parse_datetime(s)
        .map(|ndt| to_julian(Utc.from_utc_datetime(&ndt)))
        .ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))
}

/// Format a Julian day as `YYYY-MM-DDTHH:MM:SS`.
pub fn format_iso(jd: f64) -> String {
    match from_julian(jd) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => format!("JD{}", jd),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let s = s.strip_suffix('Z').unwrap_or(s);
    let s = s.strip_suffix(" UTC").unwrap_or(s);

    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert values encoded with CF-style units (`"<unit> since <origin>"`)
/// to Julian days.
///
/// Supported units are days, hours, minutes and seconds.
pub fn cf_to_julian(values: &[f64], units: &str) -> Result<Vec<f64>, TimeParseError> {
    let (unit, origin) = units
        .split_once(" since ")
        .ok_or_else(|| TimeParseError::InvalidUnits(units.to_string()))?;

    // Milliseconds per unit
    let factor = match unit.trim().to_lowercase().as_str() {
        "days" | "day" | "d" => SECONDS_PER_DAY * 1000.0,
        "hours" | "hour" | "h" => 3_600_000.0,
        "minutes" | "minute" | "min" => 60_000.0,
        "seconds" | "second" | "s" => 1000.0,
        _ => return Err(TimeParseError::InvalidUnits(units.to_string())),
    };

    let origin = parse_datetime(origin)
        .map(|ndt| Utc.from_utc_datetime(&ndt).timestamp_millis() as f64)
        .ok_or_else(|| TimeParseError::InvalidUnits(units.to_string()))?;

    Ok(values
        .iter()
        .map(|v| julian_from_unix_millis(origin + v * factor))
        .collect())
}

/// A half-open interval `[start, end)` of Julian days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub start: f64,
    pub end: f64,
}

impl TimePeriod {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Parse a period from two calendar timestamps.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeParseError> {
        Ok(Self::new(parse_iso(start)?, parse_iso(end)?))
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Boolean mask that is true wherever any period covers the timestamp.
///
/// Periods may overlap and need not be ordered.
pub fn period_mask(times: &[f64], periods: &[TimePeriod]) -> Vec<bool> {
    times
        .iter()
        .map(|&t| periods.iter().any(|p| p.contains(t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_unix_epoch_julian() {
        let dt = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_julian(dt), JD_UNIX_EPOCH);
    }

    #[test]
    fn test_epoch_seconds_match_calendar_time() {
        // 1904-01-01 origin, one second resolution across a whole day
        let offset = -2_082_844_800.0;
        let day_start = 3_534_451_200.0;
        let midnight = parse_iso("2016-01-01").unwrap();
        for s in 0..86_400u32 {
            let jd = julian_from_epoch_seconds(day_start + s as f64, offset);
            let expected = to_julian(
                Utc.timestamp_opt(1_451_606_400 + s as i64, 0).unwrap(),
            );
            assert_eq!(jd.to_bits(), expected.to_bits(), "second {}", s);
        }
        assert_eq!(julian_from_epoch_seconds(day_start, offset), midnight);
    }

    #[test]
    fn test_cf_matches_calendar_time() {
        let jd = cf_to_julian(&[612.0], "seconds since 2016-01-01 00:00:00").unwrap();
        assert_eq!(jd[0], parse_iso("2016-01-01T00:10:12").unwrap());
    }

    #[test]
    fn test_j2000() {
        let jd = parse_iso("2000-01-01T12:00:00").unwrap();
        assert!((jd - 2451545.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_iso_variants() {
        let full = parse_iso("2016-11-01T06:30:00").unwrap();
        let minutes = parse_iso("2016-11-01T06:30").unwrap();
        let zulu = parse_iso("2016-11-01T06:30:00Z").unwrap();
        assert_eq!(full, minutes);
        assert_eq!(full, zulu);

        let day = parse_iso("2016-11-01").unwrap();
        assert!((full - day - 6.5 / 24.0).abs() < 1e-8);
    }

    #[test]
    fn test_parse_iso_invalid() {
        assert!(parse_iso("2016-13-01").is_err());
        assert!(parse_iso("yesterday").is_err());
        assert!(parse_iso("").is_err());
    }

    #[test]
    fn test_from_julian_roundtrip() {
        let jd = parse_iso("2024-01-15T12:34:56").unwrap();
        let dt = from_julian(jd).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 34);
        assert_eq!(dt.second(), 56);
        assert_eq!(format_iso(jd), "2024-01-15T12:34:56");
    }

    #[test]
    fn test_cf_minutes_since() {
        let jd = cf_to_julian(&[0.0, 90.0], "minutes since 2016-11-01 00:00:00").unwrap();
        let origin = parse_iso("2016-11-01").unwrap();
        assert_eq!(jd[0], origin);
        assert!((jd[1] - origin - 1.5 / 24.0).abs() < 1e-8);
    }

    #[test]
    fn test_cf_invalid_units() {
        assert!(cf_to_julian(&[0.0], "fortnights since 2000-01-01").is_err());
        assert!(cf_to_julian(&[0.0], "minutes").is_err());
    }

    #[test]
    fn test_period_half_open() {
        let p = TimePeriod::new(10.0, 20.0);
        assert!(p.contains(10.0));
        assert!(p.contains(19.999));
        assert!(!p.contains(20.0));
        assert!(!p.contains(9.999));
    }

    #[test]
    fn test_overlapping_periods_union() {
        // [t0, t2) and [t1, t3) with t0 < t1 < t2 < t3
        let periods = [TimePeriod::new(0.0, 2.0), TimePeriod::new(1.0, 3.0)];
        let times = [-0.5, 0.0, 0.5, 1.5, 2.0, 2.5, 2.999, 3.0];
        let mask = period_mask(&times, &periods);
        assert_eq!(
            mask,
            vec![false, true, true, true, true, true, true, false]
        );
    }
}
