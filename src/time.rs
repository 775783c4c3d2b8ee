//! Time and Timezone Utilities Module
//!
//! Provides timezone resolution from coordinates and the hourly time series
//! covering one calendar year.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::OnceLock;
use tzf_rs::DefaultFinder;

use crate::error::CalcError;

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

/// Hourly timestamps of one calendar year, localized to a timezone
pub type TimeSeries = Vec<DateTime<Tz>>;

/// Coordinate to timezone lookup, `(lon, lat) -> Tz`
pub type TimezoneResolver = fn(f64, f64) -> Option<Tz>;

// ===================== TIMEZONE UTILITIES =====================

/// Resolve timezone from geographic coordinates.
///
/// # Arguments
/// * `lon` - Longitude in degrees
/// * `lat` - Latitude in degrees
///
/// # Returns
/// The resolved timezone, or None if the finder has no usable answer
pub fn resolve_timezone(lon: f64, lat: f64) -> Option<Tz> {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);

    // Get the IANA string (e.g., "America/Toronto")
    parse_tz_name(finder.get_tz_name(lon, lat))
}

/// Parse a finder answer into chrono_tz::Tz to get historical correctness.
/// Empty or unknown names give None.
fn parse_tz_name(tzid: &str) -> Option<Tz> {
    if tzid.is_empty() {
        return None;
    }
    tzid.parse::<Tz>().ok()
}

/// Calendar year at call time, as observed in the given timezone.
pub fn current_year(tz: Tz) -> i32 {
    Utc::now().with_timezone(&tz).year()
}

// ===================== YEAR SERIES =====================

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall back) resolve to the first occurrence. Times that
/// fall in a DST gap move forward to the next valid hour.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

/// Build hourly timestamps from Jan 1 00:00 through Dec 31 23:00 (inclusive)
/// of `year`, localized to `tz`.
///
/// Steps are absolute hours, so a DST day contributes 23 or 25 wall-clock
/// hours while the series still holds 365 × 24 (or 366 × 24) entries when
/// both ends share the same UTC offset.
pub fn year_hours(tz: Tz, year: i32) -> Result<TimeSeries, CalcError> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CalcError::DataUnavailable(format!("invalid year {}", year)))?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 0, 0))
        .ok_or_else(|| CalcError::DataUnavailable(format!("invalid year {}", year)))?;

    let start = resolve_local(tz, first).ok_or_else(|| {
        CalcError::DataUnavailable(format!("start of {} does not exist in {}", year, tz.name()))
    })?;
    let end = resolve_local(tz, last).ok_or_else(|| {
        CalcError::DataUnavailable(format!("end of {} does not exist in {}", year, tz.name()))
    })?;

    let mut times = Vec::with_capacity(366 * 24);
    let mut current = start;
    while current <= end {
        times.push(current);
        current += Duration::hours(1);
    }
    Ok(times)
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_resolve_timezone_new_york() {
        use chrono_tz::America::New_York;
        // Washington DC / New York region
        let lat = 38.8977;
        let lon = -77.0365;

        assert_eq!(resolve_timezone(lon, lat), Some(New_York));
    }

    #[test]
    fn test_resolve_timezone_sydney() {
        use chrono_tz::Australia::Sydney;
        // Canberra / Sydney region
        let lat = -35.3108;
        let lon = 149.1165;

        assert_eq!(resolve_timezone(lon, lat), Some(Sydney));
    }

    #[test]
    fn test_resolve_timezone_cape_town() {
        use chrono_tz::Africa::Johannesburg;
        assert_eq!(resolve_timezone(18.4, -33.9), Some(Johannesburg));
    }

    #[test]
    fn test_parse_tz_name_rejects_unusable_answers() {
        assert_eq!(parse_tz_name(""), None);
        assert_eq!(parse_tz_name("Atlantis/Capital"), None);
        assert_eq!(parse_tz_name("Etc/GMT+2"), Some(chrono_tz::Etc::GMTPlus2));
    }

    #[test]
    fn test_year_hours_cardinality() {
        use chrono_tz::America::Toronto;

        assert_eq!(year_hours(Tz::UTC, 2025).unwrap().len(), 365 * 24);
        assert_eq!(year_hours(Tz::UTC, 2024).unwrap().len(), 366 * 24);
        // DST shifts wall-clock hours but not the absolute count
        assert_eq!(year_hours(Toronto, 2025).unwrap().len(), 365 * 24);
        assert_eq!(year_hours(Toronto, 2024).unwrap().len(), 366 * 24);
    }

    #[test]
    fn test_year_hours_bounds_are_local() {
        use chrono_tz::Australia::Sydney;

        let times = year_hours(Sydney, 2025).unwrap();
        let first = times.first().unwrap();
        let last = times.last().unwrap();

        assert_eq!((first.month(), first.day(), first.hour()), (1, 1, 0));
        assert_eq!((last.month(), last.day(), last.hour()), (12, 31, 23));
        assert_eq!(first.timezone(), Sydney);
        // Southern summer: both ends on daylight time
        assert_eq!(times.len(), 365 * 24);
    }

    #[test]
    fn test_year_hours_strictly_hourly() {
        use chrono_tz::Europe::Helsinki;

        let times = year_hours(Helsinki, 2025).unwrap();
        for pair in times.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_seconds(), 3600);
        }
    }

    #[test]
    fn test_year_hours_rejects_unrepresentable_year() {
        assert!(matches!(year_hours(Tz::UTC, i32::MAX), Err(CalcError::DataUnavailable(_))));
    }
}
