use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve a wall-clock time on a civil date in `tz` to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// do not exist (DST spring-forward gap) are shifted forward by one hour.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
            LocalResult::None => None,
        },
    }
}

/// Local midnight at the start of `date` in `tz`, as a UTC instant.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    local_instant(date, NaiveTime::MIN, tz)
}

/// Local noon of `date` in `tz`, as a UTC instant.
pub fn local_noon(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    local_instant(date, NaiveTime::from_hms_opt(12, 0, 0)?, tz)
}

/// Parse a civil date in either `dd.mm.yyyy` or ISO `yyyy-mm-dd` form.
pub fn parse_civil_date(input: &str) -> Result<NaiveDate, String> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|e| format!("Invalid date '{}': {}", trimmed, e))
}
