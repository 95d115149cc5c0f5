//! Parsing of date query parameters into ledger windows

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{AppError, AppResult};

/// Inclusive UTC bounds of a calendar day in `tz`: 00:00:00.000 to
/// 23:59:59.999 local time.
pub fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = date.and_hms_milli_opt(0, 0, 0, 0)?;
    let end = date.and_hms_milli_opt(23, 59, 59, 999)?;
    Some((
        local_to_utc(tz, &start, false)?,
        local_to_utc(tz, &end, true)?,
    ))
}

/// Day bounds in the server's local time zone
pub fn local_day_bounds(date: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    day_bounds(date, &Local)
        .ok_or_else(|| AppError::validation("date", "Date has no valid local day boundaries"))
}

/// Ambiguous local times (DST fold) resolve to the widest window
fn local_to_utc<Tz: TimeZone>(tz: &Tz, local: &NaiveDateTime, latest: bool) -> Option<DateTime<Utc>> {
    let resolved = tz.from_local_datetime(local);
    let chosen = if latest {
        resolved.latest()
    } else {
        resolved.earliest()
    };
    chosen.map(|dt| dt.with_timezone(&Utc))
}

/// Parse a day parameter: `YYYY-MM-DD`, or an RFC 3339 timestamp whose local
/// calendar date is used.
pub fn parse_day(field: &str, value: &str) -> AppResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .map_err(|_| AppError::validation(field, "Invalid date format"))
}

/// Which end of a window a parameter describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse an ISO 8601 window bound. Full timestamps are taken as-is; a plain
/// date expands to the start or end of that local day.
pub fn parse_bound(field: &str, value: &str, bound: Bound) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation(field, "Expected an ISO 8601 date or timestamp"))?;
    let (start, end) = local_day_bounds(date)?;
    Ok(match bound {
        Bound::Start => start,
        Bound::End => end,
    })
}

/// Parse an optional bound, treating an empty string as absent
pub fn parse_optional_bound(
    field: &str,
    value: Option<&str>,
    bound: Bound,
) -> AppResult<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_bound(field, v, bound).map(Some),
        None => Ok(None),
    }
}
