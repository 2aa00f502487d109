//! Next-due computation for a service's cadence.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};

use crate::db::enums::IntervalType;
use crate::db::models::MonitoredService;

/// Latest day-of-month a `specific_day` cadence may land on.
const SPECIFIC_DAY_MAX: i32 = 28;

/// When `service` is next due, given that it is being (re)scheduled at `now`.
///
/// `seconds` cadences are deliberately coarsened to one minute; unknown types
/// fall back to one minute as well.
pub fn next_due(service: &MonitoredService, now: DateTime<Utc>) -> DateTime<Utc> {
    let value = i64::from(service.interval_value.max(1));
    let delta = match service.interval_type {
        IntervalType::Seconds => TimeDelta::minutes(1),
        IntervalType::Minutes => TimeDelta::minutes(value),
        IntervalType::Hours => TimeDelta::hours(value),
        IntervalType::Daily => TimeDelta::days(value),
        IntervalType::Weekly => TimeDelta::weeks(value),
        IntervalType::Monthly => TimeDelta::days(30 * value),
        IntervalType::SpecificDay => return specific_day(service.interval_value, now),
        IntervalType::Unrecognized(_) => TimeDelta::minutes(1),
    };
    now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn specific_day(day: i32, now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let day = day.clamp(1, SPECIFIC_DAY_MAX) as u32;
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.and_time(now.time()).and_utc(),
        None => now + TimeDelta::minutes(1),
    }
}
