// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Date/time helpers: the canonical document timestamp format and the one
//! place where local wall-clock input is turned into UTC.

use chrono::{Local, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// `YYYY-MM-DDTHH:MM:SS.sssZ`, always UTC with millisecond precision.
pub const ISO_MILLIS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Wall-clock shapes produced by date/time form inputs.
const LOCAL_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Format used when prefilling a local expiry input.
pub const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Drop everything below the millisecond.
pub fn truncate_to_millis(value: OffsetDateTime) -> OffsetDateTime {
    value.replace_millisecond(value.millisecond()).unwrap_or(value)
}

/// Parse a timestamp in the canonical `ISO_MILLIS` shape.
pub fn parse_iso_millis(raw: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(raw, ISO_MILLIS)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Convert user-entered date/time text into a UTC instant.
///
/// Strings carrying an explicit offset (RFC 3339) are taken as-is. Anything
/// else is read as wall-clock time in the platform's local zone. Ambiguous
/// local times resolve to the earliest instant; times skipped by a DST jump
/// do not exist and yield `None`, as does unparseable input.
pub fn local_to_utc(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(explicit) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(explicit.to_offset(time::UtcOffset::UTC));
    }

    let naive = LOCAL_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;
    let local = Local.from_local_datetime(&naive).earliest()?;

    OffsetDateTime::from_unix_timestamp_nanos(i128::from(local.timestamp_millis()) * 1_000_000)
        .ok()
}

/// Local wall-clock time `hours` from now, without seconds.
pub fn local_after_hours(hours: u32) -> Option<NaiveDateTime> {
    let delta = TimeDelta::try_hours(i64::from(hours))?;
    let at = Local::now().checked_add_signed(delta)?.naive_local();
    at.with_second(0)?.with_nanosecond(0)
}
