use std::ops::Index;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses the free-form dates found in post headers into a UTC instant.
///
/// Accepted: `2025-03-29`, `2025/03/29`, `2025-03-29 10:42`, `2025-03-29T10:42:32.123`,
/// any of those followed by `Z` or an offset such as `+09:00`, and RFC 2822 dates.
/// A date without time is midnight UTC. A date and time without offset is read as UTC.
pub fn parse_date_time(buf: &str) -> Result<DateTime<Utc>, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(
            r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ](\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.(\d{1,9}))?)?)?\s*(Z|z|[+-]\d{2}:?\d{2})?$"
        ).unwrap();
    }

    let trimmed = buf.trim();
    let Some(caps) = DATE_REGEX.captures(trimmed) else {
        return match DateTime::parse_from_rfc2822(trimmed) {
            Ok(dt) => Ok(dt.with_timezone(&Utc)),
            Err(_) => Err(format!("Unable to parse date time {}", buf)),
        };
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);
    let opt_u32 = |idx: usize| caps.get(idx).map(|m| to_u32(m.as_str())).unwrap_or(Ok(0));

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = opt_u32(4)?;
    let mn: u32 = opt_u32(5)?;
    let s: u32 = opt_u32(6)?;
    let millis: u32 = match caps.get(7) {
        // Only millisecond precision is kept
        Some(frac) => {
            let digits: String = frac.as_str().chars().chain("00".chars()).take(3).collect();
            to_u32(&digits)?
        }
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid calendar date in {}", buf))?;
    let time = NaiveTime::from_hms_milli_opt(h, mn, s, millis)
        .ok_or_else(|| format!("Invalid time of day in {}", buf))?;
    let naive = NaiveDateTime::new(date, time);

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") | Some("z") => FixedOffset::east_opt(0),
        Some(off) => parse_offset(off),
    }
    .ok_or_else(|| format!("Invalid UTC offset in {}", buf))?;

    match offset.from_local_datetime(&naive).single() {
        Some(dt) => Ok(dt.with_timezone(&Utc)),
        None => Err(format!("Unable to resolve date time {}", buf)),
    }
}

fn parse_offset(off: &str) -> Option<FixedOffset> {
    let sign = if off.starts_with('-') { -1 } else { 1 };
    let digits: String = off[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parses a date taken from post metadata. Numbers are milliseconds since the epoch.
pub fn parse_date_value(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::String(s) => parse_date_time(s),
        Value::Number(n) => n.as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| format!("Unable to parse date time {}", n)),
        other => Err(format!("Unable to parse date time {}", other)),
    }
}

/// `2025-03-29T10:42:32.000Z`
pub fn format_iso(date_time: &DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn format_date_time(date_time: &DateTime<Utc>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M").to_string();
    (date, time)
}

/// Stringifies a metadata scalar the way it was written in the header.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
