//! `YYYY-MM-DD` encoding for calendar dates.

use serde::{de::Error, Deserialize, Deserializer, Serializer};
use time::{format_description::FormatItem, macros::format_description, Date};

const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn format(date: Date) -> String {
    date.format(FORMAT)
        .unwrap_or_else(|_| format!("{:04}-{:02}-{:02}", date.year(), date.month() as u8, date.day()))
}

/// Accepts a bare date or the date prefix of an ISO-8601 timestamp.
pub fn parse(s: &str) -> Option<Date> {
    let s = s.trim();
    let prefix = s.get(..10).unwrap_or(s);
    Date::parse(prefix, FORMAT).ok()
}

pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).ok_or_else(|| D::Error::custom(format!("invalid date: {}", s)))
}
