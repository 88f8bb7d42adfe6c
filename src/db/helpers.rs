use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;

/// Text layout of `production_records.created_at`; sorts chronologically.
pub const STORAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(STORAGE_TIME_FORMAT).to_string()
}
