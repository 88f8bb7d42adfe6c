//! Record stream preparation: timestamp normalization, ordering, cutoff
//! filtering, the last state before a shift, and hourly production.
//!
//! `parse_timestamp` is the only place in the crate that interprets a
//! timestamp string.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};

use crate::error::TimestampError;
use crate::models::{ProductionRecord, RawRecord, RecordRejection};
use crate::timeline::window::is_within_shift;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses a record timestamp into plant-local wall-clock time.
///
/// Timestamps carrying an offset are converted to `plant_offset`; timestamps
/// without one are taken to be plant-local already.
pub fn parse_timestamp(
    raw: &str,
    plant_offset: FixedOffset,
) -> Result<NaiveDateTime, TimestampError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&plant_offset).naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Ok(parsed.with_timezone(&plant_offset).naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }

    Err(TimestampError::Unrecognized(value.to_string()))
}

/// Current plant-local wall-clock time.
pub fn plant_now(plant_offset: FixedOffset) -> NaiveDateTime {
    Utc::now().with_timezone(&plant_offset).naive_local()
}

/// Output of [`normalize_records`]: sorted records plus the rows that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecords {
    pub records: Vec<ProductionRecord>,
    pub rejections: Vec<RecordRejection>,
}

/// Turns raw rows into sorted [`ProductionRecord`]s.
///
/// Rows with a bad timestamp or a negative counter are rejected, never
/// re-timed. A missing counter repeats the previous known value so that no
/// production is invented; a missing status becomes an empty label.
pub fn normalize_records(raw: &[RawRecord], plant_offset: FixedOffset) -> NormalizedRecords {
    let mut parsed: Vec<(NaiveDateTime, Option<u64>, String)> = Vec::with_capacity(raw.len());
    let mut rejections = Vec::new();

    for (index, row) in raw.iter().enumerate() {
        let timestamp = match parse_timestamp(&row.timestamp, plant_offset) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                log_warn!("rejecting record #{index}: {err}");
                rejections.push(RecordRejection {
                    index,
                    raw_timestamp: row.timestamp.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let counter = match row.counter {
            Some(value) if value < 0 => {
                log_warn!("rejecting record #{index}: negative counter {value}");
                rejections.push(RecordRejection {
                    index,
                    raw_timestamp: row.timestamp.clone(),
                    reason: format!("negative counter {value}"),
                });
                continue;
            }
            Some(value) => Some(value as u64),
            None => None,
        };

        parsed.push((timestamp, counter, row.status.clone().unwrap_or_default()));
    }

    parsed.sort_by_key(|(timestamp, _, _)| *timestamp);

    let mut last_counter = 0;
    let records = parsed
        .into_iter()
        .map(|(timestamp, counter, status)| {
            let counter = counter.unwrap_or(last_counter);
            last_counter = counter;
            ProductionRecord {
                timestamp,
                counter,
                status,
            }
        })
        .collect();

    NormalizedRecords {
        records,
        rejections,
    }
}

/// Stable ascending sort by timestamp.
pub fn sort_ascending(mut records: Vec<ProductionRecord>) -> Vec<ProductionRecord> {
    records.sort_by_key(|record| record.timestamp);
    records
}

/// Drops every record stamped after `cutoff`.
pub fn filter_up_to(mut records: Vec<ProductionRecord>, cutoff: NaiveDateTime) -> Vec<ProductionRecord> {
    records.retain(|record| record.timestamp <= cutoff);
    records
}

/// The last record at or before `cutoff` that is strictly before `shift_start`.
/// Input order does not matter; among equal timestamps the later one in the
/// slice wins.
pub fn latest_before(
    records: &[ProductionRecord],
    shift_start: NaiveDateTime,
    cutoff: NaiveDateTime,
) -> Option<&ProductionRecord> {
    records
        .iter()
        .filter(|record| record.timestamp <= cutoff && record.timestamp < shift_start)
        .max_by_key(|record| record.timestamp)
}

/// Index of the hour bucket holding the clock time `hour:minute`.
///
/// Bucket `i` spans `[marks[i], marks[i + 1])`; the last bucket closes at
/// `shift_end_hour`. Both may wrap midnight.
pub fn bucket_index(hour: u32, minute: u32, mark_hours: &[u32], shift_end_hour: u32) -> Option<usize> {
    (0..mark_hours.len()).find(|&i| {
        let upper = mark_hours.get(i + 1).copied().unwrap_or(shift_end_hour);
        is_within_shift(hour, minute, mark_hours[i], upper)
    })
}

/// Production per hour bucket from the counter series.
///
/// Each counter increase between two consecutive records is booked to the
/// bucket in which that interval begins. Decreases add nothing. Records
/// after `cutoff` are ignored, and an interval starting outside every bucket
/// is skipped while the running counter still advances past it.
pub fn hourly_deltas(
    records: &[ProductionRecord],
    mark_hours: &[u32],
    shift_end_hour: u32,
    cutoff: NaiveDateTime,
) -> Vec<u64> {
    let mut hourly = vec![0; mark_hours.len()];

    let mut ordered: Vec<&ProductionRecord> = records
        .iter()
        .filter(|record| record.timestamp <= cutoff)
        .collect();
    ordered.sort_by_key(|record| record.timestamp);

    for pair in ordered.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        let time = previous.timestamp;
        if let Some(index) = bucket_index(time.hour(), time.minute(), mark_hours, shift_end_hour) {
            hourly[index] += previous.delta_to(current);
        }
    }

    hourly
}

/// Sum of clamped counter increases across consecutive records.
pub fn total_production(records: &[ProductionRecord]) -> u64 {
    records
        .windows(2)
        .map(|pair| pair[0].delta_to(&pair[1]))
        .sum()
}
