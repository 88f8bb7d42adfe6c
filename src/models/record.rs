//! Production record data models.
//!
//! A machine reports a cumulative counter and its current operation status;
//! every derived view is rebuilt from these samples.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A row exactly as the storage collaborator hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub timestamp: String,
    #[serde(default)]
    pub counter: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RawRecord {
    pub fn new(timestamp: impl Into<String>, counter: Option<i64>, status: Option<&str>) -> Self {
        Self {
            timestamp: timestamp.into(),
            counter,
            status: status.map(str::to_string),
        }
    }
}

/// One normalized sample. `timestamp` is plant-local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    pub timestamp: NaiveDateTime,
    pub counter: u64,
    pub status: String,
}

impl ProductionRecord {
    pub fn new(timestamp: NaiveDateTime, counter: u64, status: impl Into<String>) -> Self {
        Self {
            timestamp,
            counter,
            status: status.into(),
        }
    }

    /// Counter increase from `self` to `next`; a reset counts as no production.
    pub fn delta_to(&self, next: &ProductionRecord) -> u64 {
        next.counter.saturating_sub(self.counter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordOrigin {
    Observed,
    /// Synthesized at a shift start from the previous shift's last state.
    Continuity,
}

/// A record placed on one shift's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub record: ProductionRecord,
    pub origin: RecordOrigin,
}

impl TimelineEntry {
    pub fn observed(record: ProductionRecord) -> Self {
        Self {
            record,
            origin: RecordOrigin::Observed,
        }
    }

    /// Carries `prior`'s status and counter forward to `at`.
    pub fn continuity(prior: &ProductionRecord, at: NaiveDateTime) -> Self {
        Self {
            record: ProductionRecord {
                timestamp: at,
                counter: prior.counter,
                status: prior.status.clone(),
            },
            origin: RecordOrigin::Continuity,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.record.timestamp
    }

    pub fn is_continuity(&self) -> bool {
        self.origin == RecordOrigin::Continuity
    }
}

/// A raw row that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRejection {
    pub index: usize,
    pub raw_timestamp: String,
    pub reason: String,
}
