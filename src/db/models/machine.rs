//! Storage-side rows for machines and their production records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::RawRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub machine_code: String,
    pub machine_name: String,
    pub line_group: Option<String>,
    pub location: Option<String>,
}

/// A production record on its way into `production_records`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub created_at: NaiveDateTime,
    pub machine_counter: Option<u64>,
    pub operation_name: Option<String>,
}

/// A machine together with its most recent production row, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineStatusRow {
    pub machine: Machine,
    pub created_at: Option<String>,
    pub machine_counter: Option<i64>,
    pub operation_name: Option<String>,
}

impl MachineStatusRow {
    pub fn latest_raw(&self) -> Option<RawRecord> {
        self.created_at.as_ref().map(|created_at| RawRecord {
            timestamp: created_at.clone(),
            counter: self.machine_counter,
            status: self.operation_name.clone(),
        })
    }
}
