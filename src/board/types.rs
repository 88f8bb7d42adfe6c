use std::collections::BTreeMap;

use chrono::{Duration, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::MachineStatusRow;
use crate::models::SIGNAL_LOSS_LABEL;
use crate::timeline::records::normalize_records;
use crate::timeline::status::{classify, StatusCategory};

/// One lamp on the signal-light board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntry {
    pub machine_code: String,
    pub machine_name: String,
    pub line_group: Option<String>,
    pub status: String,
    pub category: StatusCategory,
    pub counter: Option<u64>,
    pub last_seen: Option<NaiveDateTime>,
    /// Nothing reported within the staleness threshold.
    pub stale: bool,
}

impl BoardEntry {
    /// Board lamp for a machine's newest stored row, as seen at `now`.
    pub fn from_row(
        row: &MachineStatusRow,
        plant_offset: FixedOffset,
        now: NaiveDateTime,
        stale_after: Duration,
    ) -> Self {
        let latest = row
            .latest_raw()
            .and_then(|raw| normalize_records(&[raw], plant_offset).records.pop());

        let machine = &row.machine;
        match latest {
            Some(record) => Self {
                machine_code: machine.machine_code.clone(),
                machine_name: machine.machine_name.clone(),
                line_group: machine.line_group.clone(),
                category: classify(&record.status),
                stale: now - record.timestamp > stale_after,
                status: record.status,
                counter: Some(record.counter),
                last_seen: Some(record.timestamp),
            },
            None => Self {
                machine_code: machine.machine_code.clone(),
                machine_name: machine.machine_name.clone(),
                line_group: machine.line_group.clone(),
                status: SIGNAL_LOSS_LABEL.to_string(),
                category: StatusCategory::SignalLoss,
                counter: None,
                last_seen: None,
                stale: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    /// `None` covers every location.
    pub location: Option<String>,
    pub taken_at: NaiveDateTime,
    pub entries: Vec<BoardEntry>,
}

impl BoardSnapshot {
    pub fn from_rows(
        location: Option<String>,
        rows: &[MachineStatusRow],
        plant_offset: FixedOffset,
        now: NaiveDateTime,
        stale_after: Duration,
    ) -> Self {
        Self {
            location,
            taken_at: now,
            entries: rows
                .iter()
                .map(|row| BoardEntry::from_row(row, plant_offset, now, stale_after))
                .collect(),
        }
    }

    pub fn counts_by_category(&self) -> BTreeMap<StatusCategory, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn stale_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.stale).count()
    }
}
