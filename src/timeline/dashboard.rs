//! Per-machine dashboard: every started shift of a production day with its
//! segments, hourly production and status breakdown.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{ProductionRecord, RawRecord, RecordRejection, SegmentKind, StatusSegment};
use crate::timeline::aggregator::{aggregate_shifts, ShiftAggregation, ShiftBucket, ViewMode};
use crate::timeline::config::ShiftSchedule;
use crate::timeline::records::{bucket_index, hourly_deltas, normalize_records, total_production};
use crate::timeline::segments::build_segments;
use crate::timeline::status::StatusCategory;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftReport {
    pub name: String,
    pub is_active: bool,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub segments: Vec<StatusSegment>,
    pub hour_marks: Vec<String>,
    pub hourly_production: Vec<u64>,
    pub total_production: u64,
    /// Timeline width covered by each status category.
    pub breakdown: BTreeMap<StatusCategory, f64>,
}

impl ShiftReport {
    pub fn covered_percent(&self) -> f64 {
        self.segments.iter().map(|segment| segment.width_percent).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDashboard {
    pub machine_code: String,
    pub selected_date: NaiveDate,
    pub as_of: NaiveDateTime,
    pub view: ViewMode,
    pub shifts: Vec<ShiftReport>,
    pub latest_known_record: Option<ProductionRecord>,
    pub total_production_in_window: u64,
    pub rejected_records: Vec<RecordRejection>,
}

fn breakdown(segments: &[StatusSegment]) -> BTreeMap<StatusCategory, f64> {
    let mut shares = BTreeMap::new();
    for segment in segments {
        *shares.entry(segment.category).or_insert(0.0) += segment.width_percent;
    }
    shares
}

fn report_for(bucket: &ShiftBucket, cutoff: NaiveDateTime) -> ShiftReport {
    let shift = &bucket.definition;
    let records = bucket.records();
    let carried_in = bucket.carried_in_production();

    let mut segments = build_segments(&bucket.entries, bucket.window, bucket.is_active, cutoff);
    if carried_in > 0 {
        if let Some(first) = segments
            .iter_mut()
            .find(|segment| segment.kind == SegmentKind::Status)
        {
            first.production_delta += carried_in;
        }
    }

    let hourly_production = match shift.mark_hours() {
        Ok(marks) => {
            let mut hourly = hourly_deltas(&records, &marks, shift.end_hour, cutoff);
            let start = bucket.window.start;
            if let Some(index) = bucket_index(start.hour(), start.minute(), &marks, shift.end_hour) {
                hourly[index] += carried_in;
            }
            hourly
        }
        Err(err) => {
            log_warn!("hourly production skipped: {err}");
            vec![0; shift.hour_marks.len()]
        }
    };

    let total_production = total_production(&records) + carried_in;

    ShiftReport {
        name: shift.name.clone(),
        is_active: bucket.is_active,
        window_start: bucket.window.start,
        window_end: bucket.window.end,
        breakdown: breakdown(&segments),
        segments,
        hour_marks: shift.hour_marks.clone(),
        hourly_production,
        total_production,
    }
}

/// Shift reports for already-normalized records.
pub fn build_shift_reports(
    records: Vec<ProductionRecord>,
    schedule: &ShiftSchedule,
    selected_date: NaiveDate,
    as_of: NaiveDateTime,
) -> (ShiftAggregation, Vec<ShiftReport>) {
    let aggregation = aggregate_shifts(records, schedule, selected_date, as_of);
    let reports = aggregation
        .buckets
        .iter()
        .map(|bucket| report_for(bucket, aggregation.cutoff))
        .collect();
    (aggregation, reports)
}

/// Full dashboard for one machine from the rows handed over by storage.
pub fn build_dashboard(
    machine_code: &str,
    raw: &[RawRecord],
    schedule: &ShiftSchedule,
    selected_date: NaiveDate,
    as_of: NaiveDateTime,
    plant_offset: FixedOffset,
) -> MachineDashboard {
    let normalized = normalize_records(raw, plant_offset);
    let (aggregation, shifts) =
        build_shift_reports(normalized.records, schedule, selected_date, as_of);

    let total_production_in_window = shifts.iter().map(|shift| shift.total_production).sum();
    log_debug!(
        "{machine_code}: {} shifts, {} records, {} rejected",
        shifts.len(),
        aggregation.records.len(),
        normalized.rejections.len()
    );

    MachineDashboard {
        machine_code: machine_code.to_string(),
        selected_date,
        as_of,
        view: aggregation.mode,
        shifts,
        latest_known_record: aggregation.records.last().cloned(),
        total_production_in_window,
        rejected_records: normalized.rejections,
    }
}
