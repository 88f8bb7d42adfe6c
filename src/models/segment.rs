use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timeline::status::StatusCategory;

pub const SIGNAL_LOSS_LABEL: &str = "SIGNAL LOSS";
pub const NO_DATA_LABEL: &str = "";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    /// A reported (or carried-over) machine status.
    Status,
    /// No record and nothing to carry over for the whole shift.
    SignalLoss,
    /// A stretch of the shift not covered by any record.
    NoData,
    /// Padding that completes the timeline after the last record.
    Filler,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Status => "status",
            SegmentKind::SignalLoss => "signalLoss",
            SegmentKind::NoData => "noData",
            SegmentKind::Filler => "filler",
        }
    }
}

/// One renderable slice of a shift timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSegment {
    pub status: String,
    pub category: StatusCategory,
    pub kind: SegmentKind,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_percent: f64,
    pub width_percent: f64,
    pub production_delta: u64,
}

impl StatusSegment {
    pub fn end_percent(&self) -> f64 {
        self.start_percent + self.width_percent
    }

    pub fn is_error_state(&self) -> bool {
        self.kind == SegmentKind::SignalLoss
    }
}
