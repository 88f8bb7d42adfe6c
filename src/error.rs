use thiserror::Error;

/// A timestamp string that could not be turned into a plant-local instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,
    #[error("unrecognized timestamp format: {0:?}")]
    Unrecognized(String),
}

/// Problems found while validating a shift schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("shift schedule has no shifts")]
    Empty,
    #[error("shift {name:?}: hour {hour} is outside 0..24")]
    HourOutOfRange { name: String, hour: u32 },
    #[error("shift {name:?} has zero length")]
    ZeroLength { name: String },
    #[error("shift {name:?}: invalid hour mark {mark:?}")]
    InvalidHourMark { name: String, mark: String },
    #[error("shift {name:?} has no hour marks")]
    NoHourMarks { name: String },
    #[error("shifts {first:?} and {second:?} overlap at {hour:02}:00")]
    Overlap {
        first: String,
        second: String,
        hour: u32,
    },
}
