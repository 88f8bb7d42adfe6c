use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::timeline::window::{is_within_shift, shift_length_hours};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// One fixed daily shift. `end_hour < start_hour` means the shift crosses
/// midnight; a shift ending at midnight uses `end_hour = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDefinition {
    pub name: String,
    pub start_hour: u32,
    pub end_hour: u32,
    /// Display labels such as `"07:00"`; each one opens an hourly production bucket.
    pub hour_marks: Vec<String>,
}

impl ShiftDefinition {
    pub fn new(name: impl Into<String>, start_hour: u32, end_hour: u32) -> Self {
        let hour_marks = hourly_marks(start_hour, end_hour);
        Self {
            name: name.into(),
            start_hour,
            end_hour,
            hour_marks,
        }
    }

    pub fn length_hours(&self) -> f64 {
        shift_length_hours(self.start_hour, self.end_hour)
    }

    pub fn contains_clock(&self, hour: u32, minute: u32) -> bool {
        is_within_shift(hour, minute, self.start_hour, self.end_hour)
    }

    /// Clock hours of the hour marks, in configured order.
    pub fn mark_hours(&self) -> Result<Vec<u32>, ScheduleError> {
        self.hour_marks
            .iter()
            .map(|mark| {
                NaiveTime::parse_from_str(mark.trim(), "%H:%M")
                    .map(|time| chrono::Timelike::hour(&time))
                    .map_err(|_| ScheduleError::InvalidHourMark {
                        name: self.name.clone(),
                        mark: mark.clone(),
                    })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        for hour in [self.start_hour, self.end_hour] {
            if hour >= 24 {
                return Err(ScheduleError::HourOutOfRange {
                    name: self.name.clone(),
                    hour,
                });
            }
        }
        if self.start_hour == self.end_hour {
            return Err(ScheduleError::ZeroLength {
                name: self.name.clone(),
            });
        }
        if self.hour_marks.is_empty() {
            return Err(ScheduleError::NoHourMarks {
                name: self.name.clone(),
            });
        }
        self.mark_hours()?;
        Ok(())
    }
}

/// One `"HH:00"` mark per hour from `start_hour` up to, but not including, `end_hour`.
pub fn hourly_marks(start_hour: u32, end_hour: u32) -> Vec<String> {
    let length = shift_length_hours(start_hour, end_hour) as u32;
    (0..length)
        .map(|offset| format!("{:02}:00", (start_hour + offset) % 24))
        .collect()
}

/// Ordered shifts making up one production day. The first shift's start hour
/// is where the production day begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftSchedule {
    pub shifts: Vec<ShiftDefinition>,
}

impl Default for ShiftSchedule {
    fn default() -> Self {
        Self {
            shifts: vec![
                ShiftDefinition::new("Shift 1", 7, 16),
                ShiftDefinition::new("Shift 2", 16, 0),
                ShiftDefinition::new("Shift 3", 0, 7),
            ],
        }
    }
}

impl ShiftSchedule {
    pub fn new(shifts: Vec<ShiftDefinition>) -> Self {
        Self { shifts }
    }

    pub fn day_start_hour(&self) -> u32 {
        self.shifts.first().map(|shift| shift.start_hour).unwrap_or(0)
    }

    /// Checks every shift and the 24 hour partition. Overlaps are errors;
    /// uncovered hours are only logged since a plant may leave hours unstaffed.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.shifts.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for shift in &self.shifts {
            shift.validate()?;
        }

        for hour in 0..24 {
            let owners: Vec<&ShiftDefinition> = self
                .shifts
                .iter()
                .filter(|shift| shift.contains_clock(hour, 0))
                .collect();

            match owners.as_slice() {
                [] => log_warn!("no shift covers {:02}:00", hour),
                [_] => {}
                [first, second, ..] => {
                    return Err(ScheduleError::Overlap {
                        first: first.name.clone(),
                        second: second.name.clone(),
                        hour,
                    })
                }
            }
        }

        Ok(())
    }
}
