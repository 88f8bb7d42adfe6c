//! Shift-boundary arithmetic.
//!
//! The free functions work on local wall-clock hours and minutes and never
//! touch timezones. [`ShiftWindow`] is the same idea pinned to absolute
//! plant-local instants for one production day.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub fn decimal_hour(hour: u32, minute: u32) -> f64 {
    hour as f64 + minute as f64 / 60.0
}

/// Length of a shift in hours; a window with `end < start` wraps midnight.
pub fn shift_length_hours(shift_start: u32, shift_end: u32) -> f64 {
    if shift_end < shift_start {
        (24 - shift_start + shift_end) as f64
    } else {
        (shift_end - shift_start) as f64
    }
}

pub fn is_within_shift(hour: u32, minute: u32, shift_start: u32, shift_end: u32) -> bool {
    let time = decimal_hour(hour, minute);
    let start = shift_start as f64;
    let end = shift_end as f64;

    if shift_end < shift_start {
        time >= start || time < end
    } else {
        time >= start && time < end
    }
}

/// Fraction of the shift elapsed at the given clock time, clamped to `[0, 100]`.
pub fn position_percent(hour: u32, minute: u32, shift_start: u32, shift_end: u32) -> f64 {
    let length = shift_length_hours(shift_start, shift_end);
    if length <= 0.0 {
        return 0.0;
    }

    let mut time = decimal_hour(hour, minute);
    if shift_end < shift_start && time < shift_start as f64 {
        // Past midnight in a wrapping shift.
        time += 24.0;
    }

    let elapsed = time - shift_start as f64;
    (elapsed / length * 100.0).clamp(0.0, 100.0)
}

/// The start boundary is inclusive: a shift starting at 16 has started at 16:00.
pub fn has_started(shift_start_hour: u32, now_hour: u32, now_minute: u32) -> bool {
    decimal_hour(now_hour, now_minute) >= shift_start_hour as f64
}

/// Absolute `[start, end)` bounds of one shift on one production day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShiftWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Position of `instant` on this shift's timeline, clamped to `[0, 100]`.
    pub fn position_of(&self, instant: NaiveDateTime) -> f64 {
        let total = self.duration().num_milliseconds();
        if total <= 0 {
            return 0.0;
        }
        let elapsed = (instant - self.start).num_milliseconds();
        (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Pulls `instant` into the window bounds.
    pub fn clamp(&self, instant: NaiveDateTime) -> NaiveDateTime {
        instant.clamp(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn midnight_wrap_membership() {
        assert!(is_within_shift(23, 30, 22, 6));
        assert!(is_within_shift(5, 59, 22, 6));
        assert!(!is_within_shift(10, 0, 22, 6));
        assert!(!is_within_shift(6, 0, 22, 6));
    }

    #[test]
    fn regular_window_is_half_open() {
        assert!(is_within_shift(7, 0, 7, 16));
        assert!(is_within_shift(15, 59, 7, 16));
        assert!(!is_within_shift(16, 0, 7, 16));
        assert!(!is_within_shift(6, 59, 7, 16));
    }

    #[test]
    fn position_in_regular_shift() {
        assert_eq!(position_percent(7, 0, 7, 16), 0.0);
        let mid = position_percent(11, 30, 7, 16);
        assert!((mid - 50.0).abs() < 1e-9);
        assert_eq!(position_percent(17, 0, 7, 16), 100.0);
        assert_eq!(position_percent(6, 0, 7, 16), 0.0);
    }

    #[test]
    fn position_after_midnight_in_wrapping_shift() {
        // 22:00-06:00, 02:00 is half way.
        let pos = position_percent(2, 0, 22, 6);
        assert!((pos - 50.0).abs() < 1e-9);
        let pos = position_percent(23, 0, 22, 6);
        assert!((pos - 12.5).abs() < 1e-9);
    }

    #[test]
    fn shift_ending_at_midnight_uses_zero_end_hour() {
        assert_eq!(shift_length_hours(16, 0), 8.0);
        assert!(is_within_shift(23, 59, 16, 0));
        assert!(!is_within_shift(0, 0, 16, 0));
        let pos = position_percent(20, 0, 16, 0);
        assert!((pos - 50.0).abs() < 1e-9);
    }

    #[test]
    fn start_boundary_is_inclusive() {
        assert!(has_started(16, 16, 0));
        assert!(has_started(16, 17, 45));
        assert!(!has_started(16, 15, 59));
    }

    #[test]
    fn shift_window_positions() {
        let window = ShiftWindow::new(at(2, 22, 0), at(3, 6, 0));
        assert!(window.contains(at(3, 1, 0)));
        assert!(!window.contains(at(3, 6, 0)));
        assert!((window.position_of(at(3, 2, 0)) - 50.0).abs() < 1e-9);
        assert_eq!(window.position_of(at(2, 21, 0)), 0.0);
        assert_eq!(window.position_of(at(3, 9, 0)), 100.0);
        assert_eq!(window.clamp(at(3, 9, 0)), at(3, 6, 0));
    }

    #[test]
    fn clock_and_instant_positions_agree() {
        let window = ShiftWindow::new(at(2, 7, 0), at(2, 16, 0));
        let clock = position_percent(9, 30, 7, 16);
        let instant = window.position_of(at(2, 9, 30));
        assert!((clock - instant).abs() < 1e-9);
    }
}
