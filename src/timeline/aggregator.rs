//! Partitions a machine's record stream into the shifts of one production day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{ProductionRecord, TimelineEntry};
use crate::timeline::config::{ShiftDefinition, ShiftSchedule};
use crate::timeline::records::{filter_up_to, latest_before, sort_ascending};
use crate::timeline::window::{has_started, ShiftWindow};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// `as_of` falls inside the production day.
    Live,
    /// The production day is over.
    Historical,
    /// The production day has not begun yet.
    Upcoming,
}

/// The 24 hours that belong to one selected date, starting at the first
/// shift's start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionDay {
    pub date: NaiveDate,
    pub day_start_hour: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ProductionDay {
    pub fn new(date: NaiveDate, schedule: &ShiftSchedule) -> Self {
        let day_start_hour = schedule.day_start_hour();
        let start = date.and_time(clock(day_start_hour));
        Self {
            date,
            day_start_hour,
            start,
            end: start + Duration::hours(24),
        }
    }

    /// Absolute bounds of `shift` on this day. A shift starting earlier in the
    /// clock than the day itself belongs to the next calendar date.
    pub fn window_for(&self, shift: &ShiftDefinition) -> ShiftWindow {
        let date = if shift.start_hour < self.day_start_hour {
            self.date.succ_opt().unwrap_or(self.date)
        } else {
            self.date
        };
        let start = date.and_time(clock(shift.start_hour));
        let end = start + Duration::minutes((shift.length_hours() * 60.0).round() as i64);
        ShiftWindow::new(start, end)
    }

    pub fn view_mode(&self, as_of: NaiveDateTime) -> ViewMode {
        if as_of >= self.end {
            ViewMode::Historical
        } else if as_of < self.start {
            ViewMode::Upcoming
        } else {
            ViewMode::Live
        }
    }

    /// Latest instant whose records may be shown.
    pub fn cutoff(&self, as_of: NaiveDateTime) -> NaiveDateTime {
        as_of.min(self.end)
    }

    /// The production day that `instant` falls into.
    pub fn containing(instant: NaiveDateTime, schedule: &ShiftSchedule) -> Self {
        let date = if instant.hour() < schedule.day_start_hour() {
            instant.date().pred_opt().unwrap_or(instant.date())
        } else {
            instant.date()
        };
        Self::new(date, schedule)
    }
}

fn clock(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// The records of one shift, ready for segment building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftBucket {
    pub definition: ShiftDefinition,
    pub window: ShiftWindow,
    pub is_active: bool,
    /// Continuity record (if any) followed by the observed in-shift records.
    pub entries: Vec<TimelineEntry>,
    /// Last state known before the shift started.
    pub prior: Option<ProductionRecord>,
}

impl ShiftBucket {
    pub fn observed_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_continuity()).count()
    }

    pub fn has_continuity(&self) -> bool {
        self.entries.first().is_some_and(TimelineEntry::is_continuity)
    }

    pub fn records(&self) -> Vec<ProductionRecord> {
        self.entries.iter().map(|entry| entry.record.clone()).collect()
    }

    /// Counter increase from the prior state to a first record stamped
    /// exactly at the shift start. No entry pairs with it otherwise.
    pub fn carried_in_production(&self) -> u64 {
        if self.has_continuity() {
            return 0;
        }
        match (&self.prior, self.entries.first()) {
            (Some(prior), Some(first)) if first.timestamp() == self.window.start => {
                prior.delta_to(&first.record)
            }
            _ => 0,
        }
    }
}

/// Output of [`aggregate_shifts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftAggregation {
    pub day: ProductionDay,
    pub mode: ViewMode,
    pub cutoff: NaiveDateTime,
    /// Started shifts only, in schedule order.
    pub buckets: Vec<ShiftBucket>,
    /// All records at or before the cutoff, sorted.
    pub records: Vec<ProductionRecord>,
}

/// In a live view, whether the shift has begun by `as_of`.
pub fn shift_has_started(window: &ShiftWindow, shift: &ShiftDefinition, as_of: NaiveDateTime) -> bool {
    match window.start.date().cmp(&as_of.date()) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => has_started(shift.start_hour, as_of.hour(), as_of.minute()),
    }
}

/// Splits `records` into the started shifts of `selected_date`'s production day.
///
/// A shift whose first record comes after its start gets a continuity entry
/// at the start carrying the last state seen before it, when there is one.
pub fn aggregate_shifts(
    records: Vec<ProductionRecord>,
    schedule: &ShiftSchedule,
    selected_date: NaiveDate,
    as_of: NaiveDateTime,
) -> ShiftAggregation {
    let day = ProductionDay::new(selected_date, schedule);
    let mode = day.view_mode(as_of);
    let cutoff = day.cutoff(as_of);
    let records = filter_up_to(sort_ascending(records), cutoff);

    let mut buckets = Vec::with_capacity(schedule.shifts.len());

    for shift in &schedule.shifts {
        let window = day.window_for(shift);

        let started = match mode {
            ViewMode::Historical => true,
            ViewMode::Upcoming => false,
            ViewMode::Live => shift_has_started(&window, shift, as_of),
        };
        if !started {
            log_debug!("{} has not started at {}", shift.name, as_of);
            continue;
        }

        let is_active = mode == ViewMode::Live && window.contains(as_of);
        let prior = latest_before(&records, window.start, cutoff).cloned();

        let observed: Vec<&ProductionRecord> = records
            .iter()
            .filter(|record| window.contains(record.timestamp))
            .collect();

        let needs_continuity = observed
            .first()
            .map_or(true, |first| first.timestamp > window.start);

        let mut entries = Vec::with_capacity(observed.len() + 1);
        if needs_continuity {
            if let Some(prior) = &prior {
                entries.push(TimelineEntry::continuity(prior, window.start));
            }
        }
        entries.extend(observed.into_iter().cloned().map(TimelineEntry::observed));

        if entries.is_empty() {
            log_debug!("{} has no records and no prior state", shift.name);
        }

        buckets.push(ShiftBucket {
            definition: shift.clone(),
            window,
            is_active,
            entries,
            prior,
        });
    }

    ShiftAggregation {
        day,
        mode,
        cutoff,
        buckets,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordOrigin;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, minute, 0).unwrap()
    }

    fn record(day: u32, hour: u32, minute: u32, counter: u64, status: &str) -> ProductionRecord {
        ProductionRecord::new(at(day, hour, minute), counter, status)
    }

    #[test]
    fn production_day_places_night_shift_on_next_date() {
        let schedule = ShiftSchedule::default();
        let day = ProductionDay::new(date(2), &schedule);
        assert_eq!(day.start, at(2, 7, 0));
        assert_eq!(day.end, at(3, 7, 0));

        let second = day.window_for(&schedule.shifts[1]);
        assert_eq!(second.start, at(2, 16, 0));
        assert_eq!(second.end, at(3, 0, 0));

        let third = day.window_for(&schedule.shifts[2]);
        assert_eq!(third.start, at(3, 0, 0));
        assert_eq!(third.end, at(3, 7, 0));
    }

    #[test]
    fn view_modes() {
        let day = ProductionDay::new(date(2), &ShiftSchedule::default());
        assert_eq!(day.view_mode(at(2, 6, 59)), ViewMode::Upcoming);
        assert_eq!(day.view_mode(at(2, 7, 0)), ViewMode::Live);
        assert_eq!(day.view_mode(at(3, 6, 59)), ViewMode::Live);
        assert_eq!(day.view_mode(at(3, 7, 0)), ViewMode::Historical);
        assert_eq!(day.cutoff(at(9, 0, 0)), at(3, 7, 0));
    }

    #[test]
    fn night_hours_belong_to_the_previous_production_day() {
        let schedule = ShiftSchedule::default();
        assert_eq!(ProductionDay::containing(at(3, 2, 0), &schedule).date, date(2));
        assert_eq!(ProductionDay::containing(at(3, 7, 0), &schedule).date, date(3));
        assert_eq!(ProductionDay::containing(at(2, 23, 59), &schedule).date, date(2));
    }

    #[test]
    fn live_view_omits_unstarted_shifts() {
        let aggregation = aggregate_shifts(
            vec![record(2, 8, 0, 10, "Normal Operation")],
            &ShiftSchedule::default(),
            date(2),
            at(2, 10, 0),
        );
        assert_eq!(aggregation.mode, ViewMode::Live);
        assert_eq!(aggregation.buckets.len(), 1);
        assert!(aggregation.buckets[0].is_active);
    }

    #[test]
    fn night_shift_starts_after_midnight_in_live_view() {
        let schedule = ShiftSchedule::default();
        let before = aggregate_shifts(Vec::new(), &schedule, date(2), at(2, 23, 0));
        assert_eq!(before.buckets.len(), 2);
        let after = aggregate_shifts(Vec::new(), &schedule, date(2), at(3, 1, 0));
        assert_eq!(after.buckets.len(), 3);
        assert!(after.buckets[2].is_active);
        assert!(!after.buckets[1].is_active);
    }

    #[test]
    fn upcoming_day_has_no_buckets() {
        let aggregation = aggregate_shifts(Vec::new(), &ShiftSchedule::default(), date(5), at(2, 12, 0));
        assert_eq!(aggregation.mode, ViewMode::Upcoming);
        assert!(aggregation.buckets.is_empty());
    }

    #[test]
    fn continuity_is_injected_from_previous_shift() {
        let records = vec![
            record(2, 15, 0, 480, "Chokotei"),
            record(2, 15, 58, 500, "NORMAL OPERATION"),
            record(2, 16, 40, 520, "CHOKOTEI"),
        ];
        let aggregation =
            aggregate_shifts(records, &ShiftSchedule::default(), date(2), at(2, 18, 0));
        let second = &aggregation.buckets[1];

        assert!(second.has_continuity());
        assert_eq!(second.entries.len(), 2);
        assert_eq!(second.entries[0].timestamp(), at(2, 16, 0));
        assert_eq!(second.entries[0].record.status, "NORMAL OPERATION");
        assert_eq!(second.entries[0].record.counter, 500);
        assert_eq!(second.entries[1].origin, RecordOrigin::Observed);
        assert_eq!(second.observed_count(), 1);
    }

    #[test]
    fn no_continuity_when_first_record_is_at_shift_start() {
        let records = vec![
            record(2, 15, 58, 500, "NORMAL OPERATION"),
            record(2, 16, 0, 505, "CHOKOTEI"),
        ];
        let aggregation =
            aggregate_shifts(records, &ShiftSchedule::default(), date(2), at(2, 18, 0));
        assert!(!aggregation.buckets[1].has_continuity());
        assert_eq!(aggregation.buckets[1].entries.len(), 1);
        assert_eq!(aggregation.buckets[1].carried_in_production(), 5);
    }

    #[test]
    fn continuity_bucket_carries_nothing_extra() {
        let records = vec![
            record(2, 15, 58, 500, "NORMAL OPERATION"),
            record(2, 16, 40, 520, "CHOKOTEI"),
        ];
        let aggregation =
            aggregate_shifts(records, &ShiftSchedule::default(), date(2), at(2, 18, 0));
        assert!(aggregation.buckets[1].has_continuity());
        assert_eq!(aggregation.buckets[1].carried_in_production(), 0);
        assert_eq!(aggregation.buckets[0].carried_in_production(), 0);
    }

    #[test]
    fn empty_shift_carries_prior_state_only() {
        let records = vec![record(2, 9, 0, 100, "Repair")];
        let aggregation =
            aggregate_shifts(records, &ShiftSchedule::default(), date(2), at(4, 0, 0));
        assert_eq!(aggregation.mode, ViewMode::Historical);
        assert_eq!(aggregation.buckets.len(), 3);

        let third = &aggregation.buckets[2];
        assert_eq!(third.entries.len(), 1);
        assert!(third.has_continuity());
        assert_eq!(third.entries[0].timestamp(), at(3, 0, 0));
        assert!(!third.is_active);
    }

    #[test]
    fn future_records_are_cut_off() {
        let records = vec![
            record(2, 8, 0, 10, "Normal Operation"),
            record(2, 11, 0, 20, "Normal Operation"),
        ];
        let aggregation =
            aggregate_shifts(records, &ShiftSchedule::default(), date(2), at(2, 10, 0));
        assert_eq!(aggregation.records.len(), 1);
        assert_eq!(aggregation.buckets[0].observed_count(), 1);
    }
}
