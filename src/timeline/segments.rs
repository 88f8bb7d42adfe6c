//! Turns one shift's timeline entries into contiguous percentage-width
//! status segments.

use chrono::NaiveDateTime;

use crate::models::{SegmentKind, StatusSegment, TimelineEntry, NO_DATA_LABEL, SIGNAL_LOSS_LABEL};
use crate::timeline::status::{classify, same_status, StatusCategory};
use crate::timeline::window::ShiftWindow;

const WIDTH_EPSILON: f64 = 1e-9;

/// A run of consecutive entries reporting the same status.
struct EntryGroup<'a> {
    entries: Vec<&'a TimelineEntry>,
}

impl EntryGroup<'_> {
    fn status(&self) -> &str {
        &self.entries[0].record.status
    }

    fn start(&self) -> NaiveDateTime {
        self.entries[0].timestamp()
    }
}

fn group_entries<'a>(entries: &[&'a TimelineEntry]) -> Vec<EntryGroup<'a>> {
    let mut groups: Vec<EntryGroup<'a>> = Vec::new();

    for &entry in entries {
        match groups.last_mut() {
            Some(group) if same_status(group.status(), &entry.record.status) => {
                group.entries.push(entry);
            }
            _ => groups.push(EntryGroup {
                entries: vec![entry],
            }),
        }
    }

    groups
}

fn make_segment(
    window: &ShiftWindow,
    status: &str,
    category: StatusCategory,
    kind: SegmentKind,
    start: NaiveDateTime,
    end: NaiveDateTime,
    production_delta: u64,
) -> StatusSegment {
    let start_percent = window.position_of(start);
    StatusSegment {
        status: status.to_string(),
        category,
        kind,
        start_time: start,
        end_time: end,
        start_percent,
        width_percent: window.position_of(end) - start_percent,
        production_delta,
    }
}

/// Builds the segment list for one shift.
///
/// Widths are positions on the shift timeline. For an active shift they add
/// up to the elapsed share of the shift at `now`; otherwise to 100.
/// Zero-width slices are never emitted.
pub fn build_segments(
    entries: &[TimelineEntry],
    window: ShiftWindow,
    is_active: bool,
    now: NaiveDateTime,
) -> Vec<StatusSegment> {
    let boundary = window.clamp(now);
    let target_percent = if is_active {
        window.position_of(boundary)
    } else {
        100.0
    };

    let visible: Vec<&TimelineEntry> = entries
        .iter()
        .filter(|entry| entry.timestamp() >= window.start && entry.timestamp() <= boundary)
        .collect();

    let mut segments = Vec::new();

    if visible.is_empty() {
        let signal_loss = make_segment(
            &window,
            SIGNAL_LOSS_LABEL,
            StatusCategory::SignalLoss,
            SegmentKind::SignalLoss,
            window.start,
            boundary,
            0,
        );
        if signal_loss.width_percent > WIDTH_EPSILON {
            segments.push(signal_loss);
        }
        pad_to_target(&mut segments, &window, is_active, boundary, target_percent);
        return segments;
    }

    let first_time = visible[0].timestamp();
    if first_time > window.start {
        segments.push(make_segment(
            &window,
            NO_DATA_LABEL,
            classify(NO_DATA_LABEL),
            SegmentKind::NoData,
            window.start,
            first_time,
            0,
        ));
    }

    let groups = group_entries(&visible);
    let mut carried_production = 0;

    for (index, group) in groups.iter().enumerate() {
        let next_group = groups.get(index + 1);
        let end = next_group.map_or(boundary, EntryGroup::start);

        // Clamped deltas between the group's entries and on to the next group.
        let mut production = carried_production;
        let followers = group.entries[1..]
            .iter()
            .copied()
            .chain(next_group.map(|next| next.entries[0]));
        for (current, next) in group.entries.iter().zip(followers) {
            production += current.record.delta_to(&next.record);
        }

        let segment = make_segment(
            &window,
            group.status(),
            classify(group.status()),
            SegmentKind::Status,
            group.start(),
            end,
            production,
        );

        if segment.width_percent > WIDTH_EPSILON {
            carried_production = 0;
            push_status_segment(&mut segments, segment);
        } else {
            carried_production = production;
        }
    }

    if carried_production > 0 {
        if let Some(last) = segments
            .iter_mut()
            .rev()
            .find(|segment| segment.kind == SegmentKind::Status)
        {
            last.production_delta += carried_production;
        }
    }

    pad_to_target(&mut segments, &window, is_active, boundary, target_percent);
    segments
}

/// Extends the previous segment instead when both report the same status,
/// which happens once a zero-width group between them has been dropped.
fn push_status_segment(segments: &mut Vec<StatusSegment>, segment: StatusSegment) {
    if let Some(previous) = segments.last_mut() {
        if previous.kind == SegmentKind::Status && same_status(&previous.status, &segment.status) {
            previous.end_time = segment.end_time;
            previous.width_percent += segment.width_percent;
            previous.production_delta += segment.production_delta;
            return;
        }
    }
    segments.push(segment);
}

/// Appends a filler when the segments stop short of the target width: the
/// last status repeated for an active shift, a neutral slice otherwise.
fn pad_to_target(
    segments: &mut Vec<StatusSegment>,
    window: &ShiftWindow,
    is_active: bool,
    boundary: NaiveDateTime,
    target_percent: f64,
) {
    let covered: f64 = segments.iter().map(|segment| segment.width_percent).sum();
    if covered + WIDTH_EPSILON >= target_percent {
        return;
    }

    let start = segments.last().map_or(window.start, |segment| segment.end_time);
    let (status, category, end) = if is_active {
        let status = segments
            .last()
            .filter(|segment| segment.kind == SegmentKind::Status)
            .map(|segment| segment.status.clone())
            .unwrap_or_default();
        let category = classify(&status);
        (status, category, boundary)
    } else {
        (NO_DATA_LABEL.to_string(), StatusCategory::Unknown, window.end)
    };

    let filler = make_segment(window, &status, category, SegmentKind::Filler, start, end, 0);
    if filler.width_percent > WIDTH_EPSILON {
        segments.push(filler);
    }
}
