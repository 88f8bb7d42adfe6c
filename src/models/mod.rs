pub mod record;
pub mod segment;

pub use record::{ProductionRecord, RawRecord, RecordOrigin, RecordRejection, TimelineEntry};
pub use segment::{SegmentKind, StatusSegment, NO_DATA_LABEL, SIGNAL_LOSS_LABEL};
