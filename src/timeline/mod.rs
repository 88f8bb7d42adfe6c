//! Shift timeline reconstruction: from raw counter/status rows to per-shift
//! segments and hourly production.

pub mod aggregator;
pub mod config;
pub mod dashboard;
pub mod records;
pub mod segments;
pub mod status;
pub mod window;

pub use aggregator::{aggregate_shifts, ProductionDay, ShiftAggregation, ShiftBucket, ViewMode};
pub use config::{hourly_marks, ShiftDefinition, ShiftSchedule};
pub use dashboard::{build_dashboard, build_shift_reports, MachineDashboard, ShiftReport};
pub use records::{normalize_records, parse_timestamp, plant_now, NormalizedRecords};
pub use segments::build_segments;
pub use status::{classify, StatusCategory};
pub use window::ShiftWindow;
