pub mod machine;

pub use machine::{Machine, MachineStatusRow, StoredRecord};
