pub mod attendance;
pub mod class;
pub mod slot;

pub use attendance::{AttendanceCounts, AttendanceRecord, AttendanceStatus};
pub use class::{class_for_slot, Class, ClassPatch, NewClass};
pub use slot::{Slot, DAY_COUNT, DAY_LABELS, PERIOD_COUNT};
