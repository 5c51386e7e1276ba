pub mod config;
pub mod input;
pub mod model;
pub mod service;
pub mod store;
pub mod time;

pub use config::{data_dir, Config, PeriodTime};
pub use input::{expand_key, parse_day};
pub use model::{
    class_for_slot, AttendanceCounts, AttendanceRecord, AttendanceStatus, Class, ClassPatch,
    NewClass, Slot, DAY_COUNT, DAY_LABELS, PERIOD_COUNT,
};
pub use service::class_gateway::{ClassGateway, Subscription};
pub use store::{DocumentStore, LocalStore, StoreError};
pub use time::{parse_attendance_date, timestamp_id, today};
