use serde::{Deserialize, Serialize};

use crate::model::attendance::{AttendanceCounts, AttendanceRecord};
use crate::model::slot::Slot;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub day: u8,    // 0: Monday ... 5: Saturday
    pub period: u8, // 1-6
    pub attendance_records: Vec<AttendanceRecord>,
}

impl Class {
    pub fn occupies(&self, slot: Slot) -> bool {
        self.day == slot.day() && self.period == slot.period()
    }

    pub fn counts(&self) -> AttendanceCounts {
        AttendanceCounts::from_records(&self.attendance_records)
    }
}

/// A class that has not been stored yet, so it has no id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub name: String,
    pub day: u8,
    pub period: u8,
    pub attendance_records: Vec<AttendanceRecord>,
}

impl NewClass {
    pub fn new(name: String, slot: Slot) -> Self {
        Self {
            name,
            day: slot.day(),
            period: slot.period(),
            attendance_records: Vec::new(),
        }
    }
}

/// Partial update of a class. `attendance_records`, when present, replaces
/// the whole record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPatch {
    pub name: Option<String>,
    pub day: Option<u8>,
    pub period: Option<u8>,
    pub attendance_records: Option<Vec<AttendanceRecord>>,
}

/// The first class found in `slot`, if any.
pub fn class_for_slot(classes: &[Class], slot: Slot) -> Option<&Class> {
    classes.iter().find(|c| c.occupies(slot))
}
