use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::input::expand_key;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match expand_key(&s.to_lowercase(), &["present", "absent"])?.as_str() {
            "present" => Ok(AttendanceStatus::Present),
            _ => Ok(AttendanceStatus::Absent),
        }
    }
}

/// One day's attendance mark for a class. A class holds at most one record
/// per date.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: String,
    pub date: NaiveDate, // YYYY-MM-DD
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(id: String, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self { id, date, status }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceCounts {
    pub present: usize,
    pub absent: usize,
}

impl AttendanceCounts {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let present = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count();
        let absent = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Absent)
            .count();
        Self { present, absent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord::new(
            day.to_string(),
            NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            status,
        )
    }

    #[test]
    fn test_counts() {
        let records = vec![
            record(1, AttendanceStatus::Present),
            record(2, AttendanceStatus::Absent),
            record(3, AttendanceStatus::Present),
        ];
        let counts = AttendanceCounts::from_records(&records);
        assert_eq!(counts.present, 2);
        assert_eq!(counts.absent, 1);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(record(1, AttendanceStatus::Absent)).unwrap();
        assert_eq!(json["status"], "absent");
        assert_eq!(json["date"], "2025-09-01");
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("present".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert_eq!("A".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Absent);
        assert!("late".parse::<AttendanceStatus>().is_err());
    }
}
