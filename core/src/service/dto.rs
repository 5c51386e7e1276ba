use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{AttendanceRecord, AttendanceStatus, Class, ClassPatch, NewClass};
use crate::store::{Document, Fields};

/// Class-level fields as stored in a `classes` document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassDoc {
    pub name: String,
    pub day: u8,
    pub period: u8,
}

impl ClassDoc {
    pub fn from_new(class: &NewClass) -> Self {
        Self {
            name: class.name.clone(),
            day: class.day,
            period: class.period,
        }
    }

    pub fn into_entity(self, id: String, attendance_records: Vec<AttendanceRecord>) -> Class {
        Class {
            id,
            name: self.name,
            day: self.day,
            period: self.period,
            attendance_records,
        }
    }
}

/// An `attendance` document. The record keeps the id it was created with;
/// older documents without one fall back to the document id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttendanceDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceDoc {
    pub fn from_entity(record: &AttendanceRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            date: record.date,
            status: record.status,
        }
    }

    pub fn into_entity(self, doc_id: String) -> AttendanceRecord {
        AttendanceRecord {
            id: self.id.unwrap_or(doc_id),
            date: self.date,
            status: self.status,
        }
    }
}

pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("Expected a JSON object, got {}", other)),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<(String, T)> {
    let value = serde_json::from_value(Value::Object(doc.fields))
        .map_err(|e| anyhow!("Malformed document {}: {}", doc.id, e))?;
    Ok((doc.id, value))
}

/// Class-level fields of a patch. Attendance records are handled separately.
pub fn patch_fields(patch: &ClassPatch) -> Fields {
    let mut fields = Fields::new();
    if let Some(name) = &patch.name {
        fields.insert("name".to_string(), Value::from(name.clone()));
    }
    if let Some(day) = patch.day {
        fields.insert("day".to_string(), Value::from(day));
    }
    if let Some(period) = patch.period {
        fields.insert("period".to_string(), Value::from(period));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attendance_doc_prefers_stored_id() {
        let doc = Document {
            id: "doc-id".to_string(),
            fields: to_fields(&json!({
                "id": "1700000000000",
                "date": "2025-09-01",
                "status": "present"
            }))
            .unwrap(),
        };
        let (doc_id, parsed) = from_document::<AttendanceDoc>(doc).unwrap();
        let record = parsed.into_entity(doc_id);
        assert_eq!(record.id, "1700000000000");
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[test]
    fn test_attendance_doc_falls_back_to_document_id() {
        let doc = Document {
            id: "doc-id".to_string(),
            fields: to_fields(&json!({"date": "2025-09-01", "status": "absent"})).unwrap(),
        };
        let (doc_id, parsed) = from_document::<AttendanceDoc>(doc).unwrap();
        assert_eq!(parsed.into_entity(doc_id).id, "doc-id");
    }

    #[test]
    fn test_malformed_class_doc() {
        let doc = Document {
            id: "x".to_string(),
            fields: to_fields(&json!({"name": "A"})).unwrap(),
        };
        assert!(from_document::<ClassDoc>(doc).is_err());
    }

    #[test]
    fn test_patch_fields_only_set_values() {
        let patch = ClassPatch {
            name: Some("Networks".to_string()),
            ..ClassPatch::default()
        };
        let fields = patch_fields(&patch);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], "Networks");
    }
}
