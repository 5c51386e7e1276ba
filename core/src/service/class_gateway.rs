use anyhow::Result;
use serde_json::Value;
use tracing::{debug, error};

use crate::model::{AttendanceRecord, Class, ClassPatch, NewClass};
use crate::service::dto::{from_document, patch_fields, to_fields, AttendanceDoc, ClassDoc};
use crate::store::{CollectionPath, Document, DocumentStore, Watch};

const CLASSES_COLLECTION: &str = "classes";
const ATTENDANCE_COLLECTION: &str = "attendance";

fn classes_path() -> CollectionPath {
    CollectionPath::root(CLASSES_COLLECTION)
}

fn attendance_path(class_id: &str) -> CollectionPath {
    classes_path().doc(class_id).collection(ATTENDANCE_COLLECTION)
}

/// Live feed of class snapshots. Dropping it (or calling `unsubscribe`)
/// stops delivery.
pub struct Subscription {
    watch: Watch,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self.watch);
    }
}

/// Reads and writes classes with their attendance records. A class is one
/// document in `classes`, its records are documents in the class's
/// `attendance` sub-collection.
///
/// Multi-step writes run one document at a time with no rollback: a failure
/// halfway leaves whatever was already written.
pub struct ClassGateway<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ClassGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All classes with their records. Any failure is logged and yields an
    /// empty list.
    pub fn list_classes(&self) -> Vec<Class> {
        let result = self
            .store
            .list(&classes_path())
            .map_err(anyhow::Error::from)
            .and_then(|docs| assemble(&self.store, docs));

        match result {
            Ok(classes) => classes,
            Err(e) => {
                error!(error = %e, "Error getting classes");
                Vec::new()
            }
        }
    }

    /// Call `callback` with the full class list now and after every change.
    /// Each change re-reads the records of every class.
    pub fn subscribe<F>(&self, callback: F) -> Result<Subscription>
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(Vec<Class>) + Send + Sync + 'static,
    {
        let store = self.store.clone();
        let watch = self.store.watch(&classes_path(), move |docs| {
            match assemble(&store, docs) {
                Ok(classes) => callback(classes),
                Err(e) => error!(error = %e, "Error building class snapshot"),
            }
        })?;
        Ok(Subscription { watch })
    }

    pub fn add_class(&self, new_class: NewClass) -> Result<String> {
        self.try_add_class(new_class)
            .inspect_err(|e| error!(error = %e, "Error adding class"))
    }

    fn try_add_class(&self, new_class: NewClass) -> Result<String> {
        let id = self
            .store
            .add(&classes_path(), to_fields(&ClassDoc::from_new(&new_class))?)?;

        let attendance = attendance_path(&id);
        for record in &new_class.attendance_records {
            self.store
                .add(&attendance, to_fields(&AttendanceDoc::from_entity(record))?)?;
        }

        debug!(id = %id, name = %new_class.name, "class added");
        Ok(id)
    }

    /// Merge class-level fields. When `patch.attendance_records` is set the
    /// stored records are replaced wholesale.
    pub fn update_class(&self, class_id: &str, patch: ClassPatch) -> Result<()> {
        self.try_update_class(class_id, patch)
            .inspect_err(|e| error!(class_id, error = %e, "Error updating class"))
    }

    fn try_update_class(&self, class_id: &str, patch: ClassPatch) -> Result<()> {
        self.store
            .update(&classes_path().doc(class_id), patch_fields(&patch))?;

        if let Some(records) = patch.attendance_records {
            let attendance = attendance_path(class_id);
            for doc in self.store.list(&attendance)? {
                self.store.delete(&attendance.doc(&doc.id))?;
            }
            for record in &records {
                self.store
                    .add(&attendance, to_fields(&AttendanceDoc::from_entity(record))?)?;
            }
        }
        Ok(())
    }

    /// Delete every record of the class, then the class itself.
    pub fn delete_class(&self, class_id: &str) -> Result<()> {
        self.try_delete_class(class_id)
            .inspect_err(|e| error!(class_id, error = %e, "Error deleting class"))
    }

    fn try_delete_class(&self, class_id: &str) -> Result<()> {
        let attendance = attendance_path(class_id);
        for doc in self.store.list(&attendance)? {
            self.store.delete(&attendance.doc(&doc.id))?;
        }
        self.store.delete(&classes_path().doc(class_id))?;
        debug!(class_id, "class deleted");
        Ok(())
    }

    /// Overwrite the status of the record for `record.date`, or insert
    /// `record` if that date has none yet. The read and the write are separate
    /// store calls, so concurrent callers can both insert.
    pub fn update_attendance(&self, class_id: &str, record: AttendanceRecord) -> Result<()> {
        self.try_update_attendance(class_id, record)
            .inspect_err(|e| error!(class_id, error = %e, "Error updating attendance"))
    }

    fn try_update_attendance(&self, class_id: &str, record: AttendanceRecord) -> Result<()> {
        let attendance = attendance_path(class_id);
        let date = record.date.format("%Y-%m-%d").to_string();

        let existing = self
            .store
            .list(&attendance)?
            .into_iter()
            .find(|doc| doc.fields.get("date").and_then(Value::as_str) == Some(date.as_str()));

        match existing {
            Some(doc) => {
                let mut fields = to_fields(&AttendanceDoc::from_entity(&record))?;
                fields.retain(|key, _| key == "status");
                self.store.update(&attendance.doc(&doc.id), fields)?;
            }
            None => {
                self.store
                    .add(&attendance, to_fields(&AttendanceDoc::from_entity(&record))?)?;
            }
        }
        debug!(class_id, date = %date, status = record.status.as_str(), "attendance recorded");
        Ok(())
    }
}

fn assemble<S: DocumentStore>(store: &S, class_docs: Vec<Document>) -> Result<Vec<Class>> {
    let mut classes = Vec::with_capacity(class_docs.len());

    for class_doc in class_docs {
        let (id, class_data) = from_document::<ClassDoc>(class_doc)?;
        let attendance_records = store
            .list(&attendance_path(&id))?
            .into_iter()
            .map(|doc| {
                from_document::<AttendanceDoc>(doc).map(|(doc_id, r)| r.into_entity(doc_id))
            })
            .collect::<Result<Vec<_>>>()?;

        classes.push(class_data.into_entity(id, attendance_records));
    }

    Ok(classes)
}
