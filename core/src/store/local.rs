use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::data_dir;
use crate::store::error::StoreError;
use crate::store::path::{CollectionPath, DocumentPath};
use crate::store::traits::{Document, DocumentStore, Fields};
use crate::store::watch::{Registry, Watch};

const STORE_FILE_NAME: &str = "store.json";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
struct Collection {
    docs: BTreeMap<String, Node>,
}

/// A document slot. `fields` is `None` when the document itself was deleted
/// (or never written) but sub-collections still hang off it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<Fields>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    collections: BTreeMap<String, Collection>,
}

impl Node {
    fn has_children(&self) -> bool {
        self.collections.values().any(|c| !c.docs.is_empty())
    }
}

fn find_collection<'a>(root: &'a Node, path: &CollectionPath) -> Option<&'a Collection> {
    let mut node = root;
    for (name, id) in &path.ancestors {
        node = node.collections.get(name)?.docs.get(id)?;
    }
    node.collections.get(&path.name)
}

fn find_collection_mut<'a>(
    root: &'a mut Node,
    path: &CollectionPath,
) -> Option<&'a mut Collection> {
    let mut node = root;
    for (name, id) in &path.ancestors {
        node = node.collections.get_mut(name)?.docs.get_mut(id)?;
    }
    node.collections.get_mut(&path.name)
}

fn collection_entry<'a>(root: &'a mut Node, path: &CollectionPath) -> &'a mut Collection {
    let mut node = root;
    for (name, id) in &path.ancestors {
        node = node
            .collections
            .entry(name.clone())
            .or_default()
            .docs
            .entry(id.clone())
            .or_default();
    }
    node.collections.entry(path.name.clone()).or_default()
}

struct Inner {
    root: Mutex<Node>,
    file_path: Option<PathBuf>,
    watchers: Arc<Mutex<Registry>>,
}

/// Document store kept in memory, optionally mirrored to a JSON file after
/// every write. Clones share the same data and watchers.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Inner>,
}

impl LocalStore {
    /// Open (or create) `store.json` under `base_dir`, defaulting to `~/.timetable`.
    pub fn open(base_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let dir = data_dir(base_dir)?;
        let path = dir.join(STORE_FILE_NAME);

        let root = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)
                .with_context(|| format!("Corrupt store file {}", path.display()))?
        } else {
            let root = Node::default();
            write_tree(&path, &root)?;
            root
        };

        debug!(path = %path.display(), "opened local store");
        Ok(Self::with_root(root, Some(path)))
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::with_root(Node::default(), None)
    }

    fn with_root(root: Node, file_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                root: Mutex::new(root),
                file_path,
                watchers: Arc::new(Mutex::new(Registry::default())),
            }),
        }
    }

    /// Number of live watches.
    pub fn watch_count(&self) -> usize {
        self.inner.watchers.lock().len()
    }

    /// Apply `change` to a copy of the tree and swap it in only once the copy
    /// has been written out. A failed write leaves memory as it was.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut Node) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut root = self.inner.root.lock();
        let mut next = root.clone();
        let out = change(&mut next)?;
        if let Some(path) = &self.inner.file_path {
            write_tree(path, &next)?;
        }
        *root = next;
        Ok(out)
    }

    // Called with no lock held: listeners may read the store.
    fn notify(&self, written: &CollectionPath) {
        let affected = self.inner.watchers.lock().affected_by(written);
        for (collection, listener) in affected {
            match self.list(&collection) {
                Ok(docs) => listener(docs),
                Err(e) => error!(collection = %collection, error = %e, "failed to build snapshot"),
            }
        }
    }
}

fn write_tree(path: &Path, root: &Node) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, root)?;
    writer.flush()?;
    Ok(())
}

impl DocumentStore for LocalStore {
    fn add(&self, collection: &CollectionPath, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.commit(|root| {
            collection_entry(root, collection)
                .docs
                .entry(id.clone())
                .or_default()
                .fields = Some(fields);
            Ok(())
        })?;
        debug!(collection = %collection, id = %id, "added document");
        self.notify(collection);
        Ok(id)
    }

    fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let root = self.inner.root.lock();
        let docs = match find_collection(&root, collection) {
            Some(c) => c
                .docs
                .iter()
                .filter_map(|(id, node)| {
                    node.fields.as_ref().map(|fields| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                })
                .collect(),
            None => Vec::new(),
        };
        Ok(docs)
    }

    fn update(&self, document: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.commit(|root| {
            let existing = find_collection_mut(root, &document.collection)
                .and_then(|c| c.docs.get_mut(&document.id))
                .and_then(|node| node.fields.as_mut())
                .ok_or_else(|| StoreError::NotFound(document.to_string()))?;
            existing.extend(fields);
            Ok(())
        })?;
        debug!(document = %document, "updated document");
        self.notify(&document.collection);
        Ok(())
    }

    fn delete(&self, document: &DocumentPath) -> Result<(), StoreError> {
        self.commit(|root| {
            if let Some(collection) = find_collection_mut(root, &document.collection) {
                let prune = match collection.docs.get_mut(&document.id) {
                    Some(node) => {
                        node.fields = None;
                        !node.has_children()
                    }
                    None => false,
                };
                if prune {
                    collection.docs.remove(&document.id);
                }
            }
            Ok(())
        })?;
        debug!(document = %document, "deleted document");
        self.notify(&document.collection);
        Ok(())
    }

    fn watch<F>(&self, collection: &CollectionPath, listener: F) -> Result<Watch, StoreError>
    where
        F: Fn(Vec<Document>) + Send + Sync + 'static,
    {
        let listener = Arc::new(listener);
        let watch =
            Registry::register(&self.inner.watchers, collection.clone(), listener.clone());
        listener(self.list(collection)?);
        Ok(watch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_add_and_list() {
        let store = LocalStore::in_memory();
        let classes = CollectionPath::root("classes");

        let id = store.add(&classes, fields(json!({"name": "Algorithms"}))).unwrap();
        let docs = store.list(&classes).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].fields["name"], "Algorithms");
    }

    #[test]
    fn test_list_missing_collection_is_empty() {
        let store = LocalStore::in_memory();
        let path = CollectionPath::root("classes").doc("nope").collection("attendance");
        assert!(store.list(&path).unwrap().is_empty());
    }

    #[test]
    fn test_update_merges_fields() {
        let store = LocalStore::in_memory();
        let classes = CollectionPath::root("classes");
        let id = store.add(&classes, fields(json!({"name": "A", "day": 1}))).unwrap();

        store.update(&classes.doc(&id), fields(json!({"name": "B"}))).unwrap();

        let docs = store.list(&classes).unwrap();
        assert_eq!(docs[0].fields["name"], "B");
        assert_eq!(docs[0].fields["day"], 1);
    }

    #[test]
    fn test_update_missing_document_fails() {
        let store = LocalStore::in_memory();
        let err = store
            .update(&CollectionPath::root("classes").doc("nope"), Fields::new())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_delete_keeps_subcollections() {
        let store = LocalStore::in_memory();
        let classes = CollectionPath::root("classes");
        let id = store.add(&classes, fields(json!({"name": "A"}))).unwrap();
        let attendance = classes.doc(&id).collection("attendance");
        store.add(&attendance, fields(json!({"date": "2025-09-01"}))).unwrap();

        store.delete(&classes.doc(&id)).unwrap();

        assert!(store.list(&classes).unwrap().is_empty());
        assert_eq!(store.list(&attendance).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_missing_document_is_ok() {
        let store = LocalStore::in_memory();
        assert!(store.delete(&CollectionPath::root("classes").doc("nope")).is_ok());
    }

    #[test]
    fn test_watch_initial_and_nested_writes() {
        let store = LocalStore::in_memory();
        let classes = CollectionPath::root("classes");
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let watch = {
            let calls = calls.clone();
            let seen = seen.clone();
            store
                .watch(&classes, move |docs| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    seen.lock().push(docs.len());
                })
                .unwrap()
        };
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let id = store.add(&classes, fields(json!({"name": "A"}))).unwrap();
        store
            .add(&classes.doc(&id).collection("attendance"), fields(json!({"date": "2025-09-01"})))
            .unwrap();
        store.add(&CollectionPath::root("other"), Fields::new()).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(*seen.lock(), vec![0, 1, 1]);

        drop(watch);
        assert_eq!(store.watch_count(), 0);
        store.add(&classes, fields(json!({"name": "B"}))).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = LocalStore::in_memory();
        let classes = CollectionPath::root("classes");
        let reader = store.clone();
        let totals = Arc::new(Mutex::new(Vec::new()));

        let _watch = {
            let totals = totals.clone();
            let classes_for_listener = classes.clone();
            store
                .watch(&classes, move |_docs| {
                    let n = reader.list(&classes_for_listener).unwrap().len();
                    totals.lock().push(n);
                })
                .unwrap()
        };
        store.add(&classes, Fields::new()).unwrap();

        assert_eq!(*totals.lock(), vec![0, 1]);
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let classes = CollectionPath::root("classes");
        let store = LocalStore::open(Some(dir.path().to_path_buf())).unwrap();
        let id = store.add(&classes, fields(json!({"name": "A"}))).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let _watch = {
            let calls = calls.clone();
            store
                .watch(&classes, move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap()
        };
        std::fs::remove_dir_all(dir.path()).unwrap();

        assert!(store.add(&classes, fields(json!({"name": "B"}))).is_err());
        assert!(store.update(&classes.doc(&id), fields(json!({"name": "C"}))).is_err());
        assert!(store.delete(&classes.doc(&id)).is_err());

        let docs = store.list(&classes).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["name"], "A");
        // Only the initial snapshot.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_open_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let classes = CollectionPath::root("classes");

        let id = {
            let store = LocalStore::open(Some(dir.path().to_path_buf())).unwrap();
            store.add(&classes, fields(json!({"name": "Algorithms"}))).unwrap()
        };

        let store = LocalStore::open(Some(dir.path().to_path_buf())).unwrap();
        let docs = store.list(&classes).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].fields["name"], "Algorithms");
    }
}
