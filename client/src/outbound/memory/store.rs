//! In-memory data store fake.
//!
//! Holds one JSON tree behind a mutex. Push keys are generated from a
//! monotonic counter so they sort in insertion order, mirroring the hosted
//! store's time-ordered keys. Read failures can be injected per path to
//! exercise partial-failure handling.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::ports::{DataStore, DataStoreError};

#[derive(Default)]
struct Inner {
    root: Map<String, Value>,
    next_key: u64,
    failing_reads: HashSet<String>,
}

/// Deterministic in-memory implementation of [`DataStore`].
#[derive(Default)]
pub struct MemoryDataStore {
    inner: Mutex<Inner>,
}

impl MemoryDataStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read of exactly `path` fail.
    pub fn fail_reads_at(&self, path: &str) {
        let mut guard = self.lock();
        guard.failing_reads.insert(path.to_owned());
    }

    /// Clear all injected read failures.
    pub fn clear_read_failures(&self) {
        let mut guard = self.lock();
        guard.failing_reads.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn get_node<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('/');
    let first = segments.next()?;
    let mut node = root.get(first)?;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

fn set_node(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('/').collect();
    let Some(last) = segments.pop() else {
        return;
    };
    let mut node = root;
    for segment in segments {
        let child = node
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            // Writing below a scalar replaces it, as the hosted store does.
            *child = Value::Object(Map::new());
        }
        let Value::Object(map) = child else { return };
        node = map;
    }
    node.insert(last.to_owned(), value);
}

fn remove_node(root: &mut Map<String, Value>, path: &str) {
    let mut segments: Vec<&str> = path.split('/').collect();
    let Some(last) = segments.pop() else {
        return;
    };
    let mut node = root;
    for segment in segments {
        let Some(child) = node.get_mut(segment).and_then(Value::as_object_mut) else {
            return;
        };
        node = child;
    }
    node.remove(last);
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, DataStoreError> {
        let guard = self.lock();
        if guard.failing_reads.contains(path) {
            return Err(DataStoreError::transport(format!(
                "injected read failure at {path}"
            )));
        }
        Ok(get_node(&guard.root, path).cloned())
    }

    async fn read_matching(
        &self,
        path: &str,
        child_field: &str,
        value: &str,
    ) -> Result<Option<Value>, DataStoreError> {
        let guard = self.lock();
        if guard.failing_reads.contains(path) {
            return Err(DataStoreError::transport(format!(
                "injected read failure at {path}"
            )));
        }
        let Some(children) = get_node(&guard.root, path).and_then(Value::as_object) else {
            return Ok(None);
        };
        let matching: Map<String, Value> = children
            .iter()
            .filter(|(_, child)| {
                child.get(child_field).and_then(Value::as_str) == Some(value)
            })
            .map(|(key, child)| (key.clone(), child.clone()))
            .collect();
        Ok(if matching.is_empty() {
            None
        } else {
            Some(Value::Object(matching))
        })
    }

    async fn push(&self, path: &str, record: Value) -> Result<String, DataStoreError> {
        let mut guard = self.lock();
        let key = format!("-K{:06}", guard.next_key);
        guard.next_key += 1;
        set_node(&mut guard.root, &format!("{path}/{key}"), record);
        Ok(key)
    }

    async fn write(&self, path: &str, record: Value) -> Result<(), DataStoreError> {
        let mut guard = self.lock();
        set_node(&mut guard.root, path, record);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), DataStoreError> {
        let mut guard = self.lock();
        remove_node(&mut guard.root, path);
        Ok(())
    }
}
