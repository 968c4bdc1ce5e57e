//! In-memory hierarchical database
//!
//! Mirrors the remote store's semantics closely enough for the ban
//! subsystem: writing `null` removes a node, emptied parents disappear,
//! and `update` merges one level of keys.

use async_lock::RwLock;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use warden_core::{LookupError, RemoteDatabase};

/// In-memory JSON tree implementing [`RemoteDatabase`]
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    root: Arc<RwLock<Value>>,
}

impl MemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
        }
    }

    /// Full tree, for assertions
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, segment| node.get(*segment))
}

/// Write `value` at `path`, creating parents; `Null` removes the node
fn place(node: &mut Value, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() {
        if value.is_null() {
            map.remove(*head);
        } else {
            map.insert((*head).to_string(), value);
        }
        return;
    }
    if value.is_null() && !map.contains_key(*head) {
        return;
    }
    let child = map
        .entry((*head).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    place(child, rest, value);
    if child.as_object().is_some_and(Map::is_empty) {
        map.remove(*head);
    }
}

#[async_trait(?Send)]
impl RemoteDatabase for MemoryDatabase {
    async fn get(&self, path: &str) -> Result<Option<Value>, LookupError> {
        let root = self.root.read().await;
        let segs = segments(path);
        Ok(lookup(&root, &segs).filter(|v| !v.is_null()).cloned())
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), LookupError> {
        let mut root = self.root.write().await;
        place(&mut root, &segments(path), value.clone());
        Ok(())
    }

    async fn update(&self, path: &str, patch: &Value) -> Result<(), LookupError> {
        let Value::Object(fields) = patch else {
            return Err(LookupError::decode(path, "update expects a JSON object"));
        };
        let mut root = self.root.write().await;
        let base = segments(path);
        for (key, value) in fields {
            let mut target = base.clone();
            target.extend(segments(key));
            place(&mut root, &target, value.clone());
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), LookupError> {
        let mut root = self.root.write().await;
        let segs = segments(path);
        if segs.is_empty() {
            *root = Value::Object(Map::new());
        } else {
            place(&mut root, &segs, Value::Null);
        }
        Ok(())
    }
}
