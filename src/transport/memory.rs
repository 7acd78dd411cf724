//! In-memory engine for tests and local development.
//!
//! Keeps indices, mappings, settings and documents in process. Searches
//! return stored documents in insertion order (no scoring or filtering)
//! unless a canned response is installed. Every call is recorded so tests
//! can assert on call sequences.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::traits::{SearchTransport, TransportError};

#[derive(Debug, Clone, Default)]
struct MemoryIndex {
    properties: Option<Map<String, Value>>,
    settings: Value,
    open: bool,
    docs: IndexMap<String, Value>,
}

pub struct InMemoryTransport {
    indices: DashMap<String, MemoryIndex>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    rejected: Mutex<HashSet<String>>,
    search_response: Mutex<Option<Value>>,
    available: Mutex<bool>,
}

impl InMemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            indices: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            rejected: Mutex::new(HashSet::new()),
            search_response: Mutex::new(None),
            available: Mutex::new(true),
        }
    }

    /// Calls made so far, as `"<operation>:<index>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Make every call of `operation` fail with HTTP 500.
    pub fn fail(&self, operation: &str) {
        self.failing.lock().insert(operation.to_string());
    }

    pub fn recover(&self, operation: &str) {
        self.failing.lock().remove(operation);
    }

    /// Reject bulk index actions for document `id` with HTTP 400.
    pub fn reject_document(&self, id: &str) {
        self.rejected.lock().insert(id.to_string());
    }

    /// Return `response` from every search instead of stored documents.
    pub fn set_search_response(&self, response: Value) {
        *self.search_response.lock() = Some(response);
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }

    /// Install a live mapping as if another process had written it.
    pub fn set_live_properties(&self, index: &str, properties: Map<String, Value>) {
        let mut entry = self.indices.entry(index.to_string()).or_insert_with(|| MemoryIndex {
            open: true,
            ..Default::default()
        });
        entry.properties = Some(properties);
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.indices.contains_key(index)
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.indices.get(index).and_then(|i| i.docs.get(id).cloned())
    }

    pub fn document_count(&self, index: &str) -> usize {
        self.indices.get(index).map(|i| i.docs.len()).unwrap_or(0)
    }

    pub fn properties(&self, index: &str) -> Option<Map<String, Value>> {
        self.indices.get(index).and_then(|i| i.properties.clone())
    }

    pub fn settings(&self, index: &str) -> Option<Value> {
        self.indices.get(index).map(|i| i.settings.clone())
    }

    pub fn is_open(&self, index: &str) -> bool {
        self.indices.get(index).is_some_and(|i| i.open)
    }

    fn record(&self, operation: &str, index: &str) -> Result<(), TransportError> {
        self.calls.lock().push(format!("{operation}:{index}"));
        if !*self.available.lock() {
            return Err(TransportError::Connection("engine unavailable".into()));
        }
        if self.failing.lock().contains(operation) {
            return Err(TransportError::Status {
                status: 500,
                body: format!("{operation} failed"),
            });
        }
        Ok(())
    }

    fn missing(index: &str) -> TransportError {
        TransportError::Status {
            status: 404,
            body: format!("no such index [{index}]"),
        }
    }

    fn with_index<T>(&self, index: &str, f: impl FnOnce(&mut MemoryIndex) -> T) -> Result<T, TransportError> {
        let mut entry = self.indices.get_mut(index).ok_or_else(|| Self::missing(index))?;
        Ok(f(entry.value_mut()))
    }

    fn bulk_line(&self, action: &str, meta: &Value, doc: Option<&Value>) -> Value {
        let id = meta.get("_id").and_then(Value::as_str).unwrap_or_default().to_string();
        let index = meta.get("_index").and_then(Value::as_str).unwrap_or_default().to_string();

        if action == "index" {
            if self.rejected.lock().contains(&id) {
                return json!({"index": {
                    "_index": index, "_id": id, "status": 400,
                    "error": {
                        "type": "mapper_parsing_exception",
                        "reason": "failed to parse",
                        "caused_by": {"type": "illegal_argument_exception", "reason": "bad value"}
                    }
                }});
            }
            let mut entry = self.indices.entry(index.clone()).or_insert_with(|| MemoryIndex {
                open: true,
                ..Default::default()
            });
            let created = entry
                .docs
                .insert(id.clone(), doc.cloned().unwrap_or(Value::Null))
                .is_none();
            let status = if created { 201 } else { 200 };
            return json!({"index": {"_index": index, "_id": id, "status": status}});
        }

        let removed = self
            .indices
            .get_mut(&index)
            .and_then(|mut entry| entry.docs.shift_remove(&id))
            .is_some();
        let (status, result) = if removed { (200, "deleted") } else { (404, "not_found") };
        json!({"delete": {"_index": index, "_id": id, "status": status, "result": result}})
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchTransport for InMemoryTransport {
    async fn index_exists(&self, index: &str) -> Result<bool, TransportError> {
        self.record("exists", index)?;
        Ok(self.indices.contains_key(index))
    }

    async fn create_index(&self, index: &str) -> Result<(), TransportError> {
        self.record("create", index)?;
        if self.indices.contains_key(index) {
            return Err(TransportError::Status {
                status: 400,
                body: format!("resource_already_exists_exception [{index}]"),
            });
        }
        self.indices.insert(
            index.to_string(),
            MemoryIndex {
                open: true,
                settings: json!({}),
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), TransportError> {
        self.record("delete", index)?;
        self.indices
            .remove(index)
            .map(drop)
            .ok_or_else(|| Self::missing(index))
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), TransportError> {
        self.record("put_mapping", index)?;
        let incoming = mapping
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                status: 400,
                body: "mapping without properties".into(),
            })?;
        self.with_index(index, |i| {
            let properties = i.properties.get_or_insert_with(Map::new);
            for (field, property) in incoming {
                properties.insert(field, property);
            }
        })
    }

    async fn get_mapping(&self, index: &str) -> Result<Value, TransportError> {
        self.record("get_mapping", index)?;
        self.with_index(index, |i| {
            let mappings = match &i.properties {
                Some(properties) => json!({"properties": properties}),
                None => json!({}),
            };
            json!({ index: {"mappings": mappings} })
        })
    }

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<(), TransportError> {
        self.record("put_settings", index)?;
        self.with_index(index, |i| {
            if i.open {
                return Err(TransportError::Status {
                    status: 400,
                    body: format!("can't update non dynamic settings for open index [{index}]"),
                });
            }
            i.settings = settings.clone();
            Ok(())
        })?
    }

    async fn close_index(&self, index: &str) -> Result<(), TransportError> {
        self.record("close", index)?;
        self.with_index(index, |i| i.open = false)
    }

    async fn open_index(&self, index: &str) -> Result<(), TransportError> {
        self.record("open", index)?;
        self.with_index(index, |i| i.open = true)
    }

    async fn bulk(&self, lines: &[Value]) -> Result<Value, TransportError> {
        self.record("bulk", "_bulk")?;
        let mut items = Vec::new();
        let mut iter = lines.iter();

        while let Some(line) = iter.next() {
            let Some((action, meta)) = line.as_object().and_then(|m| m.iter().next()) else {
                return Err(TransportError::Status {
                    status: 400,
                    body: "malformed action line".into(),
                });
            };
            let doc = if action == "index" { iter.next() } else { None };
            items.push(self.bulk_line(action, meta, doc));
        }

        let errors = items.iter().any(|item| {
            item.as_object()
                .and_then(|m| m.values().next())
                .is_some_and(|r| r.get("error").is_some())
        });
        Ok(json!({"took": 1, "errors": errors, "items": items}))
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, TransportError> {
        self.record("search", index)?;
        if let Some(response) = self.search_response.lock().clone() {
            return Ok(response);
        }

        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
        self.with_index(index, |i| {
            let hits: Vec<Value> = i
                .docs
                .iter()
                .skip(from)
                .take(size)
                .map(|(id, source)| json!({"_index": index, "_id": id, "_score": 1.0, "_source": source}))
                .collect();
            json!({
                "took": 1,
                "timed_out": false,
                "hits": {"total": {"value": i.docs.len(), "relation": "eq"}, "hits": hits}
            })
        })
    }

    async fn ping(&self) -> Result<bool, TransportError> {
        self.record("ping", "")?;
        Ok(true)
    }
}
