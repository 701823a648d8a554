//! Reverse mapping for encrypted fields
//!
//! [`ReversibleStore`] remembers, per field, which original value produced
//! each masked token. The engine only writes to it; operators export it to
//! reverse a masked table by hand.
//!
//! Each field's map has its own lock, so concurrent masking runs that share a
//! store serialize per field and never interleave writes to the same map.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

type FieldMap = IndexMap<String, String>;

/// Field → (masked value → original value)
#[derive(Debug, Default)]
pub struct ReversibleStore {
    fields: RwLock<IndexMap<String, Arc<Mutex<FieldMap>>>>,
    collisions: AtomicU64,
}

impl ReversibleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `masked` was produced from `original` in `field`
    ///
    /// An existing entry for the same masked value is overwritten and the
    /// collision is counted.
    pub fn record(&self, field: &str, masked: impl Into<String>, original: impl Into<String>) {
        let slot = self.slot(field);
        let mut entries = lock(&slot);
        self.insert_entry(field, &mut entries, masked.into(), original.into());
    }

    /// Record a batch of `(masked, original)` entries for one field under a
    /// single lock acquisition
    pub fn commit(&self, field: &str, entries: Vec<(String, String)>) {
        if entries.is_empty() {
            return;
        }
        let slot = self.slot(field);
        let mut map = lock(&slot);
        for (masked, original) in entries {
            self.insert_entry(field, &mut map, masked, original);
        }
    }

    /// Original value for a masked value
    pub fn get(&self, field: &str, masked: &str) -> Option<String> {
        let slot = self.existing_slot(field)?;
        let entries = lock(&slot);
        entries.get(masked).cloned()
    }

    /// Snapshot of one field's entries
    pub fn field(&self, field: &str) -> Option<IndexMap<String, String>> {
        let slot = self.existing_slot(field)?;
        let entries = lock(&slot);
        Some(entries.clone())
    }

    /// Fields with at least one recorded entry, in first-write order
    pub fn fields(&self) -> Vec<String> {
        self.read_registry().keys().cloned().collect()
    }

    /// Total number of entries across all fields
    pub fn len(&self) -> usize {
        self.read_registry()
            .values()
            .map(|slot| lock(slot).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of overwritten entries since creation or the last clear
    pub fn collisions(&self) -> u64 {
        self.collisions.load(Ordering::Relaxed)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.fields
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.collisions.store(0, Ordering::Relaxed);
    }

    /// Export as `{"field": {"masked": "original", ...}, ...}`
    pub fn export(&self) -> Value {
        let registry = self.read_registry();
        let mut document = Map::with_capacity(registry.len());
        for (field, slot) in registry.iter() {
            let entries = lock(slot);
            let inner: Map<String, Value> = entries
                .iter()
                .map(|(masked, original)| (masked.clone(), Value::String(original.clone())))
                .collect();
            document.insert(field.clone(), Value::Object(inner));
        }
        Value::Object(document)
    }

    /// Write the export document to `path` as pretty-printed JSON
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.export())?;
        std::fs::write(path, json)?;
        tracing::info!(
            path = %path.display(),
            fields = self.fields().len(),
            entries = self.len(),
            "Exported reverse mapping"
        );
        Ok(())
    }

    fn insert_entry(&self, field: &str, map: &mut FieldMap, masked: String, original: String) {
        if map.insert(masked, original).is_some() {
            self.collisions.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(field = field, "Masked value collision, previous original replaced");
        }
    }

    fn slot(&self, field: &str) -> Arc<Mutex<FieldMap>> {
        if let Some(slot) = self.existing_slot(field) {
            return slot;
        }
        let mut registry = self
            .fields
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(registry.entry(field.to_string()).or_default())
    }

    fn existing_slot(&self, field: &str) -> Option<Arc<Mutex<FieldMap>>> {
        self.read_registry().get(field).map(Arc::clone)
    }

    fn read_registry(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, IndexMap<String, Arc<Mutex<FieldMap>>>> {
        self.fields.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock(slot: &Mutex<FieldMap>) -> MutexGuard<'_, FieldMap> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
