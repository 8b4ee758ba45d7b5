//! Copy-on-write schema registry
//!
//! Readers load an immutable snapshot of `TypeId -> Schema` without taking a
//! lock. On a miss the writer lock is taken, the snapshot is re-checked, the
//! schema is derived and a new snapshot (old entries plus the new one) is
//! published atomically. Readers never observe a partially built schema.
//!
//! Nested record types are derived after their parent is published, outside
//! the writer lock. Field descriptors find nested schemas by type identity, so
//! records that refer to themselves or to each other resolve the same way no
//! matter which type is used first.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::schema::{Record, Schema};

type Snapshot = HashMap<TypeId, Arc<Schema>>;

static GLOBAL_REGISTRY: Lazy<Arc<SchemaRegistry>> = Lazy::new(|| Arc::new(SchemaRegistry::new()));

/// Process-lifetime cache of record schemas, keyed by type identity
pub struct SchemaRegistry {
    snapshot: ArcSwap<Snapshot>,
    writer: Mutex<()>,
}

impl SchemaRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(HashMap::new()),
            writer: Mutex::new(()),
        }
    }

    /// Shared process-wide registry
    pub fn global() -> Arc<SchemaRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Schema of `R`, derived on first use
    ///
    /// Record types reachable through `R`'s fields are derived and published
    /// as well.
    pub fn schema_for<R: Record>(&self) -> Arc<Schema> {
        let type_id = TypeId::of::<R>();
        if let Some(schema) = self.cached(type_id) {
            return schema;
        }

        let schema = {
            let _writer = self.writer.lock();
            if let Some(schema) = self.cached(type_id) {
                return schema;
            }

            let schema = Arc::new(Schema::derive::<R>());
            let current = self.snapshot.load_full();
            let mut next = HashMap::with_capacity(current.len() + 1);
            next.extend(current.iter().map(|(k, v)| (*k, Arc::clone(v))));
            next.insert(type_id, Arc::clone(&schema));
            self.snapshot.store(Arc::new(next));
            schema
        };

        // Already published, so a cycle back to `R` stops at the cache
        for field in schema.fields() {
            field.nested(self);
        }

        schema
    }

    /// Check if the schema of `R` has been published
    pub fn contains<R: Record>(&self) -> bool {
        self.snapshot.load().contains_key(&TypeId::of::<R>())
    }

    /// Number of published schemas
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    /// Check if no schema has been published
    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    fn cached(&self, type_id: TypeId) -> Option<Arc<Schema>> {
        self.snapshot.load().get(&type_id).cloned()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.len())
            .finish()
    }
}
