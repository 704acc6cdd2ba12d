// Storage Engine - the persistence seam
//
// One trait, two backends:
// - FileStorage: in-memory index flushed to a single JSON document
// - DbStorage: SQLite table with a pending set staged until save()
//
// Callers construct an instance, reload() it once, then operate on it; there
// is no process-wide singleton.

pub mod db_storage;
pub mod file_storage;

pub use db_storage::DbStorage;
pub use file_storage::FileStorage;

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{Entity, Kind};

/// Composite index key: `<Kind>.<id>`
pub fn storage_key(kind: Kind, id: &str) -> String {
    format!("{}.{}", kind, id)
}

pub trait Storage: Send {
    /// Every entity, or only those of `kind`, keyed by composite key
    fn all(&self, kind: Option<Kind>) -> Result<BTreeMap<String, Entity>>;

    /// Register `entity` under its composite key. Does not persist.
    fn new(&mut self, entity: Entity);

    /// Persist everything registered so far
    fn save(&mut self) -> Result<()>;

    /// Load persisted entities into the index
    fn reload(&mut self) -> Result<()>;

    /// Remove `entity` and persist immediately. Returns whether it was present.
    fn delete(&mut self, entity: &Entity) -> Result<bool>;

    /// Entity at `<kind>.<id>`; absence when either part is missing
    fn get(&self, kind: Option<Kind>, id: Option<&str>) -> Result<Option<Entity>>;

    /// Test-isolation hook: read the persisted store again
    fn close(&mut self) -> Result<()> {
        self.reload()
    }

    fn count(&self, kind: Option<Kind>) -> Result<usize> {
        Ok(self.all(kind)?.len())
    }

    /// Like `all`, filtering by kind name. An unrecognised name matches nothing.
    fn all_named(&self, name: &str) -> Result<BTreeMap<String, Entity>> {
        match name.parse::<Kind>() {
            Ok(kind) => self.all(Some(kind)),
            Err(_) => Ok(BTreeMap::new()),
        }
    }

    fn count_named(&self, name: &str) -> Result<usize> {
        Ok(self.all_named(name)?.len())
    }

    /// Entities of `kind` whose string attribute `field` equals `value`
    /// (cities of a state, places of a city, reviews of a place)
    fn related(&self, kind: Kind, field: &str, value: &str) -> Result<Vec<Entity>> {
        Ok(self
            .all(Some(kind))?
            .into_values()
            .filter(|entity| entity.attribute(field).as_ref().and_then(Value::as_str) == Some(value))
            .collect())
    }
}
