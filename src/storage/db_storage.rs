// 🗄️ DbStorage - SQLite backend
//
// One row per entity in `objects`, the serialized dictionary stored as JSON
// text. new() stages entities in memory the way an ORM session does; save()
// commits the staged set in one SQLite transaction. Reads see staged and
// committed rows alike.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::{storage_key, Storage};
use crate::error::{Result, StorageError};
use crate::models::{Entity, Kind};

pub struct DbStorage {
    conn: Connection,
    pending: BTreeMap<String, Entity>,
}

impl DbStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        info!("opened database {:?}", path.as_ref());
        Ok(Self::with_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::with_connection(Connection::open_in_memory()?))
    }

    fn with_connection(conn: Connection) -> Self {
        DbStorage {
            conn,
            pending: BTreeMap::new(),
        }
    }

    /// Entities staged by `new()` and not yet saved
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn decode(key: &str, data: &str) -> Result<Entity> {
        let dict: Map<String, Value> = serde_json::from_str(data).map_err(|e| StorageError::CorruptRecord {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Entity::from_dict(&dict)
    }
}

/// Create the schema if needed
pub fn setup_schema(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (ignored by in-memory databases)
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS objects (
            key TEXT PRIMARY KEY,
            class TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_objects_class ON objects(class)", [])?;

    Ok(())
}

impl Storage for DbStorage {
    fn all(&self, kind: Option<Kind>) -> Result<BTreeMap<String, Entity>> {
        let mut objects = BTreeMap::new();

        let rows: Vec<(String, String)> = match kind {
            Some(k) => {
                let mut stmt = self.conn.prepare("SELECT key, data FROM objects WHERE class = ?1")?;
                let rows: Vec<(String, String)> = stmt
                    .query_map(params![k.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare("SELECT key, data FROM objects")?;
                let rows: Vec<(String, String)> = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        for (key, data) in rows {
            let entity = Self::decode(&key, &data)?;
            objects.insert(key, entity);
        }

        // Staged values shadow committed rows
        for (key, entity) in &self.pending {
            if kind.map_or(true, |k| entity.kind() == k) {
                objects.insert(key.clone(), entity.clone());
            }
        }

        Ok(objects)
    }

    fn new(&mut self, entity: Entity) {
        self.pending.insert(entity.key(), entity);
    }

    fn save(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO objects (key, class, id, data) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET data = excluded.data",
            )?;

            for (key, entity) in &self.pending {
                let data = serde_json::to_string(&entity.to_dict())?;
                stmt.execute(params![key, entity.kind().as_str(), entity.id(), data])?;
            }
        }
        tx.commit()?;

        debug!("committed {} staged objects", self.pending.len());
        self.pending.clear();
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        setup_schema(&self.conn)?;
        self.pending.clear();
        Ok(())
    }

    fn delete(&mut self, entity: &Entity) -> Result<bool> {
        let key = entity.key();
        let staged = self.pending.remove(&key).is_some();
        let deleted = self.conn.execute("DELETE FROM objects WHERE key = ?1", params![key])?;

        Ok(staged || deleted > 0)
    }

    fn get(&self, kind: Option<Kind>, id: Option<&str>) -> Result<Option<Entity>> {
        let (Some(kind), Some(id)) = (kind, id) else {
            return Ok(None);
        };
        let key = storage_key(kind, id);

        if let Some(entity) = self.pending.get(&key) {
            return Ok(Some(entity.clone()));
        }

        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM objects WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;

        data.map(|data| Self::decode(&key, &data)).transpose()
    }

    fn close(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, State};
    use serde_json::json;

    fn test_storage() -> DbStorage {
        let mut storage = DbStorage::open_in_memory().unwrap();
        storage.reload().unwrap();
        storage
    }

    #[test]
    fn test_empty_database() {
        let storage = test_storage();
        assert_eq!(storage.count(None).unwrap(), 0);
    }

    #[test]
    fn test_staged_entities_are_visible_before_save() {
        let mut storage = test_storage();
        let state = Entity::new(State { name: "Ohio".to_string() });
        storage.new(state.clone());

        assert_eq!(storage.pending_count(), 1);
        assert_eq!(storage.get(Some(Kind::State), Some(state.id())).unwrap(), Some(state));
        assert_eq!(storage.count(Some(Kind::State)).unwrap(), 1);
    }

    #[test]
    fn test_save_commits_and_close_discards_unsaved() {
        let mut storage = test_storage();
        let saved = Entity::of_kind(Kind::Amenity);
        let unsaved = Entity::of_kind(Kind::Amenity);

        storage.new(saved.clone());
        storage.save().unwrap();
        storage.new(unsaved.clone());
        storage.close().unwrap();

        assert_eq!(storage.pending_count(), 0);
        assert_eq!(storage.get(Some(Kind::Amenity), Some(saved.id())).unwrap(), Some(saved));
        assert_eq!(storage.get(Some(Kind::Amenity), Some(unsaved.id())).unwrap(), None);
    }

    #[test]
    fn test_save_upserts_existing_rows() {
        let mut storage = test_storage();
        let mut state = Entity::new(State { name: "Maine".to_string() });
        storage.new(state.clone());
        storage.save().unwrap();

        state.apply_update("name", &json!("Vermont")).unwrap();
        state.save(&mut storage).unwrap();

        assert_eq!(storage.count(None).unwrap(), 1);
        let stored = storage.get(Some(Kind::State), Some(state.id())).unwrap().unwrap();
        assert_eq!(stored.attribute("name"), Some(json!("Vermont")));
        assert_eq!(stored, state);
    }

    #[test]
    fn test_all_filters_by_kind() {
        let mut storage = test_storage();
        storage.new(Entity::of_kind(Kind::State));
        storage.new(Entity::new(City {
            state_id: "s".to_string(),
            name: "Dayton".to_string(),
        }));
        storage.save().unwrap();
        storage.new(Entity::of_kind(Kind::City));

        assert_eq!(storage.all(Some(Kind::City)).unwrap().len(), 2);
        assert_eq!(storage.all(Some(Kind::State)).unwrap().len(), 1);
        assert_eq!(storage.all(None).unwrap().len(), 3);
        assert_eq!(storage.related(Kind::City, "state_id", "s").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_committed_and_staged() {
        let mut storage = test_storage();
        let committed = Entity::of_kind(Kind::User);
        let staged = Entity::of_kind(Kind::User);
        storage.new(committed.clone());
        storage.save().unwrap();
        storage.new(staged.clone());

        assert!(storage.delete(&committed).unwrap());
        assert!(storage.delete(&staged).unwrap());
        assert!(!storage.delete(&staged).unwrap());
        assert_eq!(storage.count(None).unwrap(), 0);
    }

    #[test]
    fn test_round_trip_through_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let originals: Vec<Entity> = Kind::ALL.iter().map(|k| Entity::of_kind(*k)).collect();

        {
            let mut storage = DbStorage::open(&path).unwrap();
            storage.reload().unwrap();
            for entity in &originals {
                storage.new(entity.clone());
            }
            storage.save().unwrap();
        }

        let mut storage = DbStorage::open(&path).unwrap();
        storage.reload().unwrap();
        assert_eq!(storage.count(None).unwrap(), originals.len());
        for entity in &originals {
            let back = storage.get(Some(entity.kind()), Some(entity.id())).unwrap().unwrap();
            assert_eq!(back.to_dict(), entity.to_dict());
        }
    }
}
