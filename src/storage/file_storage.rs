// 🗂️ FileStorage - in-memory index backed by one JSON document
//
// The index maps `<Kind>.<id>` to the live Entity. save() rewrites the whole
// document; reload() overlays the document onto the index. Only delete()
// persists on its own, new() leaves that to the caller.
//
// All file access in the process goes through FILE_LOCK. Separate processes
// writing the same file are NOT coordinated.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::{storage_key, Storage};
use crate::error::{Result, StorageError};
use crate::models::{Entity, Kind};

static FILE_LOCK: Mutex<()> = Mutex::new(());

fn file_lock() -> MutexGuard<'static, ()> {
    // The guarded value is (), so a poisoned lock carries no broken state
    FILE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct FileStorage {
    file_path: PathBuf,
    objects: HashMap<String, Entity>,
}

impl FileStorage {
    /// Bind an empty engine to `file_path`. Nothing is read until `reload()`.
    pub fn open<P: AsRef<Path>>(file_path: P) -> Self {
        FileStorage {
            file_path: file_path.as_ref().to_path_buf(),
            objects: HashMap::new(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The live index (not a snapshot)
    pub fn objects(&self) -> &HashMap<String, Entity> {
        &self.objects
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Render the index as the durable document (4-space indented JSON)
    fn render(&self) -> Result<Vec<u8>> {
        let document: Map<String, Value> = self
            .objects
            .iter()
            .map(|(key, entity)| (key.clone(), Value::Object(entity.to_dict())))
            .collect();

        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut serializer)?;
        buf.push(b'\n');

        Ok(buf)
    }

    /// Parse a whole document before touching the index, so a bad entry
    /// never leaves a half-loaded store behind.
    fn parse_document(content: &str) -> Result<Vec<(String, Entity)>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: Map<String, Value> = serde_json::from_str(content)?;
        let mut entities = Vec::with_capacity(document.len());

        for (file_key, value) in document {
            let dict = value.as_object().ok_or_else(|| StorageError::CorruptRecord {
                key: file_key.clone(),
                message: "entry is not a JSON object".to_string(),
            })?;

            let entity = Entity::from_dict(dict)?;
            let key = entity.key();
            if key != file_key {
                return Err(StorageError::CorruptRecord {
                    key: file_key,
                    message: format!("entry describes {}", key),
                });
            }

            entities.push((key, entity));
        }

        Ok(entities)
    }
}

impl Storage for FileStorage {
    fn all(&self, kind: Option<Kind>) -> Result<BTreeMap<String, Entity>> {
        Ok(self
            .objects
            .iter()
            .filter(|(_, entity)| kind.map_or(true, |k| entity.kind() == k))
            .map(|(key, entity)| (key.clone(), entity.clone()))
            .collect())
    }

    fn new(&mut self, entity: Entity) {
        self.objects.insert(entity.key(), entity);
    }

    fn save(&mut self) -> Result<()> {
        let bytes = self.render()?;
        let temp_path = self.temp_path();

        let _guard = file_lock();
        let written = fs::write(&temp_path, &bytes).and_then(|()| fs::rename(&temp_path, &self.file_path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                debug!("could not remove {:?}: {}", temp_path, cleanup);
            }
            return Err(e.into());
        }

        debug!("saved {} objects to {:?}", self.objects.len(), self.file_path);
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        let content = {
            let _guard = file_lock();
            fs::read_to_string(&self.file_path)
        };

        let content = match content {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{:?} does not exist yet, starting with an empty store", self.file_path);
                return Ok(());
            }
            Err(e) => {
                warn!("could not read {:?} ({}), starting with an empty store", self.file_path, e);
                return Ok(());
            }
        };

        let entities = Self::parse_document(&content)?;
        let loaded = entities.len();
        self.objects.extend(entities);

        info!("loaded {} objects from {:?}", loaded, self.file_path);
        Ok(())
    }

    fn delete(&mut self, entity: &Entity) -> Result<bool> {
        if self.objects.remove(&entity.key()).is_none() {
            return Ok(false);
        }

        self.save()?;
        Ok(true)
    }

    fn get(&self, kind: Option<Kind>, id: Option<&str>) -> Result<Option<Entity>> {
        let (Some(kind), Some(id)) = (kind, id) else {
            return Ok(None);
        };

        Ok(self.objects.get(&storage_key(kind, id)).cloned())
    }

    fn count(&self, kind: Option<Kind>) -> Result<usize> {
        Ok(match kind {
            None => self.objects.len(),
            Some(k) => self.objects.values().filter(|entity| entity.kind() == k).count(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
