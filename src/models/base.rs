// 🪪 Entity - identity envelope shared by every kind
//
// "Identity persists, values change": the id is assigned once and never
// rewritten; created_at is fixed at construction; updated_at moves on every
// persist.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use super::{Attributes, FieldError, Kind, SERVER_FIELDS};
use crate::error::{Result, StorageError};
use crate::storage::Storage;

/// Fixed textual timestamp format of the durable file (microsecond precision)
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Discriminator naming the concrete kind in a serialized dictionary
pub const CLASS_FIELD: &str = "__class__";

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// Parse a timestamp written by `format_timestamp`. Fractional digits are
/// optional so hand-edited files still load.
pub fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
}

// Truncated to what the durable format can hold, so a reload compares equal
fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

// ============================================================================
// ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    // ========================================================================
    // IDENTITY (never changes)
    // ========================================================================
    id: String,
    created_at: NaiveDateTime,

    // ========================================================================
    // VALUES
    // ========================================================================
    pub updated_at: NaiveDateTime,
    pub attributes: Attributes,

    /// Stored keys the typed attributes cannot hold, written back unchanged
    extra: Map<String, Value>,
}

impl Entity {
    /// Create a fresh entity with a new UUID and both timestamps set to now
    pub fn new(attributes: impl Into<Attributes>) -> Self {
        let now = now();

        Entity {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            attributes: attributes.into(),
            extra: Map::new(),
        }
    }

    /// Fresh entity of `kind` with default attributes
    pub fn of_kind(kind: Kind) -> Self {
        Self::new(Attributes::default_for(kind))
    }

    /// Build a fresh entity from a client-supplied body.
    ///
    /// Mutable and create-only fields are assigned; server-controlled and
    /// unknown keys are skipped. A value of the wrong type is an error.
    pub fn from_request(kind: Kind, data: &Map<String, Value>) -> std::result::Result<Self, FieldError> {
        let mut entity = Self::of_kind(kind);

        for (field, value) in data {
            match entity.assign(field, value, true) {
                Ok(()) => {}
                Err(e) if e.is_rejection() => debug!("skipping `{}` on new {}: {}", field, kind, e),
                Err(e) => return Err(e),
            }
        }

        Ok(entity)
    }

    /// Rebuild an entity from its persisted dictionary.
    ///
    /// Restores id, timestamps and every other attribute verbatim, dispatching
    /// on `__class__`. Never registers into a storage index; reload does that
    /// itself.
    pub fn from_dict(dict: &Map<String, Value>) -> Result<Self> {
        let class = required_str(dict, CLASS_FIELD)?;
        let kind: Kind = class.parse()?;

        let id = required_str(dict, "id")?.to_string();
        let created_at = required_timestamp(dict, &id, "created_at")?;
        let updated_at = required_timestamp(dict, &id, "updated_at")?;

        let (attributes, extra) = Attributes::from_dict(kind, dict);

        Ok(Entity {
            id,
            created_at,
            updated_at,
            attributes,
            extra,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn kind(&self) -> Kind {
        self.attributes.kind()
    }

    /// Composite storage key: `<Kind>.<id>`
    pub fn key(&self) -> String {
        format!("{}.{}", self.kind(), self.id)
    }

    /// Serialized form: public attributes + `__class__`, fixed-format timestamps
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut dict = self.attributes.to_map();
        // A stored value that did not fit its field wins over the default
        dict.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        dict.insert(CLASS_FIELD.to_string(), Value::String(self.kind().to_string()));
        dict.insert("id".to_string(), Value::String(self.id.clone()));
        dict.insert("created_at".to_string(), Value::String(format_timestamp(&self.created_at)));
        dict.insert("updated_at".to_string(), Value::String(format_timestamp(&self.updated_at)));

        dict
    }

    /// Stored keys outside the kind's typed attributes
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Value of one attribute as it appears in `to_dict()`
    pub fn attribute(&self, field: &str) -> Option<Value> {
        self.to_dict().remove(field)
    }

    /// Refresh `updated_at` without persisting
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// Change one client-writable field, checked against the kind's allow-list
    pub fn apply_update(&mut self, field: &str, value: &Value) -> std::result::Result<(), FieldError> {
        self.assign(field, value, false)
    }

    fn assign(&mut self, field: &str, value: &Value, creating: bool) -> std::result::Result<(), FieldError> {
        let kind = self.kind();

        if SERVER_FIELDS.contains(&field) || field == CLASS_FIELD {
            return Err(FieldError::ReadOnly(field.to_string()));
        }

        if kind.create_only_fields().contains(&field) {
            if !creating {
                return Err(FieldError::ReadOnly(field.to_string()));
            }
        } else if !kind.mutable_fields().contains(&field) {
            return Err(FieldError::Unknown {
                kind,
                field: field.to_string(),
            });
        }

        self.attributes.set_field(field, value)?;
        self.extra.remove(field);
        Ok(())
    }

    /// Stamp `updated_at`, register the current value and persist the store
    pub fn save(&mut self, storage: &mut dyn Storage) -> Result<()> {
        self.touch();
        storage.new(self.clone());
        storage.save()
    }

    /// Remove from the store and persist
    pub fn delete(&self, storage: &mut dyn Storage) -> Result<bool> {
        storage.delete(self)
    }
}

fn required_str<'a>(dict: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    dict.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| StorageError::CorruptRecord {
            key: dict
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>")
                .to_string(),
            message: format!("missing string field `{}`", field),
        })
}

fn required_timestamp(dict: &Map<String, Value>, id: &str, field: &str) -> Result<NaiveDateTime> {
    let raw = required_str(dict, field)?;

    parse_timestamp(raw).map_err(|e| StorageError::CorruptRecord {
        key: id.to_string(),
        message: format!("`{}` is not a timestamp ({}): {}", field, raw, e),
    })
}

// ============================================================================
// TESTS
// ============================================================================
