// Entity Models - the catalog's domain objects
//
// Every entity shares the same identity envelope (id, created_at, updated_at,
// see base.rs) and carries one kind-specific attribute struct. The kind name
// doubles as the `__class__` discriminator in the durable file.

pub mod amenity;
pub mod base;
pub mod city;
pub mod place;
pub mod review;
pub mod state;
pub mod user;

pub use amenity::Amenity;
pub use base::{format_timestamp, parse_timestamp, Entity, CLASS_FIELD, TIME_FORMAT};
pub use city::City;
pub use place::Place;
pub use review::Review;
pub use state::State;
pub use user::User;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::StorageError;

/// Fields owned by the server; no client may ever write them.
pub const SERVER_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

// ============================================================================
// KIND (the discriminator)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    BaseModel,
    State,
    City,
    Amenity,
    Place,
    Review,
    User,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::BaseModel,
        Kind::State,
        Kind::City,
        Kind::Amenity,
        Kind::Place,
        Kind::Review,
        Kind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::BaseModel => "BaseModel",
            Kind::State => "State",
            Kind::City => "City",
            Kind::Amenity => "Amenity",
            Kind::Place => "Place",
            Kind::Review => "Review",
            Kind::User => "User",
        }
    }

    /// Fields a client may change after creation
    pub fn mutable_fields(&self) -> &'static [&'static str] {
        match self {
            Kind::BaseModel => &[],
            Kind::State => State::MUTABLE_FIELDS,
            Kind::City => City::MUTABLE_FIELDS,
            Kind::Amenity => Amenity::MUTABLE_FIELDS,
            Kind::Place => Place::MUTABLE_FIELDS,
            Kind::Review => Review::MUTABLE_FIELDS,
            Kind::User => User::MUTABLE_FIELDS,
        }
    }

    /// Fields a client sets once, when the entity is created
    pub fn create_only_fields(&self) -> &'static [&'static str] {
        match self {
            Kind::BaseModel => &[],
            Kind::State => State::CREATE_ONLY_FIELDS,
            Kind::City => City::CREATE_ONLY_FIELDS,
            Kind::Amenity => Amenity::CREATE_ONLY_FIELDS,
            Kind::Place => Place::CREATE_ONLY_FIELDS,
            Kind::Review => Review::CREATE_ONLY_FIELDS,
            Kind::User => User::CREATE_ONLY_FIELDS,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StorageError::UnknownKind(s.to_string()))
    }
}

// ============================================================================
// FIELD ERRORS
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("field `{0}` is read-only")]
    ReadOnly(String),

    #[error("{kind} has no field `{field}`")]
    Unknown { kind: Kind, field: String },

    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },
}

impl FieldError {
    /// Read-only and unknown fields are skipped by callers; only a bad value
    /// is worth reporting back.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, FieldError::InvalidValue { .. })
    }
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// Attribute set of one entity kind.
///
/// Attribute structs use `#[serde(default)]` so a partial dictionary hydrates
/// with the kind's defaults. Keys outside the struct are carried by the
/// owning `Entity`, not by the struct.
pub trait Model: Serialize + DeserializeOwned + Default + Clone {
    const KIND: Kind;
    const MUTABLE_FIELDS: &'static [&'static str];
    const CREATE_ONLY_FIELDS: &'static [&'static str] = &[];

    /// Assign one attribute, type-checked through the struct's serde schema.
    fn set_field(&mut self, field: &str, value: &Value) -> Result<(), FieldError> {
        let mut map = match serde_json::to_value(&*self) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => Map::new(),
        };
        map.insert(field.to_string(), value.clone());

        *self = serde_json::from_value(Value::Object(map)).map_err(|e| FieldError::InvalidValue {
            field: field.to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }
}

// ============================================================================
// ATTRIBUTES (tagged variant per kind)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Attributes {
    BaseModel,
    State(State),
    City(City),
    Amenity(Amenity),
    Place(Place),
    Review(Review),
    User(User),
}

impl Attributes {
    /// Default attributes for a kind
    pub fn default_for(kind: Kind) -> Self {
        match kind {
            Kind::BaseModel => Attributes::BaseModel,
            Kind::State => Attributes::State(State::default()),
            Kind::City => Attributes::City(City::default()),
            Kind::Amenity => Attributes::Amenity(Amenity::default()),
            Kind::Place => Attributes::Place(Place::default()),
            Kind::Review => Attributes::Review(Review::default()),
            Kind::User => Attributes::User(User::default()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Attributes::BaseModel => Kind::BaseModel,
            Attributes::State(_) => Kind::State,
            Attributes::City(_) => Kind::City,
            Attributes::Amenity(_) => Kind::Amenity,
            Attributes::Place(_) => Kind::Place,
            Attributes::Review(_) => Kind::Review,
            Attributes::User(_) => Kind::User,
        }
    }

    /// Reconstruction dispatch table: kind → typed hydration.
    ///
    /// Returns the typed attributes plus every key the struct could not take:
    /// keys outside the kind's schema and values of the wrong type. Callers
    /// keep the leftovers so a reload never loses stored data.
    pub fn from_dict(kind: Kind, dict: &Map<String, Value>) -> (Self, Map<String, Value>) {
        let mut attributes = Self::default_for(kind);
        let known = attributes.to_map();
        let mut extra = Map::new();

        for (field, value) in dict {
            if SERVER_FIELDS.contains(&field.as_str()) || field == CLASS_FIELD {
                continue;
            }

            if !known.contains_key(field) {
                extra.insert(field.clone(), value.clone());
                continue;
            }

            if let Err(e) = attributes.set_field(field, value) {
                warn!("keeping `{}` of {} as stored: {}", field, kind, e);
                extra.insert(field.clone(), value.clone());
            }
        }

        (attributes, extra)
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match self {
            Attributes::BaseModel => Map::new(),
            Attributes::State(m) => object_of(m),
            Attributes::City(m) => object_of(m),
            Attributes::Amenity(m) => object_of(m),
            Attributes::Place(m) => object_of(m),
            Attributes::Review(m) => object_of(m),
            Attributes::User(m) => object_of(m),
        }
    }

    pub(crate) fn set_field(&mut self, field: &str, value: &Value) -> Result<(), FieldError> {
        match self {
            Attributes::BaseModel => Err(FieldError::Unknown {
                kind: Kind::BaseModel,
                field: field.to_string(),
            }),
            Attributes::State(m) => m.set_field(field, value),
            Attributes::City(m) => m.set_field(field, value),
            Attributes::Amenity(m) => m.set_field(field, value),
            Attributes::Place(m) => m.set_field(field, value),
            Attributes::Review(m) => m.set_field(field, value),
            Attributes::User(m) => m.set_field(field, value),
        }
    }
}

fn object_of<M: Model>(model: &M) -> Map<String, Value> {
    match serde_json::to_value(model) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            error!("{} attributes serialized to a non-object: {}", M::KIND, other);
            Map::new()
        }
        Err(e) => {
            error!("{} attributes did not serialize: {}", M::KIND, e);
            Map::new()
        }
    }
}

impl From<State> for Attributes {
    fn from(m: State) -> Self {
        Attributes::State(m)
    }
}

impl From<City> for Attributes {
    fn from(m: City) -> Self {
        Attributes::City(m)
    }
}

impl From<Amenity> for Attributes {
    fn from(m: Amenity) -> Self {
        Attributes::Amenity(m)
    }
}

impl From<Place> for Attributes {
    fn from(m: Place) -> Self {
        Attributes::Place(m)
    }
}

impl From<Review> for Attributes {
    fn from(m: Review) -> Self {
        Attributes::Review(m)
    }
}

impl From<User> for Attributes {
    fn from(m: User) -> Self {
        Attributes::User(m)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trips_through_its_name() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_unknown_kind_name_is_an_error() {
        let err = "Castle".parse::<Kind>().unwrap_err();
        assert!(matches!(err, StorageError::UnknownKind(ref name) if name == "Castle"));

        // Names are case-sensitive, like the discriminator itself
        assert!("state".parse::<Kind>().is_err());
    }

    #[test]
    fn test_dispatch_table_covers_every_kind() {
        for kind in Kind::ALL {
            let (attrs, extra) = Attributes::from_dict(kind, &Map::new());
            assert_eq!(attrs.kind(), kind);
            assert_eq!(attrs, Attributes::default_for(kind));
            assert!(extra.is_empty());
        }
    }

    #[test]
    fn test_from_dict_returns_what_the_struct_cannot_hold() {
        let dict = json!({
            "__class__": "Place",
            "id": "p-1",
            "name": "Cabin",
            "number_rooms": "3",
            "latitude": null,
            "longitude": 12.5,
            "pets_allowed": true
        });

        let (attrs, extra) = Attributes::from_dict(Kind::Place, dict.as_object().unwrap());
        let Attributes::Place(place) = attrs else {
            panic!("expected Place attributes");
        };

        assert_eq!(place.name, "Cabin");
        assert_eq!(place.longitude, 12.5);
        assert_eq!(place.number_rooms, 0);
        assert_eq!(place.latitude, 0.0);

        assert_eq!(extra.len(), 3);
        assert_eq!(extra["number_rooms"], json!("3"));
        assert_eq!(extra["latitude"], Value::Null);
        assert_eq!(extra["pets_allowed"], json!(true));
    }

    #[test]
    fn test_set_field_type_checks_value() {
        let mut place = Place::default();

        place.set_field("number_rooms", &json!(3)).unwrap();
        assert_eq!(place.number_rooms, 3);

        let err = place.set_field("number_rooms", &json!("three")).unwrap_err();
        assert!(matches!(err, FieldError::InvalidValue { ref field, .. } if field == "number_rooms"));
        // A failed assignment leaves the struct unchanged
        assert_eq!(place.number_rooms, 3);
    }

    #[test]
    fn test_field_error_rejection_classes() {
        assert!(FieldError::ReadOnly("id".into()).is_rejection());
        assert!(FieldError::Unknown { kind: Kind::State, field: "x".into() }.is_rejection());
        assert!(!FieldError::InvalidValue { field: "x".into(), message: String::new() }.is_rejection());
    }
}
