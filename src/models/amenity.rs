use serde::{Deserialize, Serialize};

use super::{Kind, Model};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Amenity {
    pub name: String,
}

impl Model for Amenity {
    const KIND: Kind = Kind::Amenity;
    const MUTABLE_FIELDS: &'static [&'static str] = &["name"];
}
