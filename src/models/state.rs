use serde::{Deserialize, Serialize};

use super::{Kind, Model};

/// A state or province; parent of cities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub name: String,
}

impl Model for State {
    const KIND: Kind = Kind::State;
    const MUTABLE_FIELDS: &'static [&'static str] = &["name"];
}
