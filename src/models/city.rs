use serde::{Deserialize, Serialize};

use super::{Kind, Model};

/// A city inside a state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct City {
    /// Owning State id, fixed at creation
    pub state_id: String,
    pub name: String,
}

impl Model for City {
    const KIND: Kind = Kind::City;
    const MUTABLE_FIELDS: &'static [&'static str] = &["name"];
    const CREATE_ONLY_FIELDS: &'static [&'static str] = &["state_id"];
}
