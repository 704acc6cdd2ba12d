use serde::{Deserialize, Serialize};

use super::{Kind, Model};

/// A user's review of a place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

impl Model for Review {
    const KIND: Kind = Kind::Review;
    const MUTABLE_FIELDS: &'static [&'static str] = &["text"];
    const CREATE_ONLY_FIELDS: &'static [&'static str] = &["place_id", "user_id"];
}
