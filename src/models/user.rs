use serde::{Deserialize, Serialize};

use super::{Kind, Model};

/// A registered user. `email` is the login and cannot change after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Model for User {
    const KIND: Kind = Kind::User;
    const MUTABLE_FIELDS: &'static [&'static str] = &["password", "first_name", "last_name"];
    const CREATE_ONLY_FIELDS: &'static [&'static str] = &["email"];
}
