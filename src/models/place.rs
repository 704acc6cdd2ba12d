// 🏠 Place - a rentable listing
//
// Belongs to one City and one User (the host). Numeric attributes keep the
// types of the durable file: counts and price are integers, coordinates floats.

use serde::{Deserialize, Serialize};

use super::{Kind, Model};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    // ========================================================================
    // OWNERSHIP (fixed at creation)
    // ========================================================================
    pub city_id: String,
    pub user_id: String,

    // ========================================================================
    // LISTING
    // ========================================================================
    pub name: String,
    pub description: String,
    pub number_rooms: i64,
    pub number_bathrooms: i64,
    pub max_guest: i64,
    pub price_by_night: i64,
    pub latitude: f64,
    pub longitude: f64,

    /// Linked Amenity ids
    pub amenity_ids: Vec<String>,
}

impl Model for Place {
    const KIND: Kind = Kind::Place;
    const MUTABLE_FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "number_rooms",
        "number_bathrooms",
        "max_guest",
        "price_by_night",
        "latitude",
        "longitude",
        "amenity_ids",
    ];
    const CREATE_ONLY_FIELDS: &'static [&'static str] = &["city_id", "user_id"];
}
