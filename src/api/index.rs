// /status and /stats

use axum::{extract::State, response::Json};
use serde::Serialize;
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::models::Kind;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    amenities: usize,
    cities: usize,
    places: usize,
    reviews: usize,
    states: usize,
    users: usize,
}

/// GET /status - Health check
pub async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// GET /stats - Number of objects per kind
pub async fn stats(State(app): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let storage = app.storage()?;

    Ok(Json(StatsResponse {
        amenities: storage.count(Some(Kind::Amenity))?,
        cities: storage.count(Some(Kind::City))?,
        places: storage.count(Some(Kind::Place))?,
        reviews: storage.count(Some(Kind::Review))?,
        states: storage.count(Some(Kind::State))?,
        users: storage.count(Some(Kind::User))?,
    }))
}
