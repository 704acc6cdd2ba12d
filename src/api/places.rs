// /cities/:city_id/places and /places/:place_id

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::{create_entity, dicts, fetch, parse_body, require, show_kind, update_entity, ApiError, AppState, Dict};
use crate::models::Kind;

/// GET /cities/:city_id/places
pub async fn list(State(app): State<AppState>, Path(city_id): Path<String>) -> Result<Json<Vec<Dict>>, ApiError> {
    let storage = app.storage()?;
    let city = fetch(&**storage, Kind::City, &city_id)?;

    Ok(Json(dicts(storage.related(Kind::Place, "city_id", city.id())?)))
}

/// GET /places/:place_id
pub async fn show(State(app): State<AppState>, Path(place_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    show_kind(&app, Kind::Place, &place_id)
}

/// DELETE /places/:place_id
pub async fn destroy(State(app): State<AppState>, Path(place_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    let mut storage = app.storage()?;
    let place = fetch(&**storage, Kind::Place, &place_id)?;
    place.delete(&mut **storage)?;

    Ok(Json(Dict::new()))
}

/// POST /cities/:city_id/places
pub async fn create(
    State(app): State<AppState>,
    Path(city_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Dict>), ApiError> {
    let mut storage = app.storage()?;
    let city = fetch(&**storage, Kind::City, &city_id)?;

    let mut data = parse_body(&body)?;
    require(&data, "user_id")?;
    let user_id = data.get("user_id").and_then(Value::as_str).unwrap_or_default();
    fetch(&**storage, Kind::User, user_id)?;
    require(&data, "name")?;

    data.insert("city_id".to_string(), Value::String(city.id().to_string()));
    create_entity(&mut **storage, Kind::Place, &data)
}

/// PUT /places/:place_id
pub async fn update(
    State(app): State<AppState>,
    Path(place_id): Path<String>,
    body: Bytes,
) -> Result<Json<Dict>, ApiError> {
    let mut storage = app.storage()?;
    let mut place = fetch(&**storage, Kind::Place, &place_id)?;
    let data = parse_body(&body)?;

    update_entity(&mut **storage, &mut place, &data)
}
