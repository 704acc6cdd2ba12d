// /states/:state_id/cities and /cities/:city_id

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::{
    create_entity, destroy_kind, dicts, fetch, parse_body, require, show_kind, update_entity, ApiError, AppState, Dict,
};
use crate::models::Kind;

/// GET /states/:state_id/cities
pub async fn list(State(app): State<AppState>, Path(state_id): Path<String>) -> Result<Json<Vec<Dict>>, ApiError> {
    let storage = app.storage()?;
    let state = fetch(&**storage, Kind::State, &state_id)?;

    Ok(Json(dicts(storage.related(Kind::City, "state_id", state.id())?)))
}

/// GET /cities/:city_id
pub async fn show(State(app): State<AppState>, Path(city_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    show_kind(&app, Kind::City, &city_id)
}

/// DELETE /cities/:city_id
pub async fn destroy(State(app): State<AppState>, Path(city_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    destroy_kind(&app, Kind::City, &city_id)
}

/// POST /states/:state_id/cities
pub async fn create(
    State(app): State<AppState>,
    Path(state_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Dict>), ApiError> {
    let mut storage = app.storage()?;
    let state = fetch(&**storage, Kind::State, &state_id)?;

    let mut data = parse_body(&body)?;
    require(&data, "name")?;
    data.insert("state_id".to_string(), Value::String(state.id().to_string()));

    create_entity(&mut **storage, Kind::City, &data)
}

/// PUT /cities/:city_id
pub async fn update(
    State(app): State<AppState>,
    Path(city_id): Path<String>,
    body: Bytes,
) -> Result<Json<Dict>, ApiError> {
    let mut storage = app.storage()?;
    let mut city = fetch(&**storage, Kind::City, &city_id)?;

    let data = parse_body(&body)?;
    require(&data, "name")?;

    update_entity(&mut **storage, &mut city, &data)
}
