// REST API - /api/v1
//
// Handlers validate the request, then delegate to the storage engine. Every
// handler runs synchronously under the storage mutex, so one request's
// read-modify-write never interleaves with another's.

pub mod amenities;
pub mod cities;
pub mod index;
pub mod places;
pub mod reviews;
pub mod states;
pub mod users;

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::error::StorageError;
use crate::models::{Entity, FieldError, Kind};
use crate::storage::Storage;

pub type Dict = Map<String, Value>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    storage: Arc<Mutex<Box<dyn Storage>>>,
}

impl AppState {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        AppState {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    fn storage(&self) -> Result<MutexGuard<'_, Box<dyn Storage>>, ApiError> {
        self.storage
            .lock()
            .map_err(|_| ApiError::Internal("storage lock poisoned".to_string()))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<FieldError> for ApiError {
    fn from(e: FieldError) -> Self {
        let field = match e {
            FieldError::ReadOnly(field)
            | FieldError::Unknown { field, .. }
            | FieldError::InvalidValue { field, .. } => field,
        };
        ApiError::BadRequest(format!("Invalid {}", field))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(message) => {
                error!("request failed: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// Request helpers
// ============================================================================

/// A body must be a non-empty JSON object
pub(crate) fn parse_body(body: &Bytes) -> Result<Dict, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(data)) if !data.is_empty() => Ok(data),
        _ => Err(ApiError::BadRequest("Not a JSON".to_string())),
    }
}

pub(crate) fn require(data: &Dict, field: &str) -> Result<(), ApiError> {
    if data.contains_key(field) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Missing {}", field)))
    }
}

pub(crate) fn fetch(storage: &dyn Storage, kind: Kind, id: &str) -> Result<Entity, ApiError> {
    storage.get(Some(kind), Some(id))?.ok_or(ApiError::NotFound)
}

pub(crate) fn dicts(entities: impl IntoIterator<Item = Entity>) -> Vec<Dict> {
    entities.into_iter().map(|entity| entity.to_dict()).collect()
}

pub(crate) fn list_kind(state: &AppState, kind: Kind) -> Result<Json<Vec<Dict>>, ApiError> {
    let storage = state.storage()?;
    Ok(Json(dicts(storage.all(Some(kind))?.into_values())))
}

pub(crate) fn show_kind(state: &AppState, kind: Kind, id: &str) -> Result<Json<Dict>, ApiError> {
    let storage = state.storage()?;
    Ok(Json(fetch(&**storage, kind, id)?.to_dict()))
}

pub(crate) fn destroy_kind(state: &AppState, kind: Kind, id: &str) -> Result<Json<Dict>, ApiError> {
    let mut storage = state.storage()?;
    let entity = fetch(&**storage, kind, id)?;
    storage.delete(&entity)?;
    Ok(Json(Dict::new()))
}

/// Build, register and persist a new entity from a request body
pub(crate) fn create_entity(
    storage: &mut dyn Storage,
    kind: Kind,
    data: &Dict,
) -> Result<(StatusCode, Json<Dict>), ApiError> {
    let mut entity = Entity::from_request(kind, data)?;
    entity.save(storage)?;
    debug!("created {}", entity.key());

    Ok((StatusCode::CREATED, Json(entity.to_dict())))
}

/// Apply every client-writable field of `data`, then persist.
/// Server-controlled, create-only and unknown keys are skipped.
pub(crate) fn update_entity(storage: &mut dyn Storage, entity: &mut Entity, data: &Dict) -> Result<Json<Dict>, ApiError> {
    for (field, value) in data {
        match entity.apply_update(field, value) {
            Ok(()) => {}
            Err(e) if e.is_rejection() => debug!("ignoring `{}` on {}: {}", field, entity.key(), e),
            Err(e) => return Err(e.into()),
        }
    }

    entity.save(storage)?;
    Ok(Json(entity.to_dict()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats))
        .route("/states", get(states::list).post(states::create))
        .route(
            "/states/:state_id",
            get(states::show).put(states::update).delete(states::destroy),
        )
        .route("/states/:state_id/cities", get(cities::list).post(cities::create))
        .route(
            "/cities/:city_id",
            get(cities::show).put(cities::update).delete(cities::destroy),
        )
        .route("/amenities", get(amenities::list).post(amenities::create))
        .route(
            "/amenities/:amenity_id",
            get(amenities::show).put(amenities::update).delete(amenities::destroy),
        )
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:user_id",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/cities/:city_id/places", get(places::list).post(places::create))
        .route(
            "/places/:place_id",
            get(places::show).put(places::update).delete(places::destroy),
        )
        .route("/places/:place_id/reviews", get(reviews::list).post(reviews::create))
        .route(
            "/reviews/:review_id",
            get(reviews::show).put(reviews::update).delete(reviews::destroy),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// ============================================================================
// TESTS
// ============================================================================
