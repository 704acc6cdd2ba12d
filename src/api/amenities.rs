// /amenities and /amenities/:amenity_id

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::{
    create_entity, destroy_kind, fetch, list_kind, parse_body, require, show_kind, update_entity, ApiError, AppState,
    Dict,
};
use crate::models::Kind;

/// GET /amenities
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Dict>>, ApiError> {
    list_kind(&app, Kind::Amenity)
}

/// GET /amenities/:amenity_id
pub async fn show(State(app): State<AppState>, Path(amenity_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    show_kind(&app, Kind::Amenity, &amenity_id)
}

/// DELETE /amenities/:amenity_id
pub async fn destroy(State(app): State<AppState>, Path(amenity_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    destroy_kind(&app, Kind::Amenity, &amenity_id)
}

/// POST /amenities
pub async fn create(State(app): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<Dict>), ApiError> {
    let data = parse_body(&body)?;
    require(&data, "name")?;

    let mut storage = app.storage()?;
    create_entity(&mut **storage, Kind::Amenity, &data)
}

/// PUT /amenities/:amenity_id
pub async fn update(
    State(app): State<AppState>,
    Path(amenity_id): Path<String>,
    body: Bytes,
) -> Result<Json<Dict>, ApiError> {
    let mut storage = app.storage()?;
    let mut amenity = fetch(&**storage, Kind::Amenity, &amenity_id)?;

    let data = parse_body(&body)?;
    require(&data, "name")?;

    update_entity(&mut **storage, &mut amenity, &data)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{post, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_amenity_crud() {
        let (_dir, app) = test_app();

        let (status, wifi) = post(&app, "/api/v1/amenities", json!({"name": "Wifi"})).await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/v1/amenities/{}", wifi["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::PUT, &uri, Some(&json!({"name": "Fast Wifi"}).to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], json!("Fast Wifi"));

        let (status, body) = send(&app, Method::GET, "/api/v1/amenities", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], json!("Fast Wifi"));

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, Method::GET, "/api/v1/amenities", None).await;
        assert_eq!(body, json!([]));
    }
}
