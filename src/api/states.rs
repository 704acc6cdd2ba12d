// /states and /states/:state_id

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

/// GET /states
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Dict>>, ApiError> {
    list_kind(&app, Kind::State)
}

/// GET /states/:state_id
pub async fn show(State(app): State<AppState>, Path(state_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    show_kind(&app, Kind::State, &state_id)
}

/// DELETE /states/:state_id
pub async fn destroy(State(app): State<AppState>, Path(state_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    destroy_kind(&app, Kind::State, &state_id)
}

/// POST /states
pub async fn create(State(app): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<Dict>), ApiError> {
    let data = parse_body(&body)?;
    require(&data, "name")?;

    let mut storage = app.storage()?;
    create_entity(&mut **storage, Kind::State, &data)
}

/// PUT /states/:state_id
pub async fn update(
    State(app): State<AppState>,
    Path(state_id): Path<String>,
    body: Bytes,
) -> Result<Json<Dict>, ApiError> {
    let mut storage = app.storage()?;
    let mut state = fetch(&**storage, Kind::State, &state_id)?;

    let data = parse_body(&body)?;
    require(&data, "name")?;

    update_entity(&mut **storage, &mut state, &data)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{post, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_state_lifecycle() {
        let (_dir, app) = test_app();

        let (status, body) = send(&app, Method::GET, "/api/v1/states", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, created) = post(&app, "/api/v1/states", json!({"name": "California"})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["__class__"], json!("State"));
        assert_eq!(created["name"], json!("California"));
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/states/{}", id);

        let (status, body) = send(&app, Method::GET, "/api/v1/states", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&json!({"name": "Golden State", "id": "hijack", "created_at": "2000-01-01T00:00:00.000000"}).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], json!("Golden State"));
        assert_eq!(body["id"], json!(id));
        assert_eq!(body["created_at"], created["created_at"]);

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_state_update_requires_name() {
        let (_dir, app) = test_app();
        let (_, created) = post(&app, "/api/v1/states", json!({"name": "Iowa"})).await;
        let uri = format!("/api/v1/states/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::PUT, &uri, Some(&json!({"motto": "x"}).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing name"}));

        let (status, _) = send(&app, Method::PUT, "/api/v1/states/missing", Some("{\"name\": \"x\"}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
