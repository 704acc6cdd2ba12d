// /users and /users/:user_id

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

/// GET /users
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Dict>>, ApiError> {
    list_kind(&app, Kind::User)
}

/// GET /users/:user_id
pub async fn show(State(app): State<AppState>, Path(user_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    show_kind(&app, Kind::User, &user_id)
}

/// DELETE /users/:user_id
pub async fn destroy(State(app): State<AppState>, Path(user_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    destroy_kind(&app, Kind::User, &user_id)
}

/// POST /users
pub async fn create(State(app): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<Dict>), ApiError> {
    let data = parse_body(&body)?;
    require(&data, "email")?;
    require(&data, "password")?;

    let mut storage = app.storage()?;
    create_entity(&mut **storage, Kind::User, &data)
}

/// PUT /users/:user_id (email is fixed once the user exists)
pub async fn update(
    State(app): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<Dict>, ApiError> {
    let mut storage = app.storage()?;
    let mut user = fetch(&**storage, Kind::User, &user_id)?;
    let data = parse_body(&body)?;

    update_entity(&mut **storage, &mut user, &data)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{post, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_user_create_requires_credentials() {
        let (_dir, app) = test_app();

        let (status, body) = post(&app, "/api/v1/users", json!({"password": "pwd"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing email"}));

        let (status, body) = post(&app, "/api/v1/users", json!({"email": "a@b.c"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing password"}));

        let (status, body) = post(&app, "/api/v1/users", json!({"email": "a@b.c", "password": "pwd"})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], json!("a@b.c"));
    }

    #[tokio::test]
    async fn test_user_update_keeps_email() {
        let (_dir, app) = test_app();
        let (_, user) = post(&app, "/api/v1/users", json!({"email": "a@b.c", "password": "pwd"})).await;
        let uri = format!("/api/v1/users/{}", user["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&json!({"email": "new@b.c", "first_name": "Ada"}).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], json!("a@b.c"));
        assert_eq!(body["first_name"], json!("Ada"));

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["first_name"], json!("Ada"));
    }
}
