// /places/:place_id/reviews and /reviews/:review_id

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

/// GET /places/:place_id/reviews
pub async fn list(State(app): State<AppState>, Path(place_id): Path<String>) -> Result<Json<Vec<Dict>>, ApiError> {
    let storage = app.storage()?;
    let place = fetch(&**storage, Kind::Place, &place_id)?;

    Ok(Json(dicts(storage.related(Kind::Review, "place_id", place.id())?)))
}

/// GET /reviews/:review_id
pub async fn show(State(app): State<AppState>, Path(review_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    show_kind(&app, Kind::Review, &review_id)
}

/// DELETE /reviews/:review_id
pub async fn destroy(State(app): State<AppState>, Path(review_id): Path<String>) -> Result<Json<Dict>, ApiError> {
    destroy_kind(&app, Kind::Review, &review_id)
}

/// POST /places/:place_id/reviews
pub async fn create(
    State(app): State<AppState>,
    Path(place_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Dict>), ApiError> {
    let mut storage = app.storage()?;
    let place = fetch(&**storage, Kind::Place, &place_id)?;

    let mut data = parse_body(&body)?;
    require(&data, "user_id")?;
    let user_id = data.get("user_id").and_then(Value::as_str).unwrap_or_default();
    fetch(&**storage, Kind::User, user_id)?;
    require(&data, "text")?;

    data.insert("place_id".to_string(), Value::String(place.id().to_string()));
    create_entity(&mut **storage, Kind::Review, &data)
}

/// PUT /reviews/:review_id
pub async fn update(
    State(app): State<AppState>,
    Path(review_id): Path<String>,
    body: Bytes,
) -> Result<Json<Dict>, ApiError> {
    let mut storage = app.storage()?;
    let mut review = fetch(&**storage, Kind::Review, &review_id)?;
    let data = parse_body(&body)?;

    update_entity(&mut **storage, &mut review, &data)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{post, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_review_flow() {
        let (_dir, app) = test_app();
        let (_, state) = post(&app, "/api/v1/states", json!({"name": "Hawaii"})).await;
        let (_, city) = post(
            &app,
            &format!("/api/v1/states/{}/cities", state["id"].as_str().unwrap()),
            json!({"name": "Hilo"}),
        )
        .await;
        let (_, user) = post(&app, "/api/v1/users", json!({"email": "g@ue.st", "password": "pwd"})).await;
        let (_, place) = post(
            &app,
            &format!("/api/v1/cities/{}/places", city["id"].as_str().unwrap()),
            json!({"user_id": user["id"], "name": "Hale"}),
        )
        .await;
        let reviews_uri = format!("/api/v1/places/{}/reviews", place["id"].as_str().unwrap());

        let (status, body) = post(&app, &reviews_uri, json!({"user_id": user["id"]})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing text"}));

        let (status, review) = post(&app, &reviews_uri, json!({"user_id": user["id"], "text": "Aloha"})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(review["place_id"], place["id"]);

        let uri = format!("/api/v1/reviews/{}", review["id"].as_str().unwrap());
        let (status, body) = send(&app, Method::PUT, &uri, Some(&json!({"text": "Mahalo"}).to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], json!("Mahalo"));

        let (_, listed) = send(&app, Method::GET, &reviews_uri, None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
