// Error responses follow the {"error": "..."} contract

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use estia_backend::models::transaction::Stage;
use estia_backend::utils::api_error::ApiError;

async fn response_parts(error: ApiError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

#[tokio::test]
async fn validation_errors_are_bad_requests() {
    let (status, body) =
        response_parts(ApiError::Validation(Stage::invalid_stage_message().to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid transaction stage. Must be one of: PENDING, MEETING_SCHEDULED, \
         DEPOSIT_PAID, FINAL_SIGNING, COMPLETED, CANCELLED"
    );
}

#[tokio::test]
async fn hidden_listings_read_as_missing() {
    let (status, body) = response_parts(ApiError::NotFound(
        estia_backend::utils::messages::PROPERTY_NOT_FOUND.to_string(),
    ))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        estia_backend::utils::messages::PROPERTY_NOT_FOUND
    );
}

#[tokio::test]
async fn database_details_never_leak() {
    let (status, body) =
        response_parts(ApiError::Database("relation users does not exist".to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
}

#[tokio::test]
async fn conflicts_surface_as_bad_requests() {
    let (status, body) = response_parts(ApiError::Conflict(
        estia_backend::utils::messages::CONNECTION_EXISTS.to_string(),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        estia_backend::utils::messages::CONNECTION_EXISTS
    );
}
