// In-app notification inbox

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::notification::Notification;
use crate::utils::api_error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    /// When absent, every notification of the requester is marked read
    pub notification_ids: Option<Vec<Uuid>>,
}

// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let notifications = Notification::list_for_user(&mut conn, auth_user.user_id).await?;
    let unread = notifications.iter().filter(|n| !n.is_read).count();

    Ok(Json(json!({
        "notifications": notifications,
        "unreadCount": unread,
    })))
}

// PUT /api/notifications/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<MarkReadRequest>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let updated = match payload.notification_ids {
        Some(ids) if !ids.is_empty() => {
            Notification::mark_read(&mut conn, auth_user.user_id, &ids).await?
        },
        Some(_) => 0,
        None => Notification::mark_all_read(&mut conn, auth_user.user_id).await?,
    };

    Ok(Json(json!({ "success": true, "updated": updated })))
}

// DELETE /api/notifications/:id
// Scoped to the requester, other users' notifications read as missing.
pub async fn delete_notification(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let deleted =
        Notification::delete_for_user(&mut conn, auth_user.user_id, notification_id).await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(json!({ "success": true })))
}
