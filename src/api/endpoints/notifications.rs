//! Notification rows plus the real-time push on creation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::db::repository::notification;
use crate::models::Notification;

#[derive(Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    pub title: String,
    pub body: Option<String>,
}

/// `POST /api/notifications`
///
/// Persists the row, then pushes it over the target user's WebSocket room
/// when one is bound. Offline users pick it up on their next list call.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<DataBody<Notification>>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    let new_notification = Notification {
        id: Uuid::new_v4(),
        user_id: payload.user_id,
        title: payload.title.trim().to_string(),
        body: payload.body,
        read: false,
        created_at: Utc::now().naive_utc(),
    };
    let conn = ctx.open_db()?;
    notification::insert_notification(&conn, &new_notification)?;

    ctx.registry
        .push(&new_notification.user_id, new_notification.clone())
        .await;

    Ok((StatusCode::CREATED, Json(DataBody::new(new_notification))))
}

/// `GET /api/users/:id/notifications`
pub async fn list_for_user(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<DataBody<Vec<Notification>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(
        notification::list_notifications_by_user(&conn, &user_id)?,
    )))
}

/// `PUT /api/notifications/:id/read`
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    let conn = ctx.open_db()?;
    notification::mark_notification_read(&conn, &id)?;
    Ok(Json(MessageBody::new("Notification marked read")))
}
