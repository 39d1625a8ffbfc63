//! Schedule rows. No scheduler runs against these; they are plain CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::db::repository::schedule;
use crate::models::enums::ScheduleStatus;
use crate::models::Schedule;

#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub scheduled_date: String,
    pub scheduled_time: String,
    #[serde(default = "default_status")]
    pub status: ScheduleStatus,
    pub notes: Option<String>,
}

fn default_status() -> ScheduleStatus {
    ScheduleStatus::Pending
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ScheduleStatus,
}

/// `POST /api/schedules`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<DataBody<Schedule>>), ApiError> {
    if payload.scheduled_date.trim().is_empty() || payload.scheduled_time.trim().is_empty() {
        return Err(ApiError::Validation(
            "scheduled_date and scheduled_time are required".into(),
        ));
    }
    let new_schedule = Schedule {
        id: Uuid::new_v4(),
        service_id: payload.service_id,
        user_id: payload.user_id,
        scheduled_date: payload.scheduled_date,
        scheduled_time: payload.scheduled_time,
        status: payload.status,
        notes: payload.notes,
        created_at: Utc::now().naive_utc(),
    };
    let conn = ctx.open_db()?;
    schedule::insert_schedule(&conn, &new_schedule)?;
    Ok((StatusCode::CREATED, Json(DataBody::new(new_schedule))))
}

/// `GET /api/users/:id/schedules`
pub async fn list_for_user(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<DataBody<Vec<Schedule>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(schedule::list_schedules_by_user(
        &conn, &user_id,
    )?)))
}

/// `PUT /api/schedules/:id/status`
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<DataBody<Schedule>>, ApiError> {
    let conn = ctx.open_db()?;
    schedule::update_schedule_status(&conn, &id, payload.status)?;
    let found = schedule::get_schedule(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Schedule".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}

/// `DELETE /api/schedules/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    let conn = ctx.open_db()?;
    schedule::delete_schedule(&conn, &id)?;
    Ok(Json(MessageBody::new("Schedule deleted")))
}
