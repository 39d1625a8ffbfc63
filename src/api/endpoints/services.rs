use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::db::repository::service;
use crate::models::Service;

#[derive(Deserialize)]
pub struct ServicePayload {
    pub client_id: Uuid,
    pub service_type: String,
    pub frequency: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// `POST /api/services`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ServicePayload>,
) -> Result<(StatusCode, Json<DataBody<Service>>), ApiError> {
    if payload.service_type.trim().is_empty() {
        return Err(ApiError::Validation("service_type is required".into()));
    }
    let new_service = Service {
        id: Uuid::new_v4(),
        client_id: payload.client_id,
        service_type: payload.service_type.trim().to_string(),
        frequency: payload.frequency,
        address: payload.address,
        notes: payload.notes,
        active: payload.active,
        created_at: Utc::now().naive_utc(),
    };
    let conn = ctx.open_db()?;
    service::insert_service(&conn, &new_service)?;
    Ok((StatusCode::CREATED, Json(DataBody::new(new_service))))
}

/// `GET /api/services`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DataBody<Vec<Service>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(service::list_services(&conn)?)))
}

/// `GET /api/clients/:id/services`
pub async fn list_for_client(
    State(ctx): State<ApiContext>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<DataBody<Vec<Service>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(service::list_services_by_client(
        &conn, &client_id,
    )?)))
}

/// `GET /api/services/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataBody<Service>>, ApiError> {
    let conn = ctx.open_db()?;
    let found = service::get_service(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Service".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}

/// `PUT /api/services/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePayload>,
) -> Result<Json<DataBody<Service>>, ApiError> {
    let conn = ctx.open_db()?;
    let existing = service::get_service(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Service".into(),
        id: id.to_string(),
    })?;
    let updated = Service {
        client_id: payload.client_id,
        service_type: payload.service_type.trim().to_string(),
        frequency: payload.frequency,
        address: payload.address,
        notes: payload.notes,
        active: payload.active,
        ..existing
    };
    service::update_service(&conn, &updated)?;
    Ok(Json(DataBody::new(updated)))
}

/// `DELETE /api/services/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    let conn = ctx.open_db()?;
    service::delete_service(&conn, &id)?;
    Ok(Json(MessageBody::new("Service deleted")))
}
