use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::db::repository::client;
use crate::models::Client;

#[derive(Deserialize)]
pub struct ClientPayload {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// `POST /api/clients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<DataBody<Client>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let new_client = Client {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        contact_name: payload.contact_name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        created_at: Utc::now().naive_utc(),
    };
    let conn = ctx.open_db()?;
    client::insert_client(&conn, &new_client)?;
    Ok((StatusCode::CREATED, Json(DataBody::new(new_client))))
}

/// `GET /api/clients`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DataBody<Vec<Client>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(client::list_clients(&conn)?)))
}

/// `GET /api/clients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataBody<Client>>, ApiError> {
    let conn = ctx.open_db()?;
    let found = client::get_client(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Client".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}

/// `PUT /api/clients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<DataBody<Client>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let conn = ctx.open_db()?;
    let existing = client::get_client(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Client".into(),
        id: id.to_string(),
    })?;
    let updated = Client {
        name: payload.name.trim().to_string(),
        contact_name: payload.contact_name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        ..existing
    };
    client::update_client(&conn, &updated)?;
    Ok(Json(DataBody::new(updated)))
}

/// `DELETE /api/clients/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    let conn = ctx.open_db()?;
    client::delete_client(&conn, &id)?;
    Ok(Json(MessageBody::new("Client deleted")))
}
