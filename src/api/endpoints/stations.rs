use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::db::repository::station;
use crate::models::Station;

#[derive(Deserialize)]
pub struct StationPayload {
    pub service_id: Uuid,
    pub code: String,
    pub station_type: String,
    pub location: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// `POST /api/stations`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<StationPayload>,
) -> Result<(StatusCode, Json<DataBody<Station>>), ApiError> {
    if payload.code.trim().is_empty() {
        return Err(ApiError::Validation("code is required".into()));
    }
    let new_station = Station {
        id: Uuid::new_v4(),
        service_id: payload.service_id,
        code: payload.code.trim().to_string(),
        station_type: payload.station_type,
        location: payload.location,
        active: payload.active,
        created_at: Utc::now().naive_utc(),
    };
    let conn = ctx.open_db()?;
    station::insert_station(&conn, &new_station)?;
    Ok((StatusCode::CREATED, Json(DataBody::new(new_station))))
}

/// `GET /api/stations/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataBody<Station>>, ApiError> {
    let conn = ctx.open_db()?;
    let found = station::get_station(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Station".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}

/// `GET /api/services/:id/stations`
pub async fn list_for_service(
    State(ctx): State<ApiContext>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<DataBody<Vec<Station>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(station::list_stations_by_service(
        &conn,
        &service_id,
    )?)))
}

/// `PUT /api/stations/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StationPayload>,
) -> Result<Json<DataBody<Station>>, ApiError> {
    let conn = ctx.open_db()?;
    let existing = station::get_station(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Station".into(),
        id: id.to_string(),
    })?;
    let updated = Station {
        service_id: payload.service_id,
        code: payload.code.trim().to_string(),
        station_type: payload.station_type,
        location: payload.location,
        active: payload.active,
        ..existing
    };
    station::update_station(&conn, &updated)?;
    Ok(Json(DataBody::new(updated)))
}

/// `DELETE /api/stations/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    let conn = ctx.open_db()?;
    station::delete_station(&conn, &id)?;
    Ok(Json(MessageBody::new("Station deleted")))
}
