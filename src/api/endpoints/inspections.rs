//! Inspection endpoints, including the findings closeout save.

use axum::extract::multipart::Multipart;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::db::repository::inspection;
use crate::findings;
use crate::models::Inspection;
use crate::uploads;

#[derive(Deserialize)]
pub struct CreateInspectionRequest {
    pub service_id: Uuid,
    pub inspection_date: String,
    pub inspection_time: String,
    pub inspection_type: String,
    pub sub_type: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateInspectionRequest {
    pub duration_minutes: Option<i64>,
    pub observations: Option<String>,
    pub sub_type: Option<String>,
}

/// Closeout response: the updated row plus every attachment stored for
/// this request, in upload order (consumed or not).
#[derive(Serialize)]
pub struct FindingsSaveResponse {
    pub success: bool,
    pub data: Inspection,
    pub attachments: Vec<String>,
}

/// `POST /api/inspections`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CreateInspectionRequest>,
) -> Result<(StatusCode, Json<DataBody<Inspection>>), ApiError> {
    if payload.inspection_date.trim().is_empty() || payload.inspection_time.trim().is_empty() {
        return Err(ApiError::Validation(
            "inspection_date and inspection_time are required".into(),
        ));
    }
    let new_inspection = Inspection {
        id: Uuid::new_v4(),
        service_id: payload.service_id,
        inspection_date: payload.inspection_date,
        inspection_time: payload.inspection_time,
        inspection_type: payload.inspection_type,
        sub_type: payload.sub_type,
        duration_minutes: None,
        observations: None,
        findings: None,
        exit_time: None,
        created_at: Utc::now().naive_utc(),
    };
    let conn = ctx.open_db()?;
    inspection::insert_inspection(&conn, &new_inspection)?;
    Ok((StatusCode::CREATED, Json(DataBody::new(new_inspection))))
}

/// `GET /api/inspections/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataBody<Inspection>>, ApiError> {
    let conn = ctx.open_db()?;
    let found = inspection::get_inspection(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Inspection".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}

/// `GET /api/services/:id/inspections`
pub async fn list_for_service(
    State(ctx): State<ApiContext>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<DataBody<Vec<Inspection>>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(DataBody::new(
        inspection::list_inspections_by_service(&conn, &service_id)?,
    )))
}

/// `PUT /api/inspections/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInspectionRequest>,
) -> Result<Json<DataBody<Inspection>>, ApiError> {
    let conn = ctx.open_db()?;
    inspection::update_inspection_progress(
        &conn,
        &id,
        payload.duration_minutes,
        payload.observations.as_deref(),
        payload.sub_type.as_deref(),
    )?;
    let found = inspection::get_inspection(&conn, &id)?.ok_or_else(|| ApiError::NotFound {
        entity_type: "Inspection".into(),
        id: id.to_string(),
    })?;
    Ok(Json(DataBody::new(found)))
}

/// `DELETE /api/inspections/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    let conn = ctx.open_db()?;
    inspection::delete_inspection(&conn, &id)?;
    Ok(Json(MessageBody::new("Inspection deleted")))
}

/// `POST /api/inspections/:id/findings` — closeout save (multipart).
///
/// Text fields: `generalObservations`, `findingsByType`, `productsByType`,
/// `stationsFindings` (the structured three as JSON text or nothing).
/// File field `images`: the photo attachments, associated to placeholder
/// findings strictly by position.
///
/// Attachments are validated as a batch and written to disk before the
/// database update; files orphaned by a later failure are not cleaned up.
pub async fn save_findings(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<FindingsSaveResponse>, ApiError> {
    let form = uploads::read_form(&mut multipart, &uploads::INSPECTION_IMAGES).await?;
    let attachments =
        uploads::store_files(&ctx.media_dir, &uploads::INSPECTION_IMAGES, &form.files)?;

    let field = |name: &str| form.fields.get(name).cloned().map(Value::String);
    let document = findings::reconcile(
        field("findingsByType"),
        field("productsByType"),
        field("stationsFindings"),
        &attachments,
    )?;
    let findings_value =
        serde_json::to_value(&document).map_err(|e| ApiError::Internal(e.to_string()))?;

    let observations = form.fields.get("generalObservations").map(String::as_str);
    let conn = ctx.open_db()?;
    let closed = inspection::close_with_findings(
        &conn,
        &id,
        observations,
        &findings_value,
        Utc::now().naive_utc(),
    )?;

    tracing::info!(
        inspection_id = %id,
        attachments = attachments.len(),
        "Inspection findings saved"
    );
    Ok(Json(FindingsSaveResponse {
        success: true,
        data: closed,
        attachments,
    }))
}
