//! Long-term archive endpoints over the S3-compatible object store.

use axum::extract::multipart::Multipart;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DataBody, MessageBody};
use crate::storage::ObjectStore;
use crate::uploads::generated_filename;

#[derive(Serialize)]
pub struct ArchivedObject {
    pub key: String,
}

#[derive(Serialize)]
pub struct PresignedUrl {
    pub url: String,
}

fn store(ctx: &ApiContext) -> Result<Arc<ObjectStore>, ApiError> {
    ctx.storage
        .clone()
        .ok_or_else(|| ApiError::Dependency("object storage is not configured".into()))
}

/// `POST /api/archive` — multipart with a single `file` part and an
/// optional `key` text field. Without a key the object lands under
/// `archive/` with a generated name.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DataBody<ArchivedObject>>), ApiError> {
    let storage = store(&ctx)?;

    let mut key: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        match field.name() {
            Some("key") => {
                key = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                );
            }
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (name, bytes) = file.ok_or_else(|| ApiError::Validation("a file part is required".into()))?;
    if bytes.is_empty() {
        return Err(ApiError::Validation("uploaded file is empty".into()));
    }
    let key = key
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| format!("archive/{}", generated_filename(&name)));

    storage.put_object(&key, bytes).await?;
    tracing::info!(key = %key, "Object archived");
    Ok((
        StatusCode::CREATED,
        Json(DataBody::new(ArchivedObject { key })),
    ))
}

/// `GET /api/archive/*key` — 60-second presigned retrieval URL.
pub async fn presign(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
) -> Result<Json<DataBody<PresignedUrl>>, ApiError> {
    let storage = store(&ctx)?;
    let url = storage.presign_get(&key)?;
    Ok(Json(DataBody::new(PresignedUrl { url })))
}

/// `DELETE /api/archive/*key`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(key): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let storage = store(&ctx)?;
    storage.delete_object(&key).await?;
    Ok(Json(MessageBody::new("Object deleted")))
}
