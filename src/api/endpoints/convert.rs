//! Document-to-PDF conversion endpoint.

use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::convert::convert_to_pdf;

/// `POST /api/convert/pdf` — multipart with a single `file` part.
///
/// Returns the converted document as `application/pdf`. The source format
/// is taken from the uploaded filename's extension.
pub async fn to_pdf(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut input: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            input = Some((name, bytes.to_vec()));
            break;
        }
    }

    let (name, bytes) = input.ok_or_else(|| ApiError::Validation("a file part is required".into()))?;
    let ext = std::path::Path::new(&name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ApiError::Validation("filename must carry an extension".into()))?;
    if bytes.is_empty() {
        return Err(ApiError::Validation("uploaded file is empty".into()));
    }

    let pdf = convert_to_pdf(&ctx.soffice_bin, &bytes, &ext).await?;
    tracing::info!(source = %name, size = pdf.len(), "Document converted");
    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf))
}
