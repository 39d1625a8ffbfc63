//! Multipart upload receiver.
//!
//! Accepts batches of raster images, filters by extension AND declared
//! content type, caps per-file size and batch count, and persists accepted
//! files under `<media_dir>/<category>/` with generated names. The whole
//! batch is rejected if any single file fails the filter.

use std::collections::HashMap;
use std::path::Path;

use axum::body::Bytes;
use axum::extract::multipart::Multipart;
use thiserror::Error;

/// Raster formats accepted for inspection photos.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Per-file size cap: 5 MiB.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Bounds for one upload surface: which multipart field carries files,
/// where they land, and how many are accepted per request.
pub struct UploadPolicy {
    pub category: &'static str,
    pub field_name: &'static str,
    pub max_files: usize,
}

/// Policy for inspection findings photos.
pub const INSPECTION_IMAGES: UploadPolicy = UploadPolicy {
    category: "inspections",
    field_name: "images",
    max_files: 10,
};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file '{0}' has a disallowed type; accepted types: jpg, jpeg, png, gif, webp")]
    DisallowedType(String),
    #[error("file '{name}' exceeds the {} MiB per-file limit", MAX_FILE_BYTES / (1024 * 1024))]
    TooLarge { name: String },
    #[error("too many files; at most {0} accepted per request")]
    TooMany(usize),
    #[error("could not read multipart request: {0}")]
    Read(String),
    #[error("could not persist upload: {0}")]
    Io(#[from] std::io::Error),
}

/// One accepted file part, held in memory until the whole batch validates.
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A fully-read multipart request: text fields by name plus the file parts
/// from the policy's file field, in arrival order.
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<IncomingFile>,
}

/// Drain a multipart request, validating file parts against the policy as
/// they arrive. Any failing file aborts the whole batch before anything is
/// written to disk.
pub async fn read_form(
    multipart: &mut Multipart,
    policy: &UploadPolicy,
) -> Result<MultipartForm, UploadError> {
    let mut fields = HashMap::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Read(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == policy.field_name && field.file_name().is_some() {
            if files.len() >= policy.max_files {
                return Err(UploadError::TooMany(policy.max_files));
            }
            let original_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(|ct| ct.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| UploadError::Read(e.to_string()))?;

            validate_file(&original_name, content_type.as_deref(), bytes.len())?;
            files.push(IncomingFile {
                original_name,
                content_type,
                bytes,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| UploadError::Read(e.to_string()))?;
            fields.insert(name, text);
        }
    }

    Ok(MultipartForm { fields, files })
}

/// Write validated files under `<media_dir>/<category>/` and return their
/// relative URLs (`/media/<category>/<generated-name>`) in upload order.
pub fn store_files(
    media_dir: &Path,
    policy: &UploadPolicy,
    files: &[IncomingFile],
) -> Result<Vec<String>, UploadError> {
    let dir = media_dir.join(policy.category);
    std::fs::create_dir_all(&dir)?;

    let mut urls = Vec::with_capacity(files.len());
    for file in files {
        let name = generated_filename(&file.original_name);
        std::fs::write(dir.join(&name), &file.bytes)?;
        urls.push(format!("/media/{}/{}", policy.category, name));
    }
    Ok(urls)
}

/// The extension must be on the raster-image allowlist AND the declared
/// content type must agree with it; the size cap applies per file.
fn validate_file(
    original_name: &str,
    content_type: Option<&str>,
    size: usize,
) -> Result<(), UploadError> {
    let ext = extension_of(original_name);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UploadError::DisallowedType(original_name.to_string()));
    }
    let expected = mime_guess::from_ext(&ext).first_or_octet_stream();
    match content_type {
        Some(ct) if ct == expected.essence_str() => {}
        _ => return Err(UploadError::DisallowedType(original_name.to_string())),
    }
    if size > MAX_FILE_BYTES {
        return Err(UploadError::TooLarge {
            name: original_name.to_string(),
        });
    }
    Ok(())
}

/// `<epoch-millis>-<random-hex><original-ext>`. Collisions are treated as
/// negligible, not eliminated.
pub fn generated_filename(original_name: &str) -> String {
    let ext = extension_of(original_name);
    let suffix: u32 = rand::random();
    format!(
        "{}-{:08x}.{}",
        chrono::Utc::now().timestamp_millis(),
        suffix,
        ext
    )
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}
