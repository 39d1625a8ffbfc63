//! Document-to-PDF conversion via a headless LibreOffice process.
//!
//! The buffer is staged to a temp file, `soffice --headless --convert-to
//! pdf` runs against it, and the resulting PDF is read back. Both temp
//! files are removed on success; on failure the input is removed and the
//! error propagates. If the output exists but cannot be read back it is
//! left behind (known cleanup gap).

use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("could not stage temporary input: {0}")]
    Staging(std::io::Error),
    #[error("converter process failed: {0}")]
    Process(String),
    #[error("converted output missing or unreadable: {0}")]
    Output(std::io::Error),
}

/// Convert a document buffer to PDF. `input_ext` is the extension of the
/// source format (e.g. `docx`), needed for LibreOffice to pick a filter.
pub async fn convert_to_pdf(
    soffice_bin: &str,
    input: &[u8],
    input_ext: &str,
) -> Result<Vec<u8>, ConvertError> {
    let work_dir = std::env::temp_dir();
    let stem = format!(
        "fumigo-{}-{:08x}",
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>()
    );
    let input_path = work_dir.join(format!("{stem}.{input_ext}"));
    std::fs::write(&input_path, input).map_err(ConvertError::Staging)?;

    let run = Command::new(soffice_bin)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(&work_dir)
        .arg(&input_path)
        .output()
        .await;

    match run {
        Ok(out) if out.status.success() => {}
        Ok(out) => {
            let _ = std::fs::remove_file(&input_path);
            return Err(ConvertError::Process(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }
        Err(e) => {
            let _ = std::fs::remove_file(&input_path);
            return Err(ConvertError::Process(e.to_string()));
        }
    }

    let output_path = work_dir.join(format!("{stem}.pdf"));
    let pdf = std::fs::read(&output_path);
    let _ = std::fs::remove_file(&input_path);
    match pdf {
        Ok(bytes) => {
            let _ = std::fs::remove_file(&output_path);
            tracing::debug!(size = bytes.len(), "Document converted to PDF");
            Ok(bytes)
        }
        // Output temp (if any) stays behind; see module docs.
        Err(e) => Err(ConvertError::Output(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_process_error() {
        let err = convert_to_pdf("/nonexistent/soffice-bin", b"doc", "docx")
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Process(_)));
    }

    #[tokio::test]
    async fn converter_that_produces_no_output_is_an_output_error() {
        // `true` exits 0 without writing a PDF, so reading the output fails.
        let err = convert_to_pdf("true", b"doc", "docx").await.unwrap_err();
        assert!(matches!(err, ConvertError::Output(_)));
    }
}
