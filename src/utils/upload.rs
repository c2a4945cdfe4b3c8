//! Attachment storage for post uploads.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::utils::error::AppError;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Images, PDFs and Office documents only.
const ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// An upload written to disk, ready to be recorded as a post attachment.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
}

pub fn is_allowed_type(content_type: &str) -> bool {
    ALLOWED_TYPES.contains(&content_type)
}

fn sanitized_name(original: &str) -> Result<String, AppError> {
    Path::new(original)
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| AppError::ValidationError("Invalid file name".to_string()))
}

/// Write the upload under `dir` with a timestamp-prefixed name and return
/// the attachment metadata. The URL is root-relative; the same process
/// serves `/uploads`.
pub async fn store(
    dir: &Path,
    original_name: &str,
    content_type: &str,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> Result<StoredUpload, AppError> {
    if !is_allowed_type(content_type) {
        return Err(AppError::ValidationError(
            "Invalid file type. Only images, PDFs, and Office documents are allowed.".to_string(),
        ));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::ValidationError(
            "File exceeds the 5MB upload limit".to_string(),
        ));
    }

    let stored_name = format!("{}-{}", now.timestamp_millis(), sanitized_name(original_name)?);
    let path = dir.join(&stored_name);

    fs::create_dir_all(dir).await.map_err(|err| {
        AppError::InternalServerError(format!("Failed to create upload directory: {}", err))
    })?;
    fs::write(&path, bytes).await.map_err(|err| {
        AppError::InternalServerError(format!("Failed to store upload: {}", err))
    })?;

    Ok(StoredUpload {
        file_name: original_name.to_string(),
        file_url: format!("/uploads/{}", stored_name),
        file_type: content_type.to_string(),
    })
}

/// Best-effort removal of a stored file by its recorded URL. A file that is
/// already gone is not an error.
pub async fn remove_by_url(dir: &Path, file_url: &str) {
    let Some(stored_name) = file_url.rsplit('/').next() else {
        return;
    };
    let path: PathBuf = dir.join(stored_name);
    if let Err(err) = fs::remove_file(&path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %err, "Failed to delete attachment file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn office_and_image_types_are_allowed() {
        assert!(is_allowed_type("image/png"));
        assert!(is_allowed_type("application/pdf"));
        assert!(!is_allowed_type("application/x-sh"));
        assert!(!is_allowed_type("text/html"));
    }

    #[test]
    fn file_names_are_stripped_to_their_final_component() {
        assert_eq!(sanitized_name("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitized_name("../../etc/passwd").unwrap(), "passwd");
        assert!(sanitized_name("..").is_err());
    }
}
