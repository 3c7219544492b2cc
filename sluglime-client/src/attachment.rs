use std::fs;
use std::path::Path;

use sluglime_shared::validation::MAX_ATTACHMENT_BYTES;
use sluglime_shared::{Attachment, ValidationError};

const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Read a file from disk into an [`Attachment`].
///
/// The size limit is checked against file metadata before any bytes are read.
pub fn load_attachment(path: &Path) -> Result<Attachment, ValidationError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let metadata = fs::metadata(path).map_err(|e| ValidationError::UnreadableAttachment {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    if !metadata.is_file() {
        return Err(ValidationError::UnreadableAttachment {
            name,
            reason: "not a regular file".into(),
        });
    }
    if metadata.len() > MAX_ATTACHMENT_BYTES {
        return Err(ValidationError::AttachmentTooLarge {
            name,
            size: metadata.len(),
        });
    }

    let bytes = fs::read(path).map_err(|e| ValidationError::UnreadableAttachment {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    let content_type = detect_content_type(&name, &bytes);
    tracing::debug!(name = %name, content_type, size = bytes.len(), "attachment loaded");

    Attachment::new(name, content_type, bytes)
}

/// Determine the MIME type from magic bytes, falling back to the extension.
pub fn detect_content_type(file_name: &str, buf: &[u8]) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match infer::get(buf).map(|kind| kind.mime_type()) {
        // Office documents are zip containers; trust the extension there
        Some("application/zip") if extension == "docx" => DOCX,
        Some(mime_type) => mime_type,
        None => match extension.as_str() {
            "pdf" => "application/pdf",
            "docx" => DOCX,
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "mp4" => "video/mp4",
            _ => "application/octet-stream",
        },
    }
}
