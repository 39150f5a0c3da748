//! Batch image intake.
//!
//! `POST /api/upload` takes repeated `file` parts, normalizes HEIC/HEIF to
//! JPEG through the conversion ladder, and stores everything else as-is. The
//! batch is all-or-nothing only at the count check; per-file conversion
//! outcomes surface as structured warnings, not failures.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Multipart, State},
    Json,
};
use refusjon_core::AppError;
use refusjon_processing::{mime, ConversionOutcome};
use refusjon_storage::keys;
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// "uploaded", "converted" or "skipped".
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

struct IncomingFile {
    name: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

fn jpeg_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) => format!("{}.jpg", stem),
        None => format!("{}.jpg", name),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[tracing::instrument(skip(state, multipart), fields(operation = "upload_images"))]
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut incoming: Vec<IncomingFile> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "file".to_string());
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field.bytes().await?.to_vec();

        incoming.push(IncomingFile {
            name,
            content_type,
            data,
        });

        // Reject the whole batch; no partial acceptance.
        if incoming.len() > state.config.max_upload_files {
            return Err(HttpAppError(AppError::InvalidInput(format!(
                "Maks {} bilder kan lastes opp samtidig",
                state.config.max_upload_files
            ))));
        }
    }

    if incoming.is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "Ingen fil lagt ved".to_string(),
        )));
    }

    let mut files = Vec::with_capacity(incoming.len());

    for file in incoming {
        let entry = if mime::is_heic(&file.name) {
            let ladder = Arc::clone(&state.ladder);
            let data = file.data.clone();
            let outcome = tokio::task::spawn_blocking(move || ladder.convert(&data))
                .await
                .map_err(|e| AppError::Internal(format!("Conversion task failed: {}", e)))?;

            match outcome {
                ConversionOutcome::Converted(jpeg) => {
                    let name = jpeg_name(&file.name);
                    let key = keys::document_key(now_millis(), &name);
                    let url = state
                        .storage
                        .upload(&key, "image/jpeg", jpeg)
                        .await
                        .map_err(HttpAppError::from)?;
                    UploadedFile {
                        name,
                        url: Some(url),
                        status: "converted",
                        warning: None,
                    }
                }
                ConversionOutcome::Unsupported(reason) => {
                    tracing::warn!(file = %file.name, reason = %reason, "Image skipped");
                    UploadedFile {
                        name: file.name,
                        url: None,
                        status: "skipped",
                        warning: Some(format!(
                            "Filformatet støttes ikke og bildet ble hoppet over: {}",
                            reason
                        )),
                    }
                }
                ConversionOutcome::Failed(reason) => {
                    tracing::warn!(file = %file.name, reason = %reason, "Conversion failed, uploading original");
                    let mime_type =
                        mime::resolve_mime(file.content_type.as_deref(), &file.name);
                    let key = keys::document_key(now_millis(), &file.name);
                    let url = state
                        .storage
                        .upload(&key, mime_type, file.data)
                        .await
                        .map_err(HttpAppError::from)?;
                    UploadedFile {
                        name: file.name,
                        url: Some(url),
                        status: "uploaded",
                        warning: Some(
                            "Kunne ikke konvertere bildet; originalfilen ble lastet opp og vises kanskje ikke i e-poster"
                                .to_string(),
                        ),
                    }
                }
            }
        } else {
            let mime_type = mime::resolve_mime(file.content_type.as_deref(), &file.name);
            let key = keys::document_key(now_millis(), &file.name);
            let url = state
                .storage
                .upload(&key, mime_type, file.data)
                .await
                .map_err(HttpAppError::from)?;
            UploadedFile {
                name: file.name,
                url: Some(url),
                status: "uploaded",
                warning: None,
            }
        };

        files.push(entry);
    }

    Ok(Json(UploadResponse { files }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_name_replaces_extension() {
        assert_eq!(jpeg_name("IMG_0042.HEIC"), "IMG_0042.jpg");
        assert_eq!(jpeg_name("photo.heif"), "photo.jpg");
        assert_eq!(jpeg_name("noext"), "noext.jpg");
    }

    #[test]
    fn upload_response_omits_absent_fields() {
        let response = UploadResponse {
            files: vec![UploadedFile {
                name: "a.jpg".to_string(),
                url: Some("https://blob/documents/1-a.jpg".to_string()),
                status: "uploaded",
                warning: None,
            }],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["files"][0].get("warning").is_none());
        assert_eq!(json["files"][0]["status"], "uploaded");
    }
}
