//! Submission processing pipeline.
//!
//! Every form handler funnels into [`process_submission`]: re-fetch the
//! already-uploaded receipt images, normalize them to JPEG, render the PDF,
//! spool it to disk, upload it to blob storage, fan out the two notification
//! emails, and finally remove the spool file. Failures before the upload
//! abort the submission with nothing persisted; an email failure after the
//! upload leaves the PDF in place and is reported as an error.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use refusjon_core::AppError;
use refusjon_processing::{mime, ConversionLadder, ConversionOutcome, FormDocument};
use refusjon_storage::keys;
use uuid::Uuid;

use crate::notifications::EmailPair;
use crate::state::AppState;

/// A receipt image fetched back from blob storage, before normalization.
struct FetchedImage {
    url: String,
    mime: &'static str,
    data: Vec<u8>,
}

/// Spool filename for a rendered form: `{username}-{uuid}.pdf`.
fn spool_filename(username: &str) -> String {
    format!("{}-{}.pdf", username, Uuid::new_v4())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Fetch every image URL concurrently. Any single failure fails the whole
/// batch; a submission must never go out with a partial attachment set.
async fn fetch_images(state: &AppState, urls: &[String]) -> Result<Vec<FetchedImage>, AppError> {
    let fetches = urls.iter().map(|url| {
        let http = state.http.clone();
        let url = url.clone();
        async move {
            let response = http
                .get(&url)
                .send()
                .await
                .map_err(|e| AppError::Upstream(format!("Failed to fetch image {}: {}", url, e)))?;

            if !response.status().is_success() {
                return Err(AppError::Upstream(format!(
                    "Failed to fetch image {}: status {}",
                    url,
                    response.status()
                )));
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            let data = response
                .bytes()
                .await
                .map_err(|e| AppError::Upstream(format!("Failed to read image {}: {}", url, e)))?;

            let resolved = mime::resolve_mime(content_type.as_deref(), &url);
            Ok(FetchedImage {
                url,
                mime: resolved,
                data: data.to_vec(),
            })
        }
    });

    futures::future::try_join_all(fetches).await
}

/// Normalize fetched images to JPEG for embedding in the PDF.
///
/// At this stage a conversion failure is fatal: the image was accepted at
/// upload time, so a document without it would be silently incomplete.
fn normalize_images(
    ladder: &ConversionLadder,
    images: Vec<FetchedImage>,
) -> Result<Vec<Vec<u8>>, AppError> {
    images
        .into_iter()
        .map(|image| {
            if image.mime == "image/jpeg" && !mime::is_heic(&image.url) {
                return Ok(image.data);
            }
            match ladder.convert(&image.data) {
                ConversionOutcome::Converted(jpeg) => Ok(jpeg),
                ConversionOutcome::Unsupported(format) => Err(AppError::ImageProcessing(format!(
                    "Unsupported image format '{}' for {}",
                    format, image.url
                ))),
                ConversionOutcome::Failed(reason) => Err(AppError::ImageProcessing(format!(
                    "Failed to convert {}: {}",
                    image.url, reason
                ))),
            }
        })
        .collect()
}

/// Run the full pipeline for one submission.
///
/// `build_emails` receives the attachment URL list (images first, PDF last)
/// and returns the organizational/acknowledgement pair. Returns the uploaded
/// PDF URL on success.
pub async fn process_submission<F>(
    state: &AppState,
    username: &str,
    image_urls: &[String],
    mut document: FormDocument,
    build_emails: F,
) -> Result<String, AppError>
where
    F: FnOnce(&[String]) -> EmailPair,
{
    let start = std::time::Instant::now();

    // 1. Re-fetch and normalize the images.
    let fetched = fetch_images(state, image_urls).await?;
    let ladder = Arc::clone(&state.ladder);
    let attachments = tokio::task::spawn_blocking(move || normalize_images(&ladder, fetched))
        .await
        .map_err(|e| AppError::Internal(format!("Image normalization task failed: {}", e)))??;

    // 2. Render the PDF off the async runtime.
    document.attachments = attachments;
    let pdf_bytes = tokio::task::spawn_blocking(move || document.render())
        .await
        .map_err(|e| AppError::Internal(format!("Document render task failed: {}", e)))?
        .map_err(|e| AppError::DocumentRender(e.to_string()))?;

    // 3. Spool to disk before touching blob storage.
    let spool_dir = state.spool_dir();
    tokio::fs::create_dir_all(&spool_dir).await?;
    let filename = spool_filename(username);
    let spool_path: PathBuf = spool_dir.join(&filename);
    tokio::fs::write(&spool_path, &pdf_bytes).await?;

    // 4. Upload. Failure here means no emails go out.
    let storage_key = keys::document_key(now_millis(), &filename);
    let document_url = state
        .storage
        .upload(&storage_key, "application/pdf", pdf_bytes)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    // 5. Both emails, joined. Either failure fails the submission, but the
    //    uploaded PDF stays put so the submission can be recovered manually.
    let mut attachment_urls: Vec<String> = image_urls.to_vec();
    attachment_urls.push(document_url.clone());

    let pair = build_emails(&attachment_urls);
    let (org_result, ack_result) = tokio::join!(
        state.email.send(&pair.organizational),
        state.email.send(&pair.acknowledgement)
    );
    if let Err(e) = org_result.and(ack_result) {
        tracing::warn!(
            document_url = %document_url,
            error = %e,
            "Email dispatch failed after document upload; PDF remains in storage"
        );
        return Err(e);
    }

    // 6. Spool cleanup is best-effort.
    if let Err(e) = tokio::fs::remove_file(&spool_path).await {
        tracing::warn!(
            path = %spool_path.display(),
            error = %e,
            "Failed to remove spooled document"
        );
    }

    tracing::info!(
        username = %username,
        images = image_urls.len(),
        document_url = %document_url,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Submission processed"
    );

    Ok(document_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spool_filename_embeds_username_and_is_unique() {
        let a = spool_filename("olanor");
        let b = spool_filename("olanor");
        assert!(a.starts_with("olanor-"));
        assert!(a.ends_with(".pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn normalize_keeps_plain_jpegs_untouched() {
        let ladder = ConversionLadder::new(vec![]);
        let data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02];
        let images = vec![FetchedImage {
            url: "https://blob/documents/1-a.jpg".to_string(),
            mime: "image/jpeg",
            data: data.clone(),
        }];

        let out = normalize_images(&ladder, images).unwrap();
        assert_eq!(out, vec![data]);
    }

    #[test]
    fn normalize_fails_on_undecodable_non_jpeg() {
        let ladder = ConversionLadder::standard();
        let images = vec![FetchedImage {
            url: "https://blob/documents/1-a.png".to_string(),
            mime: "image/png",
            data: vec![0x00, 0x01, 0x02],
        }];

        let err = normalize_images(&ladder, images).unwrap_err();
        assert!(matches!(err, AppError::ImageProcessing(_)));
    }
}
