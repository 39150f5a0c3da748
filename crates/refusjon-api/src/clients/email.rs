//! Client for the organization's email API.
//!
//! One endpoint: POST the message as JSON with an `x-api-key` header. The API
//! answers 201 on success and `{"detail": ...}` on failure. No retry here;
//! the pipeline treats a failed send as a failed submission.

use refusjon_core::AppError;
use serde::{Deserialize, Serialize};

/// All portal mail goes out under one notification type.
const NOTIFICATION_TYPE: &str = "UTLEGG";

/// One outbound email: recipients, subject, ordered paragraphs, ordered
/// attachment URLs.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub emails: Vec<String>,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub attachments: Vec<String>,
    pub notification_type: &'static str,
}

impl EmailMessage {
    pub fn new(
        emails: Vec<String>,
        title: String,
        paragraphs: Vec<String>,
        attachments: Vec<String>,
    ) -> Self {
        EmailMessage {
            emails,
            title,
            paragraphs,
            attachments,
            notification_type: NOTIFICATION_TYPE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EmailClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        EmailClient {
            http,
            base_url,
            api_key,
        }
    }

    /// Send one email. Any status other than 201 is an upstream error carrying
    /// the API's own detail message.
    pub async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let start = std::time::Instant::now();

        let response = self
            .http
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Email API unreachable: {}", e)))?;

        let status = response.status();
        if status.as_u16() != 201 {
            let detail = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail.or(body.message))
                .unwrap_or_else(|| format!("Email API returned {}", status));

            tracing::error!(
                status = status.as_u16(),
                recipients = message.emails.len(),
                detail = %detail,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Email send failed"
            );
            return Err(AppError::Upstream(detail));
        }

        tracing::info!(
            recipients = message.emails.len(),
            attachments = message.attachments.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Email sent"
        );

        Ok(())
    }
}
