//! Board case ("HS-sak") submission handler.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
};
use refusjon_core::BoardCaseSubmission;
use refusjon_processing::pdf::{FormDocument, Section};

use crate::error::HttpAppError;
use crate::handlers::forms::FormFields;
use crate::notifications;
use crate::pipeline;
use crate::state::AppState;

fn parse_submission(form: &FormFields) -> Result<BoardCaseSubmission, HttpAppError> {
    Ok(BoardCaseSubmission {
        contact_name: form.require("contactName")?,
        contact_email: form.require("contactEmail")?,
        username: form.require("username")?,
        case_name: form.require("caseName")?,
        case_type: form.require("caseType")?,
        background: form.require("background")?,
        assessment: form.require("assessment")?,
        recommendation: form.optional("recommendation"),
        image_urls: form.url_array("images")?,
    })
}

fn build_document(submission: &BoardCaseSubmission) -> FormDocument {
    let mut sections = vec![
        Section::Pair {
            left: ("Navn på saken:".to_string(), submission.case_name.clone()),
            right: ("Type sak:".to_string(), submission.case_type.clone()),
        },
        Section::Block {
            label: "Kort beskrivelse / bakgrunn:".to_string(),
            value: submission.background.clone(),
        },
        Section::Block {
            label: "Saksbehandlers vurdering:".to_string(),
            value: submission.assessment.clone(),
        },
    ];

    if let Some(recommendation) = &submission.recommendation {
        sections.push(Section::Block {
            label: "Saksbehandlers innstilling:".to_string(),
            value: recommendation.clone(),
        });
    }

    FormDocument {
        logo: Some("TIHLDE".to_string()),
        title: Some("Innmeldt sak til HS".to_string()),
        corner_date: None,
        sections,
        attachment_heading: Some("Vedlegg:".to_string()),
        attachment_caption: "Vedlegg".to_string(),
        attachments: Vec::new(),
        signature: Some(format!(
            "{}: {}",
            submission.contact_name, submission.contact_email
        )),
    }
}

#[tracing::instrument(skip(state, multipart), fields(operation = "submit_board_case"))]
pub async fn submit_board_case(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<StatusCode, HttpAppError> {
    let form = FormFields::from_multipart(&mut multipart).await?;
    let submission = parse_submission(&form)?;

    let document = build_document(&submission);
    let image_urls = submission.image_urls.clone();
    pipeline::process_submission(
        &state,
        &submission.username,
        &image_urls,
        document,
        |attachments| notifications::board_case_emails(&state.config, &submission, attachments),
    )
    .await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(extra: &[(&str, &str)]) -> FormFields {
        let mut pairs: Vec<(&str, &str)> = vec![
            ("contactName", "Per Hansen"),
            ("contactEmail", "per@example.org"),
            ("username", "perhan"),
            ("caseName", "Nytt kjellerlokale"),
            ("caseType", "Diskusjonssak"),
            ("background", "Lokalet er for lite"),
            ("assessment", "Behov for mer plass"),
        ];
        pairs.extend_from_slice(extra);
        FormFields::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn images_field_is_optional() {
        let submission = parse_submission(&form(&[])).unwrap();
        assert!(submission.image_urls.is_empty());
        assert_eq!(submission.recommendation, None);

        let submission =
            parse_submission(&form(&[("images", r#"["https://blob/documents/1-a.png"]"#)]))
                .unwrap();
        assert_eq!(submission.image_urls.len(), 1);
    }

    #[test]
    fn recommendation_adds_a_section() {
        let document = build_document(&parse_submission(&form(&[])).unwrap());
        assert_eq!(document.sections.len(), 3);

        let document = build_document(
            &parse_submission(&form(&[("recommendation", "Godkjennes")])).unwrap(),
        );
        assert_eq!(document.sections.len(), 4);
        assert_eq!(document.title.as_deref(), Some("Innmeldt sak til HS"));
    }
}
