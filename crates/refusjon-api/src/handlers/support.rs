//! Support funding submission handler, including the sports-club variant.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
};
use refusjon_core::{SupportSubmission, SupportVariant};
use refusjon_processing::pdf::{FormDocument, Section};

use crate::error::HttpAppError;
use crate::handlers::forms::FormFields;
use crate::notifications;
use crate::pipeline;
use crate::state::AppState;

fn parse_submission(form: &FormFields) -> Result<SupportSubmission, HttpAppError> {
    let variant = form
        .optional("formType")
        .map(|value| SupportVariant::from_form_type(&value))
        .unwrap_or(SupportVariant::Support);

    Ok(SupportSubmission {
        name: form.require("name")?,
        email: form.require("email")?,
        group_name: form.require("groupName")?,
        purpose: form.require("purpose")?,
        event_description: form.require("eventDescription")?,
        justification: form.require("justification")?,
        total_amount: form.require("totalAmount")?,
        budget_link: form.optional("budgetLink"),
        summary: form.optional("summary"),
        image_urls: form.required_url_array("budgetImages")?,
        username: form.require("username")?,
        study: form.require("study")?,
        year: form.require("year")?,
        variant,
    })
}

fn build_document(submission: &SupportSubmission) -> FormDocument {
    let mut sections = vec![
        Section::Pair {
            left: ("Navn:".to_string(), submission.name.clone()),
            right: ("E-post:".to_string(), submission.email.clone()),
        },
        Section::Block {
            label: "Navn på gruppe:".to_string(),
            value: submission.group_name.clone(),
        },
        Section::Block {
            label: "Totalt søknadsbeløp:".to_string(),
            value: format!("{} NOK", submission.total_amount),
        },
        Section::Block {
            label: "Formål med søknad:".to_string(),
            value: submission.purpose.clone(),
        },
        Section::Block {
            label: "Beskrivelse av arrangement/produkt:".to_string(),
            value: submission.event_description.clone(),
        },
        Section::Block {
            label: "Begrunnelse for støtte:".to_string(),
            value: submission.justification.clone(),
        },
    ];

    if let Some(link) = &submission.budget_link {
        sections.push(Section::Block {
            label: "Lenke til budsjett:".to_string(),
            value: link.clone(),
        });
    }
    if let Some(summary) = &submission.summary {
        sections.push(Section::Block {
            label: "Oppsummering:".to_string(),
            value: summary.clone(),
        });
    }

    FormDocument {
        logo: Some("TIHLDE".to_string()),
        title: Some("Søknad om støtte".to_string()),
        corner_date: None,
        sections,
        attachment_heading: Some("Budsjett:".to_string()),
        attachment_caption: "Budsjettbilde".to_string(),
        attachments: Vec::new(),
        signature: Some(format!(
            "{}: {} - {}",
            submission.username, submission.study, submission.year
        )),
    }
}

#[tracing::instrument(skip(state, multipart), fields(operation = "submit_support"))]
pub async fn submit_support(
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
        |attachments| notifications::support_emails(&state.config, &submission, attachments),
    )
    .await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(extra: &[(&str, &str)]) -> FormFields {
        let mut pairs: Vec<(&str, &str)> = vec![
            ("name", "Kari Nordmann"),
            ("email", "kari@example.org"),
            ("groupName", "Pythons"),
            ("purpose", "Nytt utstyr"),
            ("eventDescription", "Treningsutstyr til laget"),
            ("justification", "Slitt utstyr"),
            ("totalAmount", "2500"),
            ("budgetImages", "[]"),
            ("username", "karnor"),
            ("study", "Dataingeniør"),
            ("year", "2023"),
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
    fn form_type_selects_variant() {
        let submission = parse_submission(&form(&[])).unwrap();
        assert_eq!(submission.variant, SupportVariant::Support);

        let submission = parse_submission(&form(&[("formType", "idrettslag")])).unwrap();
        assert_eq!(submission.variant, SupportVariant::SportsClub);
    }

    #[test]
    fn optional_sections_follow_input() {
        let submission = parse_submission(&form(&[])).unwrap();
        let document = build_document(&submission);
        assert_eq!(document.sections.len(), 6);

        let submission = parse_submission(&form(&[
            ("budgetLink", "https://docs.example.org/budsjett"),
            ("summary", "Kort oppsummering"),
        ]))
        .unwrap();
        let document = build_document(&submission);
        assert_eq!(document.sections.len(), 8);
        assert_eq!(document.title.as_deref(), Some("Søknad om støtte"));
    }

    #[test]
    fn budget_images_field_is_required() {
        let mut pairs: std::collections::HashMap<String, String> = [
            ("name", "Kari"),
            ("email", "kari@example.org"),
            ("groupName", "Pythons"),
            ("purpose", "x"),
            ("eventDescription", "x"),
            ("justification", "x"),
            ("totalAmount", "100"),
            ("username", "karnor"),
            ("study", "Data"),
            ("year", "2023"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        pairs.remove("budgetImages");

        assert!(parse_submission(&FormFields::from_map(pairs)).is_err());
    }
}
