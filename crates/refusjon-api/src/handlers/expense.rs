//! Expense ("utlegg") submission handler.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
};
use refusjon_core::{AccountNumber, ExpenseSubmission, SubmissionDate};
use refusjon_processing::pdf::{FormDocument, Section};

use crate::error::HttpAppError;
use crate::handlers::forms::FormFields;
use crate::notifications;
use crate::pipeline;
use crate::state::AppState;

fn parse_submission(form: &FormFields) -> Result<ExpenseSubmission, HttpAppError> {
    Ok(ExpenseSubmission {
        name: form.require("name")?,
        email: form.require("email")?,
        amount: form.require("amount")?,
        date: SubmissionDate::parse(&form.require("date")?)?,
        description: form.require("description")?,
        account_number: AccountNumber::parse(&form.require("accountNumber")?)?,
        receipt_urls: form.url_array("receipts")?,
        username: form.require("username")?,
        study: form.require("study")?,
        year: form.require("year")?,
        cc_email: form.optional("ccEmail"),
    })
}

fn build_document(submission: &ExpenseSubmission) -> FormDocument {
    FormDocument {
        logo: Some("TIHLDE".to_string()),
        title: None,
        corner_date: Some(submission.date.to_string()),
        sections: vec![
            Section::Pair {
                left: ("Fullt navn:".to_string(), submission.name.clone()),
                right: ("E-post:".to_string(), submission.email.clone()),
            },
            Section::Pair {
                left: (
                    "Kontonummer:".to_string(),
                    submission.account_number.to_string(),
                ),
                right: ("Beløp:".to_string(), submission.amount.clone()),
            },
            Section::Block {
                label: "Årsak til utlegg:".to_string(),
                value: submission.description.clone(),
            },
        ],
        attachment_heading: Some("Kvitteringer:".to_string()),
        attachment_caption: "Kvittering".to_string(),
        attachments: Vec::new(),
        signature: Some(format!(
            "{}: {} - {}",
            submission.username, submission.study, submission.year
        )),
    }
}

#[tracing::instrument(skip(state, multipart), fields(operation = "submit_expense"))]
pub async fn submit_expense(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<StatusCode, HttpAppError> {
    let form = FormFields::from_multipart(&mut multipart).await?;
    let submission = parse_submission(&form)?;

    let document = build_document(&submission);
    let receipt_urls = submission.receipt_urls.clone();
    pipeline::process_submission(
        &state,
        &submission.username,
        &receipt_urls,
        document,
        |attachments| notifications::expense_emails(&state.config, &submission, attachments),
    )
    .await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn valid_form() -> FormFields {
        form(&[
            ("name", "Ola Nordmann"),
            ("email", "ola@example.org"),
            ("amount", "450"),
            ("date", "2024-03-14"),
            ("description", "Pizza til arbeidskveld"),
            ("accountNumber", "12345678901"),
            ("receipts", r#"["https://blob/documents/1-a.jpg"]"#),
            ("username", "olanor"),
            ("study", "Dataingeniør"),
            ("year", "2023"),
        ])
    }

    #[test]
    fn parses_valid_submission() {
        let submission = parse_submission(&valid_form()).unwrap();
        assert_eq!(submission.name, "Ola Nordmann");
        assert_eq!(submission.date.to_string(), "14.03.2024");
        assert_eq!(submission.receipt_urls.len(), 1);
        assert_eq!(submission.cc_email, None);
    }

    #[test]
    fn rejects_bad_account_number() {
        let mut pairs: HashMap<String, String> = [
            ("name", "Ola"),
            ("email", "ola@example.org"),
            ("amount", "450"),
            ("date", "2024-03-14"),
            ("description", "x"),
            ("accountNumber", "123"),
            ("username", "olanor"),
            ("study", "Data"),
            ("year", "2023"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        pairs.insert("receipts".to_string(), "[]".to_string());

        let err = parse_submission(&FormFields::from_map(pairs)).unwrap_err();
        assert_eq!(refusjon_core::ErrorMetadata::http_status_code(&err.0), 400);
    }

    #[test]
    fn document_carries_expense_layout() {
        let submission = parse_submission(&valid_form()).unwrap();
        let document = build_document(&submission);

        assert_eq!(document.logo.as_deref(), Some("TIHLDE"));
        assert_eq!(document.corner_date.as_deref(), Some("14.03.2024"));
        assert_eq!(document.attachment_caption, "Kvittering");
        assert_eq!(
            document.signature.as_deref(),
            Some("olanor: Dataingeniør - 2023")
        );
        assert_eq!(document.sections.len(), 3);
    }
}
