//! Notification email construction.
//!
//! Every submission fans out exactly two emails with the same attachment
//! list: one to the responsible role address and one acknowledgement to the
//! submitter. Bodies are plain-text paragraph lists in Norwegian; blank
//! paragraphs (`" "`) act as spacing in the rendered mail.

use refusjon_core::{BoardCaseSubmission, Config, ExpenseSubmission, SupportSubmission, SupportVariant};

use crate::clients::email::EmailMessage;

/// The two emails a submission produces.
#[derive(Debug, Clone)]
pub struct EmailPair {
    pub organizational: EmailMessage,
    pub acknowledgement: EmailMessage,
}

const SPACER: &str = " ";

pub fn expense_emails(
    config: &Config,
    submission: &ExpenseSubmission,
    attachments: &[String],
) -> EmailPair {
    let account = submission.account_number.to_string();
    let date = submission.date.to_string();

    let mut organizational = vec![
        "Hei Finansminister!".to_string(),
        format!(
            "{} har sendt inn et utlegg. Se detaljer nedenfor:",
            submission.name
        ),
        SPACER.to_string(),
        "--- UTLEGGSDETALJER ---".to_string(),
        format!("Navn: {}", submission.name),
        format!("E-post: {}", submission.email),
        format!("Kontonummer: {}", account),
        format!("Beløp: {} NOK", submission.amount),
        format!("Dato: {}", date),
        format!("Studie: {}", submission.study),
        format!("Årskull: {}", submission.year),
        SPACER.to_string(),
        "ÅRSAK TIL UTLEGG:".to_string(),
        submission.description.clone(),
    ];

    if !submission.receipt_urls.is_empty() {
        organizational.push(SPACER.to_string());
        organizational.push(format!(
            "Antall kvitteringer: {}",
            submission.receipt_urls.len()
        ));
    }

    organizational.push(SPACER.to_string());
    organizational.push("PDF-skjema er vedlagt.".to_string());
    if !submission.receipt_urls.is_empty() {
        organizational.push("Kvitteringer er også vedlagt som separate filer.".to_string());
    }

    let mut acknowledgement = vec![
        format!("Hei {},", submission.name),
        SPACER.to_string(),
        "Takk for at du sendte inn utlegget. Her er en oppsummering:".to_string(),
        SPACER.to_string(),
        "--- DITT UTLEGG ---".to_string(),
        format!("Beløp: {} NOK", submission.amount),
        format!("Dato: {}", date),
        format!("Kontonummer: {}", account),
        SPACER.to_string(),
        "ÅRSAK:".to_string(),
        submission.description.clone(),
        SPACER.to_string(),
        "Utlegget er sendt til finansministeren. Du vil få svar så snart som mulig.".to_string(),
        "Hvis det er noen spørsmål om utlegget, vil du bli kontaktet av finansministeren."
            .to_string(),
        SPACER.to_string(),
        "PDF-skjema er vedlagt til denne e-posten.".to_string(),
    ];
    if !submission.receipt_urls.is_empty() {
        acknowledgement.push("Kvitteringer er også vedlagt som separate filer.".to_string());
    }

    let mut ack_recipients = vec![submission.email.clone()];
    if let Some(cc) = &submission.cc_email {
        ack_recipients.push(cc.clone());
    }

    EmailPair {
        organizational: EmailMessage::new(
            vec![config.finance_email.clone()],
            "Nytt utlegg".to_string(),
            organizational,
            attachments.to_vec(),
        ),
        acknowledgement: EmailMessage::new(
            ack_recipients,
            "Kvittering for innsendt utlegg".to_string(),
            acknowledgement,
            attachments.to_vec(),
        ),
    }
}

pub fn support_emails(
    config: &Config,
    submission: &SupportSubmission,
    attachments: &[String],
) -> EmailPair {
    let sports_club = submission.variant == SupportVariant::SportsClub;

    let recipient_emails = if sports_club {
        vec![config.sports_club_email.clone()]
    } else {
        vec![config.finance_email.clone(), config.board_email.clone()]
    };

    let recipient_title = if sports_club {
        "Hei Leder IdKom!"
    } else {
        "Hei Finansminister!"
    };
    let form_type_label = if sports_club {
        "søknad om støtte for idrettslag"
    } else {
        "søknad om støtte"
    };

    let mut organizational = vec![
        recipient_title.to_string(),
        format!(
            "{} har sendt inn en {}. Se detaljer nedenfor:",
            submission.name, form_type_label
        ),
        SPACER.to_string(),
        "--- SØKNADSDETALJER ---".to_string(),
        format!("Navn: {}", submission.name),
        format!("E-post: {}", submission.email),
        format!("Gruppe: {}", submission.group_name),
        format!("Studie: {}", submission.study),
        format!("Årskull: {}", submission.year),
        format!("Totalt søknadsbeløp: {} NOK", submission.total_amount),
        SPACER.to_string(),
        "FORMÅL MED SØKNAD:".to_string(),
        submission.purpose.clone(),
        SPACER.to_string(),
        "BESKRIVELSE AV ARRANGEMENT/PRODUKT:".to_string(),
        submission.event_description.clone(),
        SPACER.to_string(),
        "BEGRUNNELSE FOR STØTTE:".to_string(),
        submission.justification.clone(),
    ];

    if let Some(link) = &submission.budget_link {
        organizational.push(SPACER.to_string());
        organizational.push(format!("Lenke til budsjett: {}", link));
    }

    if !submission.image_urls.is_empty() {
        organizational.push(SPACER.to_string());
        organizational.push(format!(
            "Antall budsjettbilder: {}",
            submission.image_urls.len()
        ));
    }

    if let Some(summary) = &submission.summary {
        organizational.push(SPACER.to_string());
        organizational.push("OPPSUMMERING:".to_string());
        organizational.push(summary.clone());
    }

    organizational.push(SPACER.to_string());
    organizational.push("PDF-skjema er vedlagt.".to_string());
    if !submission.image_urls.is_empty() {
        organizational.push("Budsjettbilder er også vedlagt som separate filer.".to_string());
    }

    let recipient_name = if sports_club {
        "Leder IdKom"
    } else {
        "finansministeren"
    };
    let variant_suffix = if sports_club { " for idrettslag" } else { "" };

    let mut acknowledgement = vec![
        format!("Hei {},", submission.name),
        SPACER.to_string(),
        format!(
            "Takk for at du sendte inn søknaden om støtte{}. Her er en oppsummering:",
            variant_suffix
        ),
        SPACER.to_string(),
        "--- DIN SØKNAD ---".to_string(),
        format!("Gruppe: {}", submission.group_name),
        format!("Totalt søknadsbeløp: {} NOK", submission.total_amount),
        SPACER.to_string(),
        "FORMÅL:".to_string(),
        submission.purpose.clone(),
        SPACER.to_string(),
        "BESKRIVELSE:".to_string(),
        submission.event_description.clone(),
        SPACER.to_string(),
        "BEGRUNNELSE:".to_string(),
        submission.justification.clone(),
    ];

    if let Some(summary) = &submission.summary {
        acknowledgement.push(SPACER.to_string());
        acknowledgement.push("OPPSUMMERING:".to_string());
        acknowledgement.push(summary.clone());
    }

    acknowledgement.push(SPACER.to_string());
    acknowledgement.push(format!(
        "Søknaden er sendt til {}. Du vil få svar så snart som mulig.",
        recipient_name
    ));
    acknowledgement.push(format!(
        "Hvis det er noen spørsmål om søknaden, vil du bli kontaktet av {}.",
        recipient_name
    ));
    acknowledgement.push(SPACER.to_string());
    acknowledgement.push("PDF-skjema er vedlagt til denne e-posten.".to_string());
    if !submission.image_urls.is_empty() {
        acknowledgement.push("Budsjettbilder er også vedlagt som separate filer.".to_string());
    }

    let subject_suffix = if sports_club { " - idrettslag" } else { "" };

    EmailPair {
        organizational: EmailMessage::new(
            recipient_emails,
            format!("Ny søknad om støtte{}", subject_suffix),
            organizational,
            attachments.to_vec(),
        ),
        acknowledgement: EmailMessage::new(
            vec![submission.email.clone()],
            format!("Kvittering for søknad om støtte{}", subject_suffix),
            acknowledgement,
            attachments.to_vec(),
        ),
    }
}

pub fn board_case_emails(
    config: &Config,
    submission: &BoardCaseSubmission,
    attachments: &[String],
) -> EmailPair {
    let mut organizational = vec![
        "Til Hovedstyret!".to_string(),
        SPACER.to_string(),
        format!(
            "{} har meldt inn en ny sak. Se detaljer nedenfor:",
            submission.contact_name
        ),
        SPACER.to_string(),
        "--- SAKSDETALJER ---".to_string(),
        format!("Saksbehandler: {}", submission.contact_name),
        format!("E-post: {}", submission.contact_email),
        format!("Navn på saken: {}", submission.case_name),
        format!("Type: {}", submission.case_type),
        SPACER.to_string(),
        "BAKGRUNN:".to_string(),
        submission.background.clone(),
        SPACER.to_string(),
        "VURDERING:".to_string(),
        submission.assessment.clone(),
    ];

    if let Some(recommendation) = &submission.recommendation {
        organizational.push(SPACER.to_string());
        organizational.push("INNSTILLING:".to_string());
        organizational.push(recommendation.clone());
    }

    organizational.push(SPACER.to_string());
    organizational.push("Fullstendig saksdokument er vedlagt som PDF.".to_string());

    let acknowledgement = vec![
        format!("Hei {},", submission.contact_name),
        SPACER.to_string(),
        "Takk for at du meldte inn saken. Den er nå videresendt til HS.".to_string(),
        SPACER.to_string(),
        "--- DIN INNMELDTE SAK ---".to_string(),
        format!("Navn på saken: {}", submission.case_name),
        format!("Type: {}", submission.case_type),
        SPACER.to_string(),
        "PDF-kopi av saksdokumentet er vedlagt til denne e-posten.".to_string(),
    ];

    EmailPair {
        organizational: EmailMessage::new(
            vec![config.board_email.clone()],
            format!(
                "Ny {} - {}",
                submission.case_type.to_lowercase(),
                submission.case_name
            ),
            organizational,
            attachments.to_vec(),
        ),
        acknowledgement: EmailMessage::new(
            vec![submission.contact_email.clone()],
            format!("Kvittering for innsendt sak: {}", submission.case_name),
            acknowledgement,
            attachments.to_vec(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refusjon_core::{AccountNumber, StorageBackend, SubmissionDate};

    fn config() -> Config {
        Config {
            server_port: 4000,
            environment: "development".to_string(),
            session_cookie_name: "session".to_string(),
            identity_api_url: "http://localhost:9000".to_string(),
            email_api_url: "http://localhost:9001".to_string(),
            email_api_key: "key".to_string(),
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/refusjon".to_string()),
            local_storage_base_url: Some("http://localhost:4000/media".to_string()),
            spool_dir: "spool".to_string(),
            max_upload_files: 5,
            max_file_size_bytes: 10 * 1024 * 1024,
            finance_email: "finansminister@tihlde.org".to_string(),
            board_email: "hs@tihlde.org".to_string(),
            sports_club_email: "lederidkom@tihlde.org".to_string(),
        }
    }

    fn support_submission(variant: SupportVariant) -> SupportSubmission {
        SupportSubmission {
            name: "Kari Nordmann".to_string(),
            email: "kari@example.org".to_string(),
            group_name: "Pythons".to_string(),
            purpose: "Nytt utstyr".to_string(),
            event_description: "Treningsutstyr til laget".to_string(),
            justification: "Slitt utstyr".to_string(),
            total_amount: "2500".to_string(),
            budget_link: None,
            summary: None,
            image_urls: vec![],
            username: "karnor".to_string(),
            study: "Dataingeniør".to_string(),
            year: "2023".to_string(),
            variant,
        }
    }

    fn expense_submission() -> ExpenseSubmission {
        ExpenseSubmission {
            name: "Ola Nordmann".to_string(),
            email: "ola@example.org".to_string(),
            amount: "450".to_string(),
            date: SubmissionDate::parse("2024-03-14").unwrap(),
            description: "Pizza til arbeidskveld".to_string(),
            account_number: AccountNumber::parse("12345678901").unwrap(),
            receipt_urls: vec!["https://blob/documents/1-a.jpg".to_string()],
            username: "olanor".to_string(),
            study: "Dataingeniør".to_string(),
            year: "2023".to_string(),
            cc_email: None,
        }
    }

    #[test]
    fn both_emails_carry_identical_attachments() {
        let attachments = vec![
            "https://blob/documents/1-a.jpg".to_string(),
            "https://blob/documents/2-skjema.pdf".to_string(),
        ];
        let pair = support_emails(
            &config(),
            &support_submission(SupportVariant::Support),
            &attachments,
        );
        assert_eq!(pair.organizational.attachments, attachments);
        assert_eq!(pair.acknowledgement.attachments, attachments);

        let pair = expense_emails(&config(), &expense_submission(), &attachments);
        assert_eq!(pair.organizational.attachments, pair.acknowledgement.attachments);
    }

    #[test]
    fn support_variant_selects_recipients_and_subject() {
        let pair = support_emails(&config(), &support_submission(SupportVariant::Support), &[]);
        assert_eq!(
            pair.organizational.emails,
            vec!["finansminister@tihlde.org", "hs@tihlde.org"]
        );
        assert_eq!(pair.organizational.title, "Ny søknad om støtte");
        assert_eq!(pair.organizational.paragraphs[0], "Hei Finansminister!");

        let pair = support_emails(
            &config(),
            &support_submission(SupportVariant::SportsClub),
            &[],
        );
        assert_eq!(pair.organizational.emails, vec!["lederidkom@tihlde.org"]);
        assert_eq!(pair.organizational.title, "Ny søknad om støtte - idrettslag");
        assert_eq!(pair.organizational.paragraphs[0], "Hei Leder IdKom!");
        assert_eq!(
            pair.acknowledgement.title,
            "Kvittering for søknad om støtte - idrettslag"
        );
    }

    #[test]
    fn optional_support_sections_only_appear_when_present() {
        let pair = support_emails(&config(), &support_submission(SupportVariant::Support), &[]);
        assert!(!pair
            .organizational
            .paragraphs
            .iter()
            .any(|p| p.starts_with("Lenke til budsjett")));
        assert!(!pair
            .organizational
            .paragraphs
            .contains(&"OPPSUMMERING:".to_string()));

        let mut submission = support_submission(SupportVariant::Support);
        submission.budget_link = Some("https://docs.example.org/budsjett".to_string());
        submission.summary = Some("Kort oppsummering".to_string());
        submission.image_urls = vec!["https://blob/documents/1-b.png".to_string()];

        let pair = support_emails(&config(), &submission, &[]);
        let paragraphs = &pair.organizational.paragraphs;
        assert!(paragraphs.contains(&"Lenke til budsjett: https://docs.example.org/budsjett".to_string()));
        assert!(paragraphs.contains(&"Antall budsjettbilder: 1".to_string()));
        assert!(paragraphs.contains(&"OPPSUMMERING:".to_string()));
        assert!(paragraphs.contains(&"Budsjettbilder er også vedlagt som separate filer.".to_string()));
    }

    #[test]
    fn expense_cc_is_appended_to_acknowledgement_only() {
        let mut submission = expense_submission();
        submission.cc_email = Some("kasserer@example.org".to_string());

        let pair = expense_emails(&config(), &submission, &[]);
        assert_eq!(pair.organizational.emails, vec!["finansminister@tihlde.org"]);
        assert_eq!(
            pair.acknowledgement.emails,
            vec!["ola@example.org", "kasserer@example.org"]
        );
    }

    #[test]
    fn expense_body_uses_display_formats() {
        let pair = expense_emails(&config(), &expense_submission(), &[]);
        let paragraphs = &pair.organizational.paragraphs;
        assert!(paragraphs.contains(&"Kontonummer: 1234 56 78901".to_string()));
        assert!(paragraphs.contains(&"Dato: 14.03.2024".to_string()));
        assert!(paragraphs.contains(&"Beløp: 450 NOK".to_string()));
    }

    #[test]
    fn board_case_subject_lowercases_case_type() {
        let submission = BoardCaseSubmission {
            contact_name: "Per Hansen".to_string(),
            contact_email: "per@example.org".to_string(),
            username: "perhan".to_string(),
            case_name: "Nytt kjellerlokale".to_string(),
            case_type: "Diskusjonssak".to_string(),
            background: "Lokalet er for lite".to_string(),
            assessment: "Behov for mer plass".to_string(),
            recommendation: None,
            image_urls: vec![],
        };

        let pair = board_case_emails(&config(), &submission, &[]);
        assert_eq!(
            pair.organizational.title,
            "Ny diskusjonssak - Nytt kjellerlokale"
        );
        assert_eq!(pair.organizational.emails, vec!["hs@tihlde.org"]);
        assert!(!pair
            .organizational
            .paragraphs
            .contains(&"INNSTILLING:".to_string()));

        let with_recommendation = BoardCaseSubmission {
            recommendation: Some("Godkjennes".to_string()),
            ..submission
        };
        let pair = board_case_emails(&config(), &with_recommendation, &[]);
        assert!(pair
            .organizational
            .paragraphs
            .contains(&"INNSTILLING:".to_string()));
    }
}
