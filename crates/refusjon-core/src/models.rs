//! Domain models
//!
//! Submission payloads are request-scoped values: nothing here is persisted in
//! an application database. The storage of record is the blob store and the
//! recipients' inboxes.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Norwegian bank account number, exactly 11 digits.
///
/// Transmitted digit-only, displayed grouped 4-2-5 ("1234 56 78901").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != 11 {
            return Err(AppError::InvalidInput(format!(
                "Account number must have 11 digits, got {}",
                digits.len()
            )));
        }
        Ok(AccountNumber(digits))
    }

    /// Digit-only form, as sent on the wire.
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", &self.0[..4], &self.0[4..6], &self.0[6..])
    }
}

/// Progressive input formatter: strip non-digits, cap at 11, group 4-2-5.
///
/// Partial input is grouped as far as it goes, so the format is stable while
/// the user is still typing.
pub fn format_account_number(value: &str) -> String {
    let digits: String = value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(11)
        .collect();

    if digits.len() <= 4 {
        digits
    } else if digits.len() <= 6 {
        format!("{} {}", &digits[..4], &digits[4..])
    } else {
        format!("{} {} {}", &digits[..4], &digits[4..6], &digits[6..])
    }
}

/// Submission date, carried as the calendar day the user picked.
///
/// Parsed by splitting the ISO string, never through a timezone-aware
/// conversion: the printed day must always equal the picked day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl SubmissionDate {
    /// Accepts `YYYY-MM-DD` or a full ISO timestamp (`YYYY-MM-DDTHH:MM:SSZ`);
    /// everything after `T` is ignored.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let date_part = input.split('T').next().unwrap_or(input);
        let parts: Vec<&str> = date_part.split('-').collect();
        if parts.len() != 3 {
            return Err(AppError::InvalidInput(format!(
                "Date must be YYYY-MM-DD, got '{}'",
                input
            )));
        }

        let year: u16 = parts[0]
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid year in date '{}'", input)))?;
        let month: u8 = parts[1]
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid month in date '{}'", input)))?;
        let day: u8 = parts[2]
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Invalid day in date '{}'", input)))?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(AppError::InvalidInput(format!(
                "Date out of range: '{}'",
                input
            )));
        }

        Ok(SubmissionDate { year, month, day })
    }
}

impl std::fmt::Display for SubmissionDate {
    /// Norwegian display format, dd.mm.yyyy.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}.{:02}.{}", self.day, self.month, self.year)
    }
}

/// Expense reimbursement form
#[derive(Debug, Clone)]
pub struct ExpenseSubmission {
    pub name: String,
    pub email: String,
    /// Monetary amount, carried as an opaque string (never parsed).
    pub amount: String,
    pub date: SubmissionDate,
    pub description: String,
    pub account_number: AccountNumber,
    /// Receipt image URLs, in upload order.
    pub receipt_urls: Vec<String>,
    pub username: String,
    pub study: String,
    pub year: String,
    /// Extra recipient for the acknowledgement email.
    pub cc_email: Option<String>,
}

/// Which support form was submitted; selects the recipient list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportVariant {
    Support,
    SportsClub,
}

impl SupportVariant {
    /// Wire value from the form's `formType` field; anything other than the
    /// sports-club marker is the plain support form.
    pub fn from_form_type(value: &str) -> Self {
        if value == "idrettslag" {
            SupportVariant::SportsClub
        } else {
            SupportVariant::Support
        }
    }
}

/// Support funding request form
#[derive(Debug, Clone)]
pub struct SupportSubmission {
    pub name: String,
    pub email: String,
    pub group_name: String,
    pub purpose: String,
    pub event_description: String,
    pub justification: String,
    pub total_amount: String,
    pub budget_link: Option<String>,
    pub summary: Option<String>,
    /// Budget image URLs, in upload order.
    pub image_urls: Vec<String>,
    pub username: String,
    pub study: String,
    pub year: String,
    pub variant: SupportVariant,
}

/// Board case submission form
#[derive(Debug, Clone)]
pub struct BoardCaseSubmission {
    pub contact_name: String,
    pub contact_email: String,
    pub username: String,
    pub case_name: String,
    pub case_type: String,
    pub background: String,
    pub assessment: String,
    pub recommendation: Option<String>,
    pub image_urls: Vec<String>,
}

/// Member profile as returned by the identity API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub study: GroupRef,
    pub studyyear: GroupRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRef {
    pub group: Group,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

/// A group membership from the identity API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub group: Group,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_number_formatter_strips_and_groups() {
        assert_eq!(format_account_number("1234"), "1234");
        assert_eq!(format_account_number("12345"), "1234 5");
        assert_eq!(format_account_number("123456"), "1234 56");
        assert_eq!(format_account_number("1234567"), "1234 56 7");
        assert_eq!(format_account_number("12345678901"), "1234 56 78901");
        // Non-digits stripped before grouping
        assert_eq!(format_account_number("1234.56.78901"), "1234 56 78901");
        assert_eq!(format_account_number("ab12cd34"), "1234");
    }

    #[test]
    fn account_number_formatter_caps_at_eleven_digits() {
        assert_eq!(format_account_number("123456789012345"), "1234 56 78901");
    }

    #[test]
    fn account_number_requires_eleven_digits() {
        assert!(AccountNumber::parse("1234567890").is_err());
        assert!(AccountNumber::parse("123456789012").is_err());

        let account = AccountNumber::parse("1234 56 78901").unwrap();
        assert_eq!(account.digits(), "12345678901");
        assert_eq!(account.to_string(), "1234 56 78901");
    }

    #[test]
    fn date_never_shifts_across_timezones() {
        // Midnight UTC on New Year's Day must never print as New Year's Eve,
        // whatever the server timezone is.
        let date = SubmissionDate::parse("2024-01-01T00:00:00.000Z").unwrap();
        assert_eq!(date.to_string(), "01.01.2024");

        let date = SubmissionDate::parse("2024-01-01").unwrap();
        assert_eq!(date.to_string(), "01.01.2024");
    }

    #[test]
    fn date_rejects_malformed_input() {
        assert!(SubmissionDate::parse("01.01.2024").is_err());
        assert!(SubmissionDate::parse("2024-13-01").is_err());
        assert!(SubmissionDate::parse("2024-00-10").is_err());
        assert!(SubmissionDate::parse("not-a-date").is_err());
    }

    #[test]
    fn support_variant_from_form_type() {
        assert_eq!(
            SupportVariant::from_form_type("idrettslag"),
            SupportVariant::SportsClub
        );
        assert_eq!(
            SupportVariant::from_form_type("support"),
            SupportVariant::Support
        );
        assert_eq!(SupportVariant::from_form_type(""), SupportVariant::Support);
    }

    #[test]
    fn user_profile_deserializes_nested_groups() {
        let json = serde_json::json!({
            "user_id": "olanor",
            "first_name": "Ola",
            "last_name": "Nordmann",
            "email": "ola@example.org",
            "study": { "group": { "name": "Dataingeniør" } },
            "studyyear": { "group": { "name": "2023" } }
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.study.group.name, "Dataingeniør");
        assert_eq!(profile.studyyear.group.name, "2023");
    }
}
