//! Multipart form field collection.
//!
//! The submission forms post plain text fields plus JSON-encoded URL arrays.
//! Fields are drained into a map first so handlers can validate in one place
//! before any side effect runs.

use std::collections::HashMap;

use axum::extract::Multipart;
use refusjon_core::AppError;

use crate::error::HttpAppError;

#[derive(Debug, Default)]
pub struct FormFields {
    fields: HashMap<String, String>,
}

impl FormFields {
    /// Drain every text field from a multipart body.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, HttpAppError> {
        let mut fields = HashMap::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(|n| n.to_string()) else {
                continue;
            };
            let value = field.text().await?;
            fields.insert(name, value);
        }
        Ok(FormFields { fields })
    }

    #[cfg(test)]
    pub fn from_map(fields: HashMap<String, String>) -> Self {
        FormFields { fields }
    }

    /// A required field; empty counts as missing.
    pub fn require(&self, name: &str) -> Result<String, AppError> {
        match self.fields.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.clone()),
            _ => Err(AppError::InvalidInput(format!(
                "Mangler påkrevd felt: {}",
                name
            ))),
        }
    }

    /// An optional field; empty strings become `None`.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }

    /// Parse a field holding a JSON array of URLs. A missing field is an
    /// empty list; malformed JSON is a validation error.
    pub fn url_array(&self, name: &str) -> Result<Vec<String>, AppError> {
        match self.optional(name) {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::InvalidInput(format!("Ugyldig JSON i feltet '{}': {}", name, e))
            }),
        }
    }

    /// Like [`url_array`](Self::url_array) but the field must be present.
    pub fn required_url_array(&self, name: &str) -> Result<Vec<String>, AppError> {
        let raw = self.require(name)?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::InvalidInput(format!("Ugyldig JSON i feltet '{}': {}", name, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn require_rejects_missing_and_empty() {
        let form = fields(&[("name", "Ola"), ("blank", "  ")]);
        assert_eq!(form.require("name").unwrap(), "Ola");
        assert!(matches!(
            form.require("email"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(form.require("blank").is_err());
    }

    #[test]
    fn optional_maps_empty_to_none() {
        let form = fields(&[("summary", ""), ("link", "https://x")]);
        assert_eq!(form.optional("summary"), None);
        assert_eq!(form.optional("link"), Some("https://x".to_string()));
    }

    #[test]
    fn url_array_parses_and_defaults_empty() {
        let form = fields(&[("images", r#"["https://a", "https://b"]"#)]);
        assert_eq!(
            form.url_array("images").unwrap(),
            vec!["https://a".to_string(), "https://b".to_string()]
        );
        assert_eq!(form.url_array("missing").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        let form = fields(&[("images", "not json")]);
        assert!(matches!(
            form.url_array("images"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(form.required_url_array("images").is_err());
    }
}
