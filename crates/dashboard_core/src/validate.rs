//! Client-side form checks. A failed check blocks submission; nothing is sent.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// Digits with optional leading +, allowing spaces, slashes, dashes and parentheses.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 /()\-]{5,19}$").expect("valid phone pattern"));

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "Pflichtfeld"));
    }
    Ok(())
}

pub fn validate_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    validate_required(field, value)?;
    if !EMAIL.is_match(value.trim()) {
        return Err(ValidationError::new(field, "Ungültige E-Mail-Adresse"));
    }
    Ok(())
}

pub fn validate_phone(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !PHONE.is_match(value.trim()) {
        return Err(ValidationError::new(field, "Ungültige Telefonnummer"));
    }
    Ok(())
}

pub fn validate_password(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            field,
            format!("Passwort muss mindestens {MIN_PASSWORD_LEN} Zeichen lang sein"),
        ));
    }
    Ok(())
}

/// Artist creation form, serialized with the artist service's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArtist {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "E-Mail")]
    pub email: String,
    pub calendar: String,
    pub role: String,
    #[serde(rename = "Phone", skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
}

impl NewArtist {
    /// Checks the fields in form order and reports the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("Name", &self.name)?;
        validate_email("E-Mail", &self.email)?;
        validate_required("calendar", &self.calendar)?;
        validate_required("role", &self.role)?;
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            validate_phone("Phone", phone)?;
        }
        Ok(())
    }
}
