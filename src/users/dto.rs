use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Partial update: absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::Validation(format!("{field} must not be blank"))),
    }
}

fn checked_email(email: &str) -> AppResult<String> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AppError::Validation(format!("Invalid email: {email}")));
    }
    Ok(email.to_string())
}

impl CreateUserBody {
    /// Returns the trimmed `(name, email)` pair.
    pub fn validate(&self) -> AppResult<(String, String)> {
        let name = required(self.name.as_deref(), "name")?;
        let email = required(self.email.as_deref(), "email")?;
        Ok((name, checked_email(&email)?))
    }
}

impl PatchUserBody {
    pub fn validate(&self) -> AppResult<(Option<String>, Option<String>)> {
        let name = self
            .name
            .as_deref()
            .map(|n| required(Some(n), "name"))
            .transpose()?;
        let email = self.email.as_deref().map(checked_email).transpose()?;
        Ok((name, email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_valid_email("john@example.com"));
        assert!(!is_valid_email("john.example.com"));
        assert!(!is_valid_email("john@example"));
        assert!(!is_valid_email("jo hn@example.com"));
    }

    #[test]
    fn create_requires_name_and_email() {
        let body = CreateUserBody {
            name: Some("  John Doe ".into()),
            email: Some("john@example.com".into()),
        };
        assert_eq!(
            body.validate().unwrap(),
            ("John Doe".to_string(), "john@example.com".to_string())
        );

        let blank = CreateUserBody {
            name: Some("   ".into()),
            email: Some("john@example.com".into()),
        };
        assert!(matches!(blank.validate(), Err(AppError::Validation(_))));

        let missing = CreateUserBody {
            name: Some("John".into()),
            email: None,
        };
        assert!(matches!(missing.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn patch_checks_only_present_fields() {
        assert_eq!(PatchUserBody::default().validate().unwrap(), (None, None));
        let bad = PatchUserBody {
            name: None,
            email: Some("nope".into()),
        };
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn deserializes_partial_json() {
        let body: PatchUserBody = serde_json::from_str(r#"{"name":"John Doe"}"#).unwrap();
        assert_eq!(body.name.as_deref(), Some("John Doe"));
        assert!(body.email.is_none());
    }
}
