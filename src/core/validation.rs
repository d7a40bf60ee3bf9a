//! Field validation rules shared by the entity builders

use miette::Diagnostic;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A strict builder refused to produce an entity
///
/// Names the first invariant that did not hold, in the builder's fixed
/// check order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("invalid {entity}: {field} {rule}")]
#[diagnostic(
    code(dolisales::entity::invalid),
    help("check the `{field}` value and try again")
)]
pub struct ValidationError {
    /// Entity kind ("client", "produit", ...)
    pub entity: &'static str,
    /// JSON key of the offending field
    pub field: &'static str,
    /// Human-readable rule that was violated
    pub rule: String,
}

impl ValidationError {
    pub fn new(entity: &'static str, field: &'static str, rule: impl Into<String>) -> Self {
        Self {
            entity,
            field,
            rule: rule.into(),
        }
    }
}

/// Result alias for builder terminals
pub type BuildResult<T> = std::result::Result<T, ValidationError>;

fn postal_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{5}$").expect("static regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("static regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("static regex")
    })
}

/// True when the value is present and has at least one non-whitespace char
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Exactly five ASCII digits
pub fn is_postal_code(value: &str) -> bool {
    postal_code_regex().is_match(value)
}

/// Exactly ten ASCII digits
pub fn is_phone(value: &str) -> bool {
    phone_regex().is_match(value)
}

/// Simplified `local@domain.tld` check
pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

pub const POSTAL_CODE_RULE: &str = "must be exactly 5 digits";
pub const PHONE_RULE: &str = "must be exactly 10 digits";
pub const EMAIL_RULE: &str = "must be a valid email address";
pub const BLANK_RULE: &str = "must not be blank";

/// Check one client input the way the strict builder will
///
/// `field` is the wire key; fields without a format only need text.
pub fn check_client_field(field: &str, value: &str) -> Result<(), &'static str> {
    match field {
        "codePostal" if !is_postal_code(value) => Err(POSTAL_CODE_RULE),
        "adresseMail" if !is_email(value) => Err(EMAIL_RULE),
        "telephone" if !is_phone(value) => Err(PHONE_RULE),
        _ if value.trim().is_empty() => Err(BLANK_RULE),
        _ => Ok(()),
    }
}

/// Require a non-blank string, returning an owned copy
pub fn require_text(
    entity: &'static str,
    field: &'static str,
    value: Option<&String>,
) -> BuildResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ValidationError::new(entity, field, BLANK_RULE)),
    }
}

/// Require a string matching `check`, returning an owned copy
pub fn require_format(
    entity: &'static str,
    field: &'static str,
    value: Option<&String>,
    check: fn(&str) -> bool,
    rule: &str,
) -> BuildResult<String> {
    match value {
        Some(v) if check(v) => Ok(v.clone()),
        Some(_) => Err(ValidationError::new(entity, field, rule)),
        None => Err(ValidationError::new(entity, field, "is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code() {
        assert!(is_postal_code("75002"));
        assert!(!is_postal_code("7500"));
        assert!(!is_postal_code("750021"));
        assert!(!is_postal_code("7500A"));
    }

    #[test]
    fn test_phone() {
        assert!(is_phone("0123456789"));
        assert!(!is_phone("012345678"));
        assert!(!is_phone("01 23 45 67 89"));
    }

    #[test]
    fn test_email() {
        assert!(is_email("dupont@example.com"));
        assert!(is_email("jean.dupont+crm@mail.example.fr"));
        assert!(!is_email("dupont@example"));
        assert!(!is_email("dupont.example.com"));
        assert!(!is_email(""));
    }

    #[test]
    fn test_check_client_field() {
        assert_eq!(check_client_field("codePostal", "7500"), Err(POSTAL_CODE_RULE));
        assert_eq!(check_client_field("codePostal", "75002"), Ok(()));
        assert_eq!(check_client_field("telephone", "01 23"), Err(PHONE_RULE));
        assert_eq!(check_client_field("adresseMail", "a@b"), Err(EMAIL_RULE));
        assert_eq!(check_client_field("nom", "  "), Err(BLANK_RULE));
        assert_eq!(check_client_field("ville", "Paris"), Ok(()));
    }

    #[test]
    fn test_require_text_rejects_blank() {
        let blank = "   ".to_string();
        let err = require_text("client", "nom", Some(&blank)).unwrap_err();
        assert_eq!(err.field, "nom");
        assert!(require_text("client", "nom", None).is_err());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = ValidationError::new("client", "codePostal", "must be exactly 5 digits");
        assert_eq!(
            err.to_string(),
            "invalid client: codePostal must be exactly 5 digits"
        );
    }
}
