//! Static validation table for the contact form

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    /// Letters (including Latin-1 accented ones) and whitespace
    static ref FULL_NAME_PATTERN: Regex = Regex::new(r"^[a-zA-ZÀ-ÿ\s]+$").unwrap();

    /// Basic local@domain.tld shape
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// ASCII digits, spaces, dashes, parentheses and an optional leading plus
    static ref PHONE_PATTERN: Regex = Regex::new(r"^[\+]?[0-9\s\-\(\)]+$").unwrap();
}

/// Fields of the contact form, named as in the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    FullName,
    Email,
    Phone,
    Description,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::FullName,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Description,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContactField::FullName => "fullName",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Description => "description",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn is_required(self) -> bool {
        !matches!(self, ContactField::Phone)
    }

    pub fn rule(self) -> ValidationRule {
        match self {
            ContactField::FullName => ValidationRule {
                min_length: Some(2),
                max_length: Some(100),
                pattern: Some(&FULL_NAME_PATTERN),
            },
            ContactField::Email => ValidationRule {
                min_length: None,
                max_length: None,
                pattern: Some(&EMAIL_PATTERN),
            },
            ContactField::Phone => ValidationRule {
                min_length: Some(7),
                max_length: Some(20),
                pattern: Some(&PHONE_PATTERN),
            },
            ContactField::Description => ValidationRule {
                min_length: Some(10),
                max_length: Some(1000),
                pattern: None,
            },
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Length bounds (in characters) and pattern of one field
#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static Regex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip() {
        for field in ContactField::ALL {
            assert_eq!(ContactField::from_name(field.name()), Some(field));
        }
        assert_eq!(ContactField::from_name("company"), None);
    }

    #[test]
    fn test_only_phone_is_optional() {
        let optional: Vec<_> = ContactField::ALL
            .into_iter()
            .filter(|f| !f.is_required())
            .collect();
        assert_eq!(optional, vec![ContactField::Phone]);
    }

    #[test]
    fn test_patterns() {
        let name = ContactField::FullName.rule().pattern.unwrap();
        assert!(name.is_match("José Álvarez"));
        assert!(!name.is_match("John123"));

        let email = ContactField::Email.rule().pattern.unwrap();
        assert!(email.is_match("user@example.com"));
        assert!(!email.is_match("user@example"));
        assert!(!email.is_match("us er@example.com"));

        let phone = ContactField::Phone.rule().pattern.unwrap();
        assert!(phone.is_match("+34 (600) 123-456"));
        assert!(!phone.is_match("600-CALL-NOW"));
    }

    #[test]
    fn test_phone_rejects_non_ascii_digits() {
        let phone = ContactField::Phone.rule().pattern.unwrap();
        // Arabic-Indic and fullwidth digits
        assert!(!phone.is_match("١٢٣٤٥٦٧٨"));
        assert!(!phone.is_match("１２３４５６７８"));
        assert!(phone.is_match("12345678"));
    }
}
