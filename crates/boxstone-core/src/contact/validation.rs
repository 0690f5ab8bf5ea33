//! Field and form validation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::rules::ContactField;

/// Why a single field failed; the display text is shown next to the field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required.")]
    Required,

    #[error("Minimum {0} characters.")]
    TooShort(usize),

    #[error("Maximum {0} characters.")]
    TooLong(usize),

    #[error("{}", invalid_format_message(.0))]
    InvalidFormat(ContactField),
}

fn invalid_format_message(field: &ContactField) -> &'static str {
    match field {
        ContactField::FullName => "Only letters and spaces are allowed.",
        ContactField::Email => "Please enter a valid email address.",
        ContactField::Phone => "Please enter a valid phone number.",
        ContactField::Description => "Invalid format.",
    }
}

/// Check one value against its field's rule
///
/// The value is trimmed first. An empty optional field passes; an empty
/// required one fails with [`FieldError::Required`]. Otherwise the minimum
/// length, maximum length and pattern are checked in that order.
pub fn check_field(field: ContactField, value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return if field.is_required() {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }

    let rule = field.rule();
    let length = value.chars().count();
    if let Some(min) = rule.min_length {
        if length < min {
            return Err(FieldError::TooShort(min));
        }
    }
    if let Some(max) = rule.max_length {
        if length > max {
            return Err(FieldError::TooLong(max));
        }
    }
    if let Some(pattern) = rule.pattern {
        if !pattern.is_match(value) {
            return Err(FieldError::InvalidFormat(field));
        }
    }
    Ok(())
}

/// Raw values of the contact form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub description: String,
}

impl FormValues {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::FullName => &self.full_name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContactField::FullName => self.full_name = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = value,
            ContactField::Description => self.description = value,
        }
    }
}

/// Every failing field of a form
pub type FormErrors = BTreeMap<ContactField, FieldError>;

/// Validate all required fields and every optional field with a value
pub fn validate_form(values: &FormValues) -> FormErrors {
    ContactField::ALL
        .into_iter()
        .filter(|field| field.is_required() || !values.get(*field).trim().is_empty())
        .filter_map(|field| {
            check_field(field, values.get(field))
                .err()
                .map(|err| (field, err))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid_values() -> FormValues {
        FormValues {
            full_name: "John Smith".into(),
            email: "user@example.com".into(),
            phone: String::new(),
            description: "I would like a quote for a kitchen.".into(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(
            check_field(ContactField::FullName, "John123"),
            Err(FieldError::InvalidFormat(ContactField::FullName))
        );
        assert_eq!(check_field(ContactField::FullName, "John Smith"), Ok(()));
        assert_eq!(
            check_field(ContactField::FullName, " J "),
            Err(FieldError::TooShort(2))
        );
    }

    #[test]
    fn test_email() {
        assert!(check_field(ContactField::Email, "not-an-email").is_err());
        assert_eq!(check_field(ContactField::Email, "user@example.com"), Ok(()));
        assert_eq!(
            check_field(ContactField::Email, "   "),
            Err(FieldError::Required)
        );
    }

    #[test]
    fn test_optional_phone() {
        assert_eq!(check_field(ContactField::Phone, ""), Ok(()));
        assert_eq!(
            check_field(ContactField::Phone, "12345"),
            Err(FieldError::TooShort(7))
        );
        assert_eq!(
            check_field(ContactField::Phone, "+1 (555) 123-4567 ext 9"),
            Err(FieldError::TooLong(20))
        );
        assert_eq!(check_field(ContactField::Phone, "+1 (555) 123-4567"), Ok(()));
    }

    #[test]
    fn test_phone_digits_are_ascii_only() {
        for value in ["١٢٣٤٥٦٧٨", "１２３４５６７８"] {
            assert_eq!(
                check_field(ContactField::Phone, value),
                Err(FieldError::InvalidFormat(ContactField::Phone))
            );
        }
    }

    #[test]
    fn test_description_bounds() {
        assert_eq!(
            check_field(ContactField::Description, "too short"),
            Err(FieldError::TooShort(10))
        );
        let long = "a".repeat(1001);
        assert_eq!(
            check_field(ContactField::Description, &long),
            Err(FieldError::TooLong(1000))
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(FieldError::Required.to_string(), "This field is required.");
        assert_eq!(FieldError::TooShort(10).to_string(), "Minimum 10 characters.");
        assert_eq!(FieldError::TooLong(100).to_string(), "Maximum 100 characters.");
        assert_eq!(
            FieldError::InvalidFormat(ContactField::Email).to_string(),
            "Please enter a valid email address."
        );
    }

    #[test]
    fn test_validate_form_collects_every_failure() {
        let values = FormValues {
            full_name: "John123".into(),
            email: "nope".into(),
            phone: "12".into(),
            description: String::new(),
        };
        let errors = validate_form(&values);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[&ContactField::Description], FieldError::Required);
    }

    #[test]
    fn test_validate_form_valid() {
        assert!(validate_form(&valid_values()).is_empty());
    }

    #[test]
    fn test_form_values_serde_names() {
        let values: FormValues =
            serde_json::from_str(r#"{"fullName":"Ana","email":"a@b.co"}"#).unwrap();
        assert_eq!(values.full_name, "Ana");
        assert_eq!(values.phone, "");
    }
}
