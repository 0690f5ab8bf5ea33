//! Contact form: validation, submission and the stored contact list

pub mod export;
pub mod form;
pub mod normalize;
pub mod record;
pub mod rules;
pub mod store;
pub mod validation;

pub use export::{escape_field, export_csv, CSV_HEADER};
pub use form::{
    format_as_typed, ContactForm, FormView, SubmissionResult, SubmitOutcome,
    FORM_INVALID_MESSAGE, SEND_FAILED_MESSAGE,
};
pub use record::{ContactRecord, ContactStatus, WEBSITE_SOURCE};
pub use rules::{ContactField, ValidationRule};
pub use store::{ContactStats, ContactStore};
pub use validation::{check_field, validate_form, FieldError, FormErrors, FormValues};
