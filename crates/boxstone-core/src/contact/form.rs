//! Contact form controller
//!
//! Validates input, simulates the processing latency of a submission and
//! stores the resulting record. The banner and success message are removed by
//! generation-tagged timers, so an older timer never hides a newer message.

use std::time::Duration;
use tracing::{debug, error, info};

use super::export::export_csv;
use super::normalize::{capitalize_words, normalize_email};
use super::record::ContactRecord;
use super::rules::ContactField;
use super::store::{ContactStats, ContactStore};
use super::validation::{check_field, validate_form, FormErrors, FormValues};
use crate::config::ContactConfig;
use crate::error::SiteError;
use crate::platform::{Platform, Scheduler, Timer};

pub const FORM_INVALID_MESSAGE: &str = "Please fix the errors before submitting.";
pub const SEND_FAILED_MESSAGE: &str = "There was an error sending your message. Please try again.";

/// DOM operations behind the contact form
pub trait FormView {
    fn show_field_error(&mut self, field: ContactField, message: &str);
    fn clear_field_error(&mut self, field: ContactField);
    fn clear_all_errors(&mut self);
    /// Disable the submit button and show the spinner, or restore it
    fn set_submitting(&mut self, submitting: bool);
    /// Replace any existing form-level banner with `message`
    fn show_form_error(&mut self, message: &str);
    fn remove_form_error(&mut self);
    fn show_success(&mut self);
    fn hide_success(&mut self);
    fn reset_form(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted; the record is stored once the latency elapses
    Pending,
    /// Rejected with every failing field annotated
    Invalid(FormErrors),
    /// Dropped because another submission is still pending
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Saved(ContactRecord),
    Failed(SiteError),
}

/// Value the visitor sees after typing into `field`, if it gets reformatted
pub fn format_as_typed(field: ContactField, value: &str) -> Option<String> {
    match field {
        ContactField::FullName => Some(capitalize_words(value)),
        ContactField::Email => Some(value.to_lowercase()),
        ContactField::Phone | ContactField::Description => None,
    }
}

#[derive(Debug)]
pub struct ContactForm {
    store: ContactStore,
    latency: Duration,
    form_error_ttl: Duration,
    success_ttl: Duration,
    pending: Option<FormValues>,
    banner_generation: u32,
    success_generation: u32,
}

impl ContactForm {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            store: ContactStore::new(config),
            latency: config.submit_latency(),
            form_error_ttl: Duration::from_millis(config.form_error_ms),
            success_ttl: Duration::from_millis(config.success_ms),
            pending: None,
            banner_generation: 0,
            success_generation: 0,
        }
    }

    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Validate one field, annotating or clearing it
    pub fn validate_field(
        &self,
        field: ContactField,
        value: &str,
        view: &mut impl FormView,
    ) -> bool {
        match check_field(field, value) {
            Ok(()) => {
                view.clear_field_error(field);
                true
            }
            Err(err) => {
                view.show_field_error(field, &err.to_string());
                false
            }
        }
    }

    /// Validate the whole form, annotating every failing field
    pub fn validate_form(&self, values: &FormValues, view: &mut impl FormView) -> FormErrors {
        let errors = validate_form(values);
        for field in ContactField::ALL {
            match errors.get(&field) {
                Some(err) => view.show_field_error(field, &err.to_string()),
                None => view.clear_field_error(field),
            }
        }
        errors
    }

    pub fn submit(
        &mut self,
        values: FormValues,
        view: &mut impl FormView,
        scheduler: &mut impl Scheduler,
    ) -> SubmitOutcome {
        if self.is_submitting() {
            debug!("Submission already pending, ignoring");
            return SubmitOutcome::Busy;
        }

        let errors = self.validate_form(&values, view);
        if !errors.is_empty() {
            info!("Contact form rejected with {} invalid fields", errors.len());
            self.show_form_error(FORM_INVALID_MESSAGE, view, scheduler);
            return SubmitOutcome::Invalid(errors);
        }

        view.set_submitting(true);
        self.pending = Some(values);
        scheduler.schedule(self.latency, Timer::SubmissionComplete);
        SubmitOutcome::Pending
    }

    fn show_form_error(
        &mut self,
        message: &str,
        view: &mut impl FormView,
        scheduler: &mut impl Scheduler,
    ) {
        self.banner_generation = self.banner_generation.wrapping_add(1);
        view.show_form_error(message);
        scheduler.schedule(
            self.form_error_ttl,
            Timer::FormErrorExpired(self.banner_generation),
        );
    }

    /// Handle a form timer; other timers return `None`
    pub fn on_timer<P: Platform>(
        &mut self,
        timer: Timer,
        platform: &mut P,
        view: &mut impl FormView,
    ) -> Option<SubmissionResult> {
        match timer {
            Timer::SubmissionComplete => {
                let values = self.pending.take()?;
                let result = self.complete(&values, platform, view);
                view.set_submitting(false);
                Some(result)
            }
            Timer::FormErrorExpired(generation) => {
                if generation == self.banner_generation {
                    view.remove_form_error();
                }
                None
            }
            Timer::SuccessExpired(generation) => {
                if generation == self.success_generation {
                    view.hide_success();
                }
                None
            }
            _ => None,
        }
    }

    fn complete<P: Platform>(
        &mut self,
        values: &FormValues,
        platform: &mut P,
        view: &mut impl FormView,
    ) -> SubmissionResult {
        let id = self.store.next_id(platform.now_millis());
        let saved = ContactRecord::from_submission(id, values, platform.now()).and_then(|record| {
            self.store.save(record.clone(), platform.storage())?;
            Ok(record)
        });

        match saved {
            Ok(record) => {
                info!("Contact form submitted: record {}", record.id);
                view.reset_form();
                view.clear_all_errors();
                self.success_generation = self.success_generation.wrapping_add(1);
                view.show_success();
                platform.schedule(
                    self.success_ttl,
                    Timer::SuccessExpired(self.success_generation),
                );
                SubmissionResult::Saved(record)
            }
            Err(err) => {
                error!("Failed to submit contact form: {}", err);
                self.show_form_error(SEND_FAILED_MESSAGE, view, platform);
                SubmissionResult::Failed(err)
            }
        }
    }

    pub fn stats(&self, now: chrono::DateTime<chrono::FixedOffset>) -> ContactStats {
        self.store.stats(now)
    }

    pub fn export_csv(&self) -> String {
        export_csv(self.store.records())
    }

    /// Whether `email` already submitted within the duplicate window
    pub fn is_recent_duplicate(&self, email: &str, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.store
            .find_recent_duplicate(&normalize_email(email), now)
            .is_some()
    }
}
