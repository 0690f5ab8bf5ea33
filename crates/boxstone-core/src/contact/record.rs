use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalize::{normalize_email, normalize_name, normalize_phone};
use super::validation::FormValues;
use crate::error::SiteError;

/// Source recorded for submissions made through the site form
pub const WEBSITE_SOURCE: &str = "website";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl ContactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Contacted => "contacted",
            ContactStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: u64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub status: ContactStatus,
    pub source: String,
}

impl ContactRecord {
    /// Build a record from validated form values
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::IncompleteRecord`] if a required value is blank
    /// after normalization.
    pub fn from_submission(
        id: u64,
        values: &FormValues,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SiteError> {
        let record = Self {
            id,
            full_name: normalize_name(&values.full_name),
            email: normalize_email(&values.email),
            phone: normalize_phone(&values.phone),
            description: values.description.trim().to_string(),
            timestamp,
            status: ContactStatus::New,
            source: WEBSITE_SOURCE.to_string(),
        };
        record.ensure_complete()?;
        Ok(record)
    }

    pub fn ensure_complete(&self) -> Result<(), SiteError> {
        if self.full_name.is_empty() {
            return Err(SiteError::IncompleteRecord("fullName"));
        }
        if self.email.is_empty() {
            return Err(SiteError::IncompleteRecord("email"));
        }
        if self.description.is_empty() {
            return Err(SiteError::IncompleteRecord("description"));
        }
        Ok(())
    }

    /// RFC 3339 timestamp with millisecond precision
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
