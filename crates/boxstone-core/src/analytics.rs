//! Stub analytics and CRM notifications
//!
//! Nothing leaves the browser: every event is logged and appended to a
//! bounded in-memory log that tests and the debug console can inspect.
//! Leads are handed to the CRM whether or not analytics is enabled.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::info;

use crate::contact::ContactRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackedEvent {
    PageView {
        path: String,
    },
    FormSubmit {
        form_name: &'static str,
        timestamp: DateTime<Utc>,
        user_type: &'static str,
    },
    /// Lead forwarded to the CRM webhook
    NewLead {
        record_id: u64,
        email: String,
        source: String,
    },
    Performance {
        metric: String,
        value_ms: f64,
    },
    /// Uncaught script error or unhandled promise rejection
    ScriptError {
        kind: String,
        message: String,
    },
}

/// Oldest events are dropped past this many
pub const MAX_EVENTS: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct Analytics {
    enabled: bool,
    events: VecDeque<TrackedEvent>,
}

impl Analytics {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            info!("Analytics initialized");
        }
        Self {
            enabled,
            events: VecDeque::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn events(&self) -> &VecDeque<TrackedEvent> {
        &self.events
    }

    pub fn page_views(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            TrackedEvent::PageView { path } => Some(path.as_str()),
            _ => None,
        })
    }

    fn record(&mut self, event: TrackedEvent) {
        if !self.enabled {
            return;
        }
        match serde_json::to_string(&event) {
            Ok(json) => info!("Tracking event: {}", json),
            Err(_) => info!("Tracking event: {:?}", event),
        }
        self.push(event);
    }

    fn push(&mut self, event: TrackedEvent) {
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn track_page_view(&mut self, path: impl Into<String>) {
        self.record(TrackedEvent::PageView { path: path.into() });
    }

    /// Form-submission event plus the CRM hand-off of the new lead
    pub fn track_form_submission(&mut self, record: &ContactRecord) {
        self.record(TrackedEvent::FormSubmit {
            form_name: "contact_form",
            timestamp: record.timestamp,
            user_type: "lead",
        });
        self.send_to_crm(record);
    }

    /// CRM webhook stand-in; runs with analytics disabled too
    fn send_to_crm(&mut self, record: &ContactRecord) {
        let lead = TrackedEvent::NewLead {
            record_id: record.id,
            email: record.email.clone(),
            source: record.source.clone(),
        };
        match serde_json::to_string(&lead) {
            Ok(json) => info!("Sending to CRM: {}", json),
            Err(_) => info!("Sending to CRM: {:?}", lead),
        }
        self.push(lead);
    }

    pub fn track_error(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        self.record(TrackedEvent::ScriptError {
            kind: kind.into(),
            message: message.into(),
        });
    }

    pub fn track_performance(&mut self, metric: impl Into<String>, value_ms: f64) {
        self.record(TrackedEvent::Performance {
            metric: metric.into(),
            value_ms,
        });
    }
}
