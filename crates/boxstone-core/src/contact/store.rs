//! In-memory contact list mirrored to durable key-value storage

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::record::ContactRecord;
use crate::config::ContactConfig;
use crate::error::SiteError;
use crate::platform::KeyValueStore;

/// Aggregate counts over the stored records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total: usize,
    /// Records created on the visitor's current calendar day
    pub today: usize,
    /// Records created within the trailing seven days
    pub this_week: usize,
    pub by_source: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct ContactStore {
    records: Vec<ContactRecord>,
    last_id: u64,
    storage_key: String,
    duplicate_window: Duration,
}

impl ContactStore {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            records: Vec::new(),
            last_id: 0,
            storage_key: config.storage_key.clone(),
            duplicate_window: Duration::hours(config.duplicate_window_hours),
        }
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Next record id: the current millisecond timestamp, bumped past the
    /// last issued id when the clock has not moved
    pub fn next_id(&mut self, now_millis: i64) -> u64 {
        let now = u64::try_from(now_millis).unwrap_or(0);
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Most recent record with the same email inside the duplicate window
    pub fn find_recent_duplicate(&self, email: &str, now: DateTime<Utc>) -> Option<&ContactRecord> {
        let cutoff = now - self.duplicate_window;
        self.records
            .iter()
            .rev()
            .find(|r| r.email == email && r.timestamp > cutoff)
    }

    /// Append a record, writing the durable mirror first
    ///
    /// Without a storage capability only the in-memory list is updated.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::IncompleteRecord`] for a record missing required
    /// values and [`SiteError::Persistence`] when the durable write fails. In
    /// both cases the store is left unchanged.
    pub fn save(
        &mut self,
        record: ContactRecord,
        storage: Option<&mut dyn KeyValueStore>,
    ) -> Result<(), SiteError> {
        record.ensure_complete()?;

        if let Some(duplicate) = self.find_recent_duplicate(&record.email, record.timestamp) {
            warn!(
                "Duplicate contact detected: {} already submitted record {}",
                duplicate.email, duplicate.id
            );
        }

        match storage {
            Some(storage) => self.persist(&record, storage)?,
            None => debug!("Durable storage unavailable, keeping record in memory only"),
        }

        self.last_id = self.last_id.max(record.id);
        self.records.push(record);
        info!("Contact saved. Total contacts: {}", self.records.len());
        Ok(())
    }

    fn persist(&self, record: &ContactRecord, storage: &mut dyn KeyValueStore) -> Result<(), SiteError> {
        let mut existing = match storage.get_item(&self.storage_key)? {
            Some(raw) => serde_json::from_str::<Vec<serde_json::Value>>(&raw).unwrap_or_else(|err| {
                warn!("Discarding unreadable contact archive: {}", err);
                Vec::new()
            }),
            None => Vec::new(),
        };
        existing.push(serde_json::to_value(record)?);
        let serialized = serde_json::to_string(&existing)?;
        storage.set_item(&self.storage_key, &serialized)?;
        Ok(())
    }

    /// Counts relative to `now` in the visitor's local time zone
    pub fn stats(&self, now: DateTime<FixedOffset>) -> ContactStats {
        let today = now.date_naive();
        let week_start = now - Duration::days(7);
        let offset = *now.offset();

        let mut stats = ContactStats {
            total: self.records.len(),
            ..ContactStats::default()
        };
        for record in &self.records {
            if record.timestamp.with_timezone(&offset).date_naive() == today {
                stats.today += 1;
            }
            if record.timestamp > week_start {
                stats.this_week += 1;
            }
            *stats.by_source.entry(record.source.clone()).or_insert(0) += 1;
        }
        stats
    }
}
