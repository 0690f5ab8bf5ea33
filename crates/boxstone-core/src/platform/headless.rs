use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::{
    Clipboard, CopyStatus, KeyValueStore, ObserverOptions, Platform, Scheduler, TargetId, Timer,
    VisibilityObserver,
};
use crate::error::StorageError;

/// In-memory [`KeyValueStore`] with an optional byte quota
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once the total stored bytes would exceed `quota`
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_bytes_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// [`VisibilityObserver`] that only remembers what is being observed
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    observed: BTreeMap<TargetId, ObserverOptions>,
}

impl RecordingObserver {
    pub fn is_observed(&self, target: TargetId) -> bool {
        self.observed.contains_key(&target)
    }

    pub fn options_for(&self, target: TargetId) -> Option<&ObserverOptions> {
        self.observed.get(&target)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }
}

impl VisibilityObserver for RecordingObserver {
    fn observe(&mut self, target: TargetId, options: &ObserverOptions) {
        self.observed.insert(target, options.clone());
    }

    fn unobserve(&mut self, target: TargetId) {
        self.observed.remove(&target);
    }
}

/// [`Clipboard`] keeping the last copied text; can be told to reject writes
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
    rejects: bool,
}

impl MemoryClipboard {
    /// Clipboard whose writes always fail, like a denied permission
    pub fn rejecting() -> Self {
        Self {
            text: None,
            rejects: true,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> CopyStatus {
        if self.rejects {
            return CopyStatus::Failed;
        }
        self.text = Some(text.to_string());
        CopyStatus::Copied
    }
}

#[derive(Debug, Clone)]
struct ScheduledTimer {
    due: i64,
    seq: u64,
    timer: Timer,
}

/// Platform driven by a virtual clock
///
/// Timers never fire on their own; the owner pulls them with
/// [`HeadlessPlatform::next_due`] (usually through `Site::advance`).
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    now_ms: i64,
    seq: u64,
    pending: Vec<ScheduledTimer>,
    observer: Option<RecordingObserver>,
    storage: Option<MemoryStore>,
    clipboard: Option<MemoryClipboard>,
    reduced_motion: bool,
    offset: FixedOffset,
}

impl HeadlessPlatform {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now_ms: start.timestamp_millis(),
            seq: 0,
            pending: Vec::new(),
            observer: Some(RecordingObserver::default()),
            storage: Some(MemoryStore::new()),
            clipboard: Some(MemoryClipboard::default()),
            reduced_motion: false,
            offset: Utc.fix(),
        }
    }

    /// Simulate a browser without a visibility observer
    pub fn without_observer(mut self) -> Self {
        self.observer = None;
        self
    }

    /// Simulate a browser without durable storage
    pub fn without_storage(mut self) -> Self {
        self.storage = None;
        self
    }

    /// Simulate a browser without the async clipboard API
    pub fn without_clipboard(mut self) -> Self {
        self.clipboard = None;
        self
    }

    pub fn with_clipboard(mut self, clipboard: MemoryClipboard) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.storage = Some(store);
        self
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn recording_observer(&self) -> Option<&RecordingObserver> {
        self.observer.as_ref()
    }

    pub fn memory_store(&self) -> Option<&MemoryStore> {
        self.storage.as_ref()
    }

    pub fn memory_store_mut(&mut self) -> Option<&mut MemoryStore> {
        self.storage.as_mut()
    }

    pub fn memory_clipboard(&self) -> Option<&MemoryClipboard> {
        self.clipboard.as_ref()
    }

    pub fn pending_timers(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return the earliest timer due at or before `deadline`,
    /// moving the clock to its due time
    pub fn next_due(&mut self, deadline: i64) -> Option<Timer> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        let scheduled = self.pending.remove(index);
        self.now_ms = self.now_ms.max(scheduled.due);
        Some(scheduled.timer)
    }

    /// Due time of the earliest pending timer
    pub fn next_deadline(&self) -> Option<i64> {
        self.pending.iter().map(|t| t.due).min()
    }

    pub fn set_now_millis(&mut self, now_ms: i64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl Scheduler for HeadlessPlatform {
    fn now_millis(&self) -> i64 {
        self.now_ms
    }

    fn schedule(&mut self, delay: Duration, timer: Timer) {
        // Sub-millisecond delays still land on a later tick, as with setTimeout.
        let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        self.seq += 1;
        self.pending.push(ScheduledTimer {
            due: self.now_ms.saturating_add(delay_ms),
            seq: self.seq,
            timer,
        });
    }
}

impl Platform for HeadlessPlatform {
    fn observer(&mut self) -> Option<&mut dyn VisibilityObserver> {
        self.observer
            .as_mut()
            .map(|o| o as &mut dyn VisibilityObserver)
    }

    fn storage(&mut self) -> Option<&mut dyn KeyValueStore> {
        self.storage.as_mut().map(|s| s as &mut dyn KeyValueStore)
    }

    fn clipboard(&mut self) -> Option<&mut dyn Clipboard> {
        self.clipboard.as_mut().map(|c| c as &mut dyn Clipboard)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn utc_offset(&self) -> FixedOffset {
        self.offset
    }
}
