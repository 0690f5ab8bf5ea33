//! Platform capabilities
//!
//! The site logic never touches the browser directly. Everything it needs from
//! the host (timers, viewport visibility, durable key-value storage, the
//! clipboard, motion preferences) goes through the traits in this module. The wasm crate
//! implements them on top of `web-sys`; [`HeadlessPlatform`] implements them
//! with a virtual clock for native tests and headless runs.

mod headless;

pub use headless::{HeadlessPlatform, MemoryClipboard, MemoryStore, RecordingObserver};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::StorageError;

/// Opaque handle for an element the host registered with the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every delayed callback the site can ask the host to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Advance the section transition to its next phase
    Transition,
    /// Attach the outside-click listener of the menu opened in this generation
    MenuListener(u32),
    /// Start a staggered enter animation
    Reveal(TargetId),
    /// Drop transient transition styling after an enter animation
    ClearTransition(TargetId),
    CountUpStart(TargetId),
    CountUpTick(TargetId),
    PulseEnd(TargetId),
    /// Simulated processing latency of a contact submission elapsed
    SubmissionComplete,
    /// Remove the form error banner with the given generation
    FormErrorExpired(u32),
    /// Hide the success message with the given generation
    SuccessExpired(u32),
    /// Clear the screen-reader announcement with the given generation
    AnnouncementExpired(u32),
    /// Reload the page after a critical script error
    ReloadPage,
}

/// Time source plus delayed callbacks
pub trait Scheduler {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Deliver `timer` back to the site once `delay` has elapsed
    fn schedule(&mut self, delay: Duration, timer: Timer);

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }
}

/// Options of a visibility observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    /// Fraction of the element that must be visible
    pub threshold: f64,
    /// CSS margin applied to the viewport before intersecting
    pub root_margin: String,
}

impl ObserverOptions {
    pub fn new(threshold: f64, root_margin: impl Into<String>) -> Self {
        Self {
            threshold,
            root_margin: root_margin.into(),
        }
    }
}

/// One visibility change reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEntry {
    pub target: TargetId,
    pub is_intersecting: bool,
}

impl VisibilityEntry {
    pub fn visible(target: TargetId) -> Self {
        Self {
            target,
            is_intersecting: true,
        }
    }
}

pub trait VisibilityObserver {
    fn observe(&mut self, target: TargetId, options: &ObserverOptions);
    fn unobserve(&mut self, target: TargetId);
}

/// Durable string key-value storage (`localStorage` in the browser)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Result of a clipboard write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    Copied,
    Failed,
    /// The host finishes asynchronously and reports back through
    /// `Site::finish_copy`
    Pending,
}

/// System clipboard (`navigator.clipboard` in the browser)
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> CopyStatus;
}

/// Full capability set of a host
///
/// Optional capabilities return `None` when the environment lacks them; callers
/// fall back instead of failing.
pub trait Platform: Scheduler {
    fn observer(&mut self) -> Option<&mut dyn VisibilityObserver>;

    fn storage(&mut self) -> Option<&mut dyn KeyValueStore>;

    fn clipboard(&mut self) -> Option<&mut dyn Clipboard> {
        None
    }

    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    /// Offset of the visitor's local time zone, used for calendar-day stats
    fn utc_offset(&self) -> FixedOffset {
        Utc.fix()
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&self.utc_offset())
    }
}
