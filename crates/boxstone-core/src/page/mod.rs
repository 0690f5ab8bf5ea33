//! Page-wide helpers outside the three main components
//!
//! Accessibility aids, tooltips, clipboard copies and script error handling.

pub mod accessibility;
pub mod tooltip;

pub use accessibility::{
    is_activation_key, Announcer, ANNOUNCEMENT_CLEAR, FOCUSABLE_SELECTOR, SKIP_LINK_TARGET,
    SKIP_LINK_TEXT,
};
pub use tooltip::{tooltip_position, AnchorRect, TOOLTIP_FADE, TOOLTIP_GAP};

use std::time::Duration;

use crate::app::{Notice, NoticeKind};
use crate::platform::TargetId;

/// Delay before the page reloads itself after a critical error
pub const RELOAD_DELAY: Duration = Duration::from_millis(3000);

/// DOM operations for page-wide aids
pub trait PageView {
    /// Insert a skip link as the first child of `<body>`
    fn install_skip_link(&mut self, text: &str, href: &str);
    /// Give the element a tab stop unless it already has one
    fn make_focusable(&mut self, target: TargetId);
    /// Click the element on behalf of the keyboard
    fn activate(&mut self, target: TargetId);
    /// Replace the live-region text; an empty message clears it
    fn announce(&mut self, message: &str);
    /// Copy through a hidden text selection; returns whether the browser accepted it
    fn copy_via_selection(&mut self, text: &str) -> bool;
    fn reload_page(&mut self);
}

pub fn copy_notice(copied: bool) -> Notice {
    if copied {
        Notice::new(NoticeKind::Success, "Copied to clipboard")
    } else {
        Notice::new(NoticeKind::Error, "Could not copy the text")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptErrorKind {
    /// Uncaught exception (`error` event)
    Uncaught,
    /// Promise rejected without a handler
    UnhandledRejection,
}

impl ScriptErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptErrorKind::Uncaught => "error",
            ScriptErrorKind::UnhandledRejection => "unhandledrejection",
        }
    }
}

/// Script failure reported by the host's global handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub kind: ScriptErrorKind,
    pub message: String,
    pub stack: Option<String>,
}

impl ScriptError {
    pub fn uncaught(message: impl Into<String>, stack: Option<String>) -> Self {
        Self {
            kind: ScriptErrorKind::Uncaught,
            message: message.into(),
            stack,
        }
    }

    pub fn rejection(reason: impl Into<String>) -> Self {
        Self {
            kind: ScriptErrorKind::UnhandledRejection,
            message: reason.into(),
            stack: None,
        }
    }

    /// Uncaught errors whose stack mentions "critical" force a reload
    pub fn is_critical(&self) -> bool {
        self.kind == ScriptErrorKind::Uncaught
            && self
                .stack
                .as_deref()
                .is_some_and(|stack| stack.contains("critical"))
    }
}
