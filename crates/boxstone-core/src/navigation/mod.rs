//! Single-page section navigation
//!
//! - [`SectionNavigator`]: the guarded three-phase transition between sections
//! - [`MobileMenu`]: hamburger menu with an outside-click listener
//! - [`ShortcutMap`]: keyboard shortcuts for navigation

pub mod keyboard;
pub mod menu;
pub mod transition;

pub use keyboard::{KeyPress, Shortcut, ShortcutMap};
pub use menu::{MenuView, MobileMenu};
pub use transition::{
    IgnoreReason, NavigationState, SectionChange, SectionNavigator, ShowOutcome,
    TransitionEvent, TransitionPhase, TransitionTimings,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of a top-level section (its DOM id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for SectionId {
    fn from(id: &String) -> Self {
        Self::new(id.as_str())
    }
}

/// Transient visual state applied to a section during a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStyle {
    /// Faded out and shifted left
    Exiting,
    /// Invisible and shifted right, no transition
    Entering,
    /// Transitioning to fully visible over `duration`
    Entered { duration: Duration },
    /// All transient styling removed
    Resting,
}

/// DOM operations the navigator needs
pub trait SectionView {
    fn has_section(&self, id: &SectionId) -> bool;
    fn set_section_style(&mut self, id: &SectionId, style: SectionStyle);
    /// Remove the active marker and transient styling from every section
    fn deactivate_all_sections(&mut self);
    fn activate_section(&mut self, id: &SectionId);
    fn highlight_nav_link(&mut self, id: &SectionId);
    fn scroll_to_top(&mut self);
    /// Dispatch the `sectionChanged` notification
    fn emit_section_changed(&mut self, change: &SectionChange);
    fn set_header_scrolled(&mut self, scrolled: bool);
}

/// Whether the header should use its scrolled look
pub fn header_is_scrolled(scroll_y: f64, offset: f64) -> bool {
    scroll_y > offset
}
