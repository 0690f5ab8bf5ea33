//! Guarded section transition sequencer
//!
//! A transition runs through `ExitingOut → Swapping → EnteringIn` and back to
//! `Idle`, each phase ending on a [`Timer::Transition`] scheduled through the
//! host. While a transition is in flight further requests are dropped.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::{SectionId, SectionStyle, SectionView};
use crate::config::NavigationConfig;
use crate::error::SiteError;
use crate::platform::{Scheduler, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTimings {
    pub exit: Duration,
    pub settle: Duration,
    pub enter: Duration,
}

impl TransitionTimings {
    pub fn total(&self) -> Duration {
        self.exit + self.settle + self.enter
    }
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self::from(&NavigationConfig::default())
    }
}

impl From<&NavigationConfig> for TransitionTimings {
    fn from(config: &NavigationConfig) -> Self {
        Self {
            exit: config.exit_delay(),
            settle: config.settle_delay(),
            enter: config.enter_duration(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    ExitingOut { from: SectionId, to: SectionId },
    Swapping { from: SectionId, to: SectionId },
    EnteringIn { from: SectionId, to: SectionId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Another transition is still running
    InFlight,
    /// The target is already the active section
    AlreadyActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    Started,
    Ignored(IgnoreReason),
}

/// Payload of the `sectionChanged` notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionChange {
    #[serde(rename = "sectionId")]
    pub section: SectionId,
    #[serde(rename = "previousSection")]
    pub previous: SectionId,
}

/// What a phase step produced, for the owner to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The target became the active section
    Swapped(SectionId),
    /// The transition finished
    Completed(SectionChange),
}

/// Snapshot of the navigator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_section_id: SectionId,
    pub is_transitioning: bool,
}

#[derive(Debug)]
pub struct SectionNavigator {
    current: SectionId,
    phase: TransitionPhase,
    timings: TransitionTimings,
}

impl SectionNavigator {
    pub fn new(initial: SectionId, timings: TransitionTimings) -> Self {
        Self {
            current: initial,
            phase: TransitionPhase::Idle,
            timings,
        }
    }

    pub fn current(&self) -> &SectionId {
        &self.current
    }

    pub fn phase(&self) -> &TransitionPhase {
        &self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    pub fn state(&self) -> NavigationState {
        NavigationState {
            current_section_id: self.current.clone(),
            is_transitioning: self.is_transitioning(),
        }
    }

    /// Start a transition to `target`
    ///
    /// # Errors
    /// Returns [`SiteError::SectionNotFound`] if the view has no such section.
    /// The navigator is left idle in that case.
    pub fn request_show(
        &mut self,
        target: &SectionId,
        view: &mut impl SectionView,
        scheduler: &mut impl Scheduler,
    ) -> Result<ShowOutcome, SiteError> {
        if self.is_transitioning() {
            debug!("Dropping request for '{}': transition in flight", target);
            return Ok(ShowOutcome::Ignored(IgnoreReason::InFlight));
        }

        if *target == self.current {
            return Ok(ShowOutcome::Ignored(IgnoreReason::AlreadyActive));
        }

        if !view.has_section(target) {
            error!("Section {} not found", target);
            return Err(SiteError::SectionNotFound(target.clone()));
        }

        if view.has_section(&self.current) {
            view.set_section_style(&self.current, SectionStyle::Exiting);
        }

        self.phase = TransitionPhase::ExitingOut {
            from: self.current.clone(),
            to: target.clone(),
        };
        scheduler.schedule(self.timings.exit, Timer::Transition);

        Ok(ShowOutcome::Started)
    }

    /// Advance the running transition by one phase
    ///
    /// Returns `None` for stray timers while idle.
    pub fn on_timer(
        &mut self,
        view: &mut impl SectionView,
        scheduler: &mut impl Scheduler,
    ) -> Option<TransitionEvent> {
        match std::mem::replace(&mut self.phase, TransitionPhase::Idle) {
            TransitionPhase::Idle => None,
            TransitionPhase::ExitingOut { from, to } => {
                view.deactivate_all_sections();
                view.activate_section(&to);
                view.set_section_style(&to, SectionStyle::Entering);
                view.highlight_nav_link(&to);
                view.scroll_to_top();

                self.phase = TransitionPhase::Swapping {
                    from,
                    to: to.clone(),
                };
                scheduler.schedule(self.timings.settle, Timer::Transition);
                Some(TransitionEvent::Swapped(to))
            }
            TransitionPhase::Swapping { from, to } => {
                view.set_section_style(
                    &to,
                    SectionStyle::Entered {
                        duration: self.timings.enter,
                    },
                );
                self.phase = TransitionPhase::EnteringIn { from, to };
                scheduler.schedule(self.timings.enter, Timer::Transition);
                None
            }
            TransitionPhase::EnteringIn { from, to } => {
                view.set_section_style(&to, SectionStyle::Resting);
                self.current = to.clone();

                let change = SectionChange {
                    section: to,
                    previous: from,
                };
                view.emit_section_changed(&change);
                debug!("Section changed: {} -> {}", change.previous, change.section);
                Some(TransitionEvent::Completed(change))
            }
        }
    }
}
