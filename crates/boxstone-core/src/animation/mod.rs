//! Scroll-triggered enter animations and statistic count-ups

pub mod count_up;
pub mod scroll;

pub use count_up::{CountFrame, CountUp, StatSuffix, StatValue};
pub use scroll::{
    AnimatedElement, AnimationTimings, AnimationVariant, ElementRole, PageInventory,
    ScrollAnimator, StatElement,
};

use std::time::Duration;

use crate::platform::TargetId;

/// DOM operations behind the animator
pub trait AnimationView {
    /// Hide the element in the variant's starting pose
    fn prepare(&mut self, target: TargetId, variant: AnimationVariant);
    /// Animate to the resting pose over `duration`
    fn play(&mut self, target: TargetId, variant: AnimationVariant, duration: Duration);
    fn clear_transition(&mut self, target: TargetId);
    /// Hide a statistic and reset its text to zero
    fn prepare_stat(&mut self, target: TargetId);
    fn show_stat(&mut self, target: TargetId);
    fn set_stat_text(&mut self, target: TargetId, text: &str);
    fn set_stat_pulse(&mut self, target: TargetId, on: bool);
    /// Swap a lazy image's deferred source in
    fn load_image(&mut self, target: TargetId);
}
