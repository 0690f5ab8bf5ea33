//! One-shot enter animations driven by viewport visibility
//!
//! Elements are registered once at startup. The first time an element is
//! reported visible its animation plays and it is unobserved, so re-entering
//! the viewport never replays it. Without a visibility observer everything is
//! revealed right away.

use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

use super::count_up::{CountUp, StatValue};
use super::AnimationView;
use crate::config::AnimationConfig;
use crate::platform::{ObserverOptions, Platform, Scheduler, TargetId, Timer, VisibilityEntry};

/// Stand-in for a zero duration when the visitor prefers reduced motion
pub const REDUCED_MOTION_DURATION: Duration = Duration::from_micros(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationVariant {
    FadeUp,
    SlideLeft,
    SlideRight,
    Scale,
    Bounce,
}

impl AnimationVariant {
    /// Parse a `data-animate` attribute value
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "fadeInUp" => Some(Self::FadeUp),
            "slideInLeft" => Some(Self::SlideLeft),
            "slideInRight" => Some(Self::SlideRight),
            "scaleIn" => Some(Self::Scale),
            "bounceIn" => Some(Self::Bounce),
            _ => None,
        }
    }

    pub fn attr(self) -> &'static str {
        match self {
            Self::FadeUp => "fadeInUp",
            Self::SlideLeft => "slideInLeft",
            Self::SlideRight => "slideInRight",
            Self::Scale => "scaleIn",
            Self::Bounce => "bounceIn",
        }
    }

    pub fn initial_transform(self) -> &'static str {
        match self {
            Self::FadeUp | Self::Bounce => "translateY(30px)",
            Self::SlideLeft => "translateX(-50px)",
            Self::SlideRight => "translateX(50px)",
            Self::Scale => "scale(0.8)",
        }
    }

    pub fn final_transform(self) -> &'static str {
        match self {
            Self::FadeUp | Self::Bounce => "translateY(0)",
            Self::SlideLeft | Self::SlideRight => "translateX(0)",
            Self::Scale => "scale(1)",
        }
    }
}

/// What kind of page element is being animated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    /// Generic card, staggered by its index
    Card { index: usize },
    /// Service category, alternating left/right
    ServiceCategory { index: usize },
    /// Bare content block of a section
    SectionContent,
    /// Variant chosen by the markup
    Explicit(AnimationVariant),
}

impl ElementRole {
    pub fn variant(self) -> AnimationVariant {
        match self {
            ElementRole::Card { .. } | ElementRole::SectionContent => AnimationVariant::FadeUp,
            ElementRole::ServiceCategory { index } if index % 2 == 0 => {
                AnimationVariant::SlideLeft
            }
            ElementRole::ServiceCategory { .. } => AnimationVariant::SlideRight,
            ElementRole::Explicit(variant) => variant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatedElement {
    pub target: TargetId,
    pub role: ElementRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatElement {
    pub target: TargetId,
    /// Text the page originally displayed
    pub final_text: String,
}

/// Everything the host found in the page at startup
#[derive(Debug, Clone, Default)]
pub struct PageInventory {
    pub animated: Vec<AnimatedElement>,
    pub stats: Vec<StatElement>,
    pub lazy_images: Vec<TargetId>,
    /// Elements revealed in `data-load-order` order, independent of scrolling
    pub load_sequence: Vec<(TargetId, u32)>,
    /// Non-control elements that get a tab stop and keyboard activation
    pub focusable: Vec<TargetId>,
}

/// Timing constants, already adjusted for reduced motion
#[derive(Debug, Clone)]
pub struct AnimationTimings {
    pub card_stagger: Duration,
    pub stat_stagger: Duration,
    pub load_stagger: Duration,
    pub fade: Duration,
    pub slide: Duration,
    pub bounce: Duration,
    pub count_up: Duration,
    pub count_up_steps: u32,
    pub pulse: Duration,
    pub reduced_motion: bool,
}

impl AnimationTimings {
    pub fn new(config: &AnimationConfig, reduced_motion: bool) -> Self {
        let ms = |value: u64| {
            if reduced_motion {
                REDUCED_MOTION_DURATION
            } else {
                Duration::from_millis(value)
            }
        };
        let stagger = |value: u64| {
            if reduced_motion {
                Duration::ZERO
            } else {
                Duration::from_millis(value)
            }
        };

        Self {
            card_stagger: stagger(config.card_stagger_ms),
            stat_stagger: stagger(config.stat_stagger_ms),
            load_stagger: stagger(config.load_stagger_ms),
            fade: ms(config.fade_ms),
            slide: ms(config.slide_ms),
            bounce: ms(config.bounce_ms),
            count_up: ms(config.count_up_ms),
            count_up_steps: config.count_up_steps.max(1),
            pulse: ms(config.pulse_ms),
            reduced_motion,
        }
    }

    pub fn duration_of(&self, variant: AnimationVariant) -> Duration {
        match variant {
            AnimationVariant::FadeUp | AnimationVariant::Scale => self.fade,
            AnimationVariant::SlideLeft | AnimationVariant::SlideRight => self.slide,
            AnimationVariant::Bounce => self.bounce,
        }
    }

    /// Offset of count-up frame `step` from the start of the count,
    /// rounded to the millisecond so the last frame lands on the full duration
    pub fn tick_offset(&self, step: u32) -> Duration {
        let steps = u128::from(self.count_up_steps);
        let step = u128::from(step.min(self.count_up_steps));
        let millis = (self.count_up.as_millis() * step + steps / 2) / steps;
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Wait between frame `step - 1` and frame `step`
    pub fn tick_delay(&self, step: u32) -> Duration {
        self.tick_offset(step)
            .saturating_sub(self.tick_offset(step.saturating_sub(1)))
    }
}

#[derive(Debug, Clone)]
enum Tracked {
    Element {
        variant: AnimationVariant,
        delay: Duration,
    },
    Stat {
        index: u32,
        count: CountUp,
    },
    Image,
}

#[derive(Debug)]
pub struct ScrollAnimator {
    config: AnimationConfig,
    timings: AnimationTimings,
    element_options: ObserverOptions,
    stat_options: ObserverOptions,
    tracked: HashMap<TargetId, Tracked>,
    triggered: HashSet<TargetId>,
}

impl ScrollAnimator {
    pub fn new(config: &AnimationConfig, reduced_motion: bool) -> Self {
        Self {
            config: config.clone(),
            timings: AnimationTimings::new(config, reduced_motion),
            element_options: ObserverOptions::new(config.threshold, config.root_margin.clone()),
            stat_options: ObserverOptions::new(config.stat_threshold, "0px"),
            tracked: HashMap::new(),
            triggered: HashSet::new(),
        }
    }

    pub fn timings(&self) -> &AnimationTimings {
        &self.timings
    }

    pub fn is_triggered(&self, target: TargetId) -> bool {
        self.triggered.contains(&target)
    }

    /// Number of registered elements still waiting for their first visibility
    pub fn waiting(&self) -> usize {
        self.tracked.len() - self.triggered.len()
    }

    /// Register every element of the page and start observing them
    pub fn register<P: Platform, V: AnimationView>(
        &mut self,
        inventory: &PageInventory,
        platform: &mut P,
        view: &mut V,
    ) {
        for element in &inventory.animated {
            let variant = element.role.variant();
            let delay = match element.role {
                ElementRole::Card { index } => self.timings.card_stagger * index as u32,
                _ => Duration::ZERO,
            };
            view.prepare(element.target, variant);
            self.tracked
                .insert(element.target, Tracked::Element { variant, delay });
        }

        for (index, stat) in inventory.stats.iter().enumerate() {
            let count = CountUp::new(
                StatValue::parse(&stat.final_text),
                self.timings.count_up_steps,
            );
            view.prepare_stat(stat.target);
            self.tracked.insert(
                stat.target,
                Tracked::Stat {
                    index: index as u32,
                    count,
                },
            );
        }

        for target in &inventory.lazy_images {
            self.tracked.insert(*target, Tracked::Image);
        }

        match platform.observer() {
            Some(observer) => {
                for element in &inventory.animated {
                    observer.observe(element.target, &self.element_options);
                }
                for stat in &inventory.stats {
                    observer.observe(stat.target, &self.stat_options);
                }
                for target in &inventory.lazy_images {
                    observer.observe(*target, &self.element_options);
                }
            }
            None => {
                info!("Visibility observer unavailable, revealing everything");
                let targets: Vec<TargetId> = self.tracked.keys().copied().collect();
                for target in targets {
                    self.trigger(target, platform, view);
                }
            }
        }

        // Load-order reveals run on timers alone; they are never observed.
        for (target, order) in &inventory.load_sequence {
            view.prepare(*target, AnimationVariant::FadeUp);
            self.tracked.insert(
                *target,
                Tracked::Element {
                    variant: AnimationVariant::FadeUp,
                    delay: self.timings.load_stagger * *order,
                },
            );
            self.triggered.insert(*target);
            platform.schedule(self.timings.load_stagger * *order, Timer::Reveal(*target));
        }

        debug!("Animator tracking {} elements", self.tracked.len());
    }

    /// Follow a change of the reduced-motion preference
    ///
    /// Turning it on stops observing and shows every waiting element in its
    /// final state at once. Turning it off restores full timings for whatever
    /// animates afterwards.
    pub fn set_reduced_motion<P: Platform, V: AnimationView>(
        &mut self,
        reduced: bool,
        platform: &mut P,
        view: &mut V,
    ) {
        if self.timings.reduced_motion == reduced {
            return;
        }
        self.timings = AnimationTimings::new(&self.config, reduced);
        if !reduced {
            info!("Motion preference restored, animations re-enabled");
            return;
        }

        let mut waiting: Vec<TargetId> = self
            .tracked
            .keys()
            .filter(|target| !self.triggered.contains(target))
            .copied()
            .collect();
        waiting.sort();
        info!("Reduced motion requested, finishing {} animations", waiting.len());
        if let Some(observer) = platform.observer() {
            for target in &waiting {
                observer.unobserve(*target);
            }
        }
        for target in waiting {
            self.trigger(target, platform, view);
        }
    }

    /// Handle visibility changes reported by the host
    pub fn on_visibility<P: Platform, V: AnimationView>(
        &mut self,
        entries: &[VisibilityEntry],
        platform: &mut P,
        view: &mut V,
    ) {
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            if !self.tracked.contains_key(&entry.target) || self.is_triggered(entry.target) {
                continue;
            }
            if let Some(observer) = platform.observer() {
                observer.unobserve(entry.target);
            }
            self.trigger(entry.target, platform, view);
        }
    }

    fn trigger<P: Platform, V: AnimationView>(
        &mut self,
        target: TargetId,
        platform: &mut P,
        view: &mut V,
    ) {
        if !self.triggered.insert(target) {
            return;
        }
        match self.tracked.get(&target).cloned() {
            Some(Tracked::Element { delay, .. }) => {
                if delay.is_zero() || self.timings.reduced_motion {
                    self.reveal(target, platform, view);
                } else {
                    platform.schedule(delay, Timer::Reveal(target));
                }
            }
            Some(Tracked::Stat { index, .. }) => {
                let delay = self.timings.stat_stagger * index;
                platform.schedule(delay, Timer::CountUpStart(target));
            }
            Some(Tracked::Image) => view.load_image(target),
            None => {}
        }
    }

    fn reveal(&self, target: TargetId, scheduler: &mut impl Scheduler, view: &mut impl AnimationView) {
        if let Some(Tracked::Element { variant, .. }) = self.tracked.get(&target) {
            let duration = self.timings.duration_of(*variant);
            view.play(target, *variant, duration);
            scheduler.schedule(duration, Timer::ClearTransition(target));
        }
    }

    /// Handle an animation timer; other timers are ignored
    pub fn on_timer<P: Platform, V: AnimationView>(
        &mut self,
        timer: Timer,
        platform: &mut P,
        view: &mut V,
    ) {
        match timer {
            Timer::Reveal(target) => self.reveal(target, platform, view),
            Timer::ClearTransition(target) => view.clear_transition(target),
            Timer::CountUpStart(target) => self.start_count(target, platform, view),
            Timer::CountUpTick(target) => self.tick_count(target, platform, view),
            Timer::PulseEnd(target) => view.set_stat_pulse(target, false),
            _ => {}
        }
    }

    fn start_count(&mut self, target: TargetId, scheduler: &mut impl Scheduler, view: &mut impl AnimationView) {
        let reduced_motion = self.timings.reduced_motion;
        let first = self.timings.tick_delay(1);
        let Some(Tracked::Stat { count, .. }) = self.tracked.get_mut(&target) else {
            return;
        };

        view.show_stat(target);
        if count.is_immediate() || reduced_motion {
            let frame = count.finish();
            view.set_stat_text(target, &frame.text);
            return;
        }
        scheduler.schedule(first, Timer::CountUpTick(target));
    }

    fn tick_count(&mut self, target: TargetId, scheduler: &mut impl Scheduler, view: &mut impl AnimationView) {
        let pulse = self.timings.pulse;
        let Some(Tracked::Stat { count, .. }) = self.tracked.get_mut(&target) else {
            return;
        };

        let frame = count.tick();
        view.set_stat_text(target, &frame.text);
        if frame.done {
            view.set_stat_pulse(target, true);
            scheduler.schedule(pulse, Timer::PulseEnd(target));
        } else {
            let delay = self.timings.tick_delay(count.step() + 1);
            scheduler.schedule(delay, Timer::CountUpTick(target));
        }
    }
}
