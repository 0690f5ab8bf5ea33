//! Keyboard and screen-reader aids

use std::time::Duration;

use super::PageView;
use crate::platform::{Scheduler, Timer};

pub const SKIP_LINK_TEXT: &str = "Skip to main content";
pub const SKIP_LINK_TARGET: &str = "#main";

/// Non-control elements that receive a tab stop and keyboard activation
pub const FOCUSABLE_SELECTOR: &str = ".card, .tech-tag, .service-category";

/// How long an announcement stays in the live region
pub const ANNOUNCEMENT_CLEAR: Duration = Duration::from_millis(1000);

/// Enter and Space activate focusable elements
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Polite `aria-live` announcements that clear themselves
///
/// A newer announcement keeps the live region until its own clear timer, so
/// the timer of an older one is ignored.
#[derive(Debug, Default)]
pub struct Announcer {
    generation: u32,
    current: Option<String>,
}

impl Announcer {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn announce(
        &mut self,
        message: &str,
        view: &mut impl PageView,
        scheduler: &mut impl Scheduler,
    ) {
        self.generation = self.generation.wrapping_add(1);
        self.current = Some(message.to_string());
        view.announce(message);
        scheduler.schedule(ANNOUNCEMENT_CLEAR, Timer::AnnouncementExpired(self.generation));
    }

    pub fn on_expired(&mut self, generation: u32, view: &mut impl PageView) {
        if generation != self.generation || self.current.is_none() {
            return;
        }
        self.current = None;
        view.announce("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessPlatform, TargetId};
    use chrono::DateTime;

    #[derive(Debug, Default)]
    struct LiveRegion {
        text: String,
        writes: usize,
    }

    impl PageView for LiveRegion {
        fn install_skip_link(&mut self, _text: &str, _href: &str) {}
        fn make_focusable(&mut self, _target: TargetId) {}
        fn activate(&mut self, _target: TargetId) {}
        fn announce(&mut self, message: &str) {
            self.text = message.to_string();
            self.writes += 1;
        }
        fn copy_via_selection(&mut self, _text: &str) -> bool {
            false
        }
        fn reload_page(&mut self) {}
    }

    fn fire_due(announcer: &mut Announcer, platform: &mut HeadlessPlatform, view: &mut LiveRegion, until: i64) {
        while let Some(timer) = platform.next_due(until) {
            if let Timer::AnnouncementExpired(generation) = timer {
                announcer.on_expired(generation, view);
            }
        }
    }

    #[test]
    fn test_activation_keys() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(!is_activation_key("Tab"));
        assert!(!is_activation_key("Spacebar"));
    }

    #[test]
    fn test_announcement_clears_after_a_second() {
        let mut platform = HeadlessPlatform::new(DateTime::from_timestamp_millis(0).unwrap());
        let mut view = LiveRegion::default();
        let mut announcer = Announcer::default();

        announcer.announce("Message sent", &mut view, &mut platform);
        assert_eq!(view.text, "Message sent");
        fire_due(&mut announcer, &mut platform, &mut view, 999);
        assert_eq!(announcer.current(), Some("Message sent"));
        fire_due(&mut announcer, &mut platform, &mut view, 1_000);
        assert_eq!(view.text, "");
        assert_eq!(announcer.current(), None);
    }

    #[test]
    fn test_newer_announcement_outlives_older_timer() {
        let mut platform = HeadlessPlatform::new(DateTime::from_timestamp_millis(0).unwrap());
        let mut view = LiveRegion::default();
        let mut announcer = Announcer::default();

        announcer.announce("first", &mut view, &mut platform);
        platform.set_now_millis(600);
        announcer.announce("second", &mut view, &mut platform);

        fire_due(&mut announcer, &mut platform, &mut view, 1_000);
        assert_eq!(view.text, "second");
        fire_due(&mut announcer, &mut platform, &mut view, 1_600);
        assert_eq!(view.text, "");
        assert_eq!(view.writes, 3);
    }
}
