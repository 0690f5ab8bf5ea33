use std::time::Duration;

use tracing::debug;

use crate::platform::{Scheduler, Timer};

/// DOM operations behind the mobile menu
pub trait MenuView {
    /// Show or hide the navigation panel and morph the hamburger icon
    fn set_menu_open(&mut self, open: bool);
    /// Register the document-wide click listener that closes the menu
    fn attach_outside_click(&mut self);
    fn detach_outside_click(&mut self);
}

/// Open/closed state of the mobile navigation panel
///
/// Opening schedules the outside-click listener instead of attaching it, so
/// the click that opened the menu has finished bubbling before the listener
/// exists. The listener is only ever attached while the menu is open and is
/// detached on close.
#[derive(Debug)]
pub struct MobileMenu {
    open: bool,
    listener_attached: bool,
    breakpoint: u32,
    attach_delay: Duration,
    generation: u32,
}

impl MobileMenu {
    pub fn new(breakpoint: u32, attach_delay: Duration) -> Self {
        Self {
            open: false,
            listener_attached: false,
            breakpoint,
            attach_delay,
            generation: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn listener_attached(&self) -> bool {
        self.listener_attached
    }

    pub fn toggle(&mut self, view: &mut impl MenuView, scheduler: &mut impl Scheduler) {
        if self.open {
            self.close(view);
        } else {
            self.open(view, scheduler);
        }
    }

    pub fn open(&mut self, view: &mut impl MenuView, scheduler: &mut impl Scheduler) {
        if self.open {
            return;
        }
        self.open = true;
        self.generation = self.generation.wrapping_add(1);
        view.set_menu_open(true);
        scheduler.schedule(self.attach_delay, Timer::MenuListener(self.generation));
        debug!("Mobile menu opened");
    }

    pub fn close(&mut self, view: &mut impl MenuView) {
        if !self.open {
            return;
        }
        self.open = false;
        view.set_menu_open(false);
        if self.listener_attached {
            view.detach_outside_click();
            self.listener_attached = false;
        }
        debug!("Mobile menu closed");
    }

    /// Attach the outside-click listener scheduled by `open`
    ///
    /// Timers from an earlier open/close cycle are ignored.
    pub fn on_listener_timer(&mut self, generation: u32, view: &mut impl MenuView) {
        if !self.open || generation != self.generation || self.listener_attached {
            return;
        }
        view.attach_outside_click();
        self.listener_attached = true;
    }

    /// Document click while the menu is open
    pub fn on_document_click(&mut self, inside_nav: bool, view: &mut impl MenuView) {
        if !inside_nav {
            self.close(view);
        }
    }

    /// Close the menu once the viewport is wider than the mobile breakpoint
    pub fn on_resize(&mut self, viewport_width: u32, view: &mut impl MenuView) {
        if viewport_width > self.breakpoint {
            self.close(view);
        }
    }
}
