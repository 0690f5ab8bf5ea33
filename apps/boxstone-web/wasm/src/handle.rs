use std::cell::RefCell;
use std::rc::Weak;

use boxstone_core::Site;
use tracing::warn;

use crate::dom::BrowserDom;
use crate::platform::BrowserPlatform;

pub type BrowserSite = Site<BrowserPlatform, BrowserDom>;

/// Non-owning reference to the site held by browser callbacks
///
/// Callbacks always run on a later task than the code that registered them,
/// so the site is never borrowed when they fire.
#[derive(Clone)]
pub struct SiteHandle(Weak<RefCell<BrowserSite>>);

impl SiteHandle {
    pub fn new(site: Weak<RefCell<BrowserSite>>) -> Self {
        Self(site)
    }

    /// Run `f` against the site; `None` once the site is gone or busy
    pub fn with<R>(&self, f: impl FnOnce(&mut BrowserSite) -> R) -> Option<R> {
        let site = self.0.upgrade()?;
        let Ok(mut site) = site.try_borrow_mut() else {
            warn!("Site is busy, dropping callback");
            return None;
        };
        Some(f(&mut site))
    }
}
