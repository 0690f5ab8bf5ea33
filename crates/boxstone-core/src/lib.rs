//! Box Stone site logic
//!
//! Section transitions, the mobile menu, scroll-triggered animations and the
//! contact form pipeline of the Box Stone marketing site, written against
//! platform and view traits so it runs natively under test and in the
//! browser through the wasm crate.
//!
//! - [`site::Site`] owns every component and routes events and timers
//! - [`platform`] abstracts timers, visibility observation, storage and the
//!   clipboard
//! - [`platform::HeadlessPlatform`] drives everything from a virtual clock

pub mod analytics;
pub mod animation;
pub mod app;
pub mod config;
pub mod contact;
pub mod error;
pub mod navigation;
pub mod page;
pub mod platform;
pub mod site;

pub use config::SiteConfig;
pub use error::{SiteError, StorageError};
pub use site::{DebugSnapshot, Site, SiteView};

/// Version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
