//! Browser bindings for the Box Stone site
//!
//! All site behavior lives in `boxstone-core`; this crate discovers the page,
//! implements the platform and view traits on top of `web-sys`, wires DOM
//! events to the site and exposes a handful of functions to page scripts.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { showSection, getContactStats } from './pkg/boxstone_wasm.js';
//!
//! await init(); // boots the site once the DOM is ready
//!
//! showSection('services');
//! console.log(getContactStats().total);
//! ```

pub mod discover;
pub mod dom;
pub mod events;
pub mod handle;
pub mod logging;
pub mod platform;

use std::cell::RefCell;
use std::rc::Rc;

use boxstone_core::app::EnvironmentInfo;
use boxstone_core::navigation::ShowOutcome;
use boxstone_core::{Site, SiteConfig};
use js_sys::{Object, Reflect};
use serde::Serialize;
use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, Window};

use crate::discover::{discover, TargetRegistry};
use crate::dom::BrowserDom;
use crate::handle::{BrowserSite, SiteHandle};
use crate::platform::{media_matches, BrowserPlatform};

/// Site configuration compiled into the module
const SITE_CONFIG: &str = include_str!("../site.toml");

thread_local! {
    static SITE: RefCell<Option<Rc<RefCell<BrowserSite>>>> = const { RefCell::new(None) };
}

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let parsed = SiteConfig::from_str(SITE_CONFIG);
    let environment = parsed
        .as_ref()
        .map(|config| config.site.environment)
        .unwrap_or_default();
    logging::init(environment);

    let config = parsed.unwrap_or_else(|err| {
        error!("Invalid site configuration, using defaults: {:#}", err);
        SiteConfig::default()
    });

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    if document.ready_state() == "loading" {
        let boot_later = Closure::once_into_js(move || {
            if let Err(err) = boot(config) {
                error!("Site failed to start: {:?}", err);
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", boot_later.unchecked_ref())?;
        Ok(())
    } else {
        boot(config)
    }
}

fn environment(window: &Window) -> EnvironmentInfo {
    let navigator = window.navigator();
    let location = window.location();
    EnvironmentInfo {
        user_agent: navigator.user_agent().unwrap_or_default(),
        online: navigator.on_line(),
        prefers_dark: media_matches(window, "(prefers-color-scheme: dark)"),
        path: location.pathname().unwrap_or_else(|_| "/".to_string()),
    }
}

fn boot(config: SiteConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document: Document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let registry = Rc::new(TargetRegistry::default());
    let inventory = discover(&document, &registry)?;
    info!(
        "Discovered {} animated elements, {} statistics, {} lazy images",
        inventory.animated.len(),
        inventory.stats.len(),
        inventory.lazy_images.len()
    );

    let dark_mode = config.features.dark_mode;
    let site = Rc::new_cyclic(|weak| {
        let handle = SiteHandle::new(weak.clone());
        let platform = BrowserPlatform::new(window.clone(), handle.clone(), registry.clone());
        let dom = BrowserDom::new(window.clone(), document.clone(), handle, registry.clone());
        RefCell::new(Site::new(config, platform, dom))
    });

    // Published before initialize so callbacks queued during startup find it
    SITE.with(|slot| *slot.borrow_mut() = Some(site.clone()));
    let debug = site.borrow().debug_enabled();

    site.borrow_mut().initialize(&environment(&window), &inventory);
    events::install(
        &window,
        &document,
        &SiteHandle::new(Rc::downgrade(&site)),
        dark_mode,
    )?;
    install_globals(&window, debug)
}

/// Log a failed export call and hand `fallback` to the page script instead
fn or_log(result: Result<JsValue, JsValue>, fallback: JsValue) -> JsValue {
    result.unwrap_or_else(|err| {
        warn!("{:?}", err);
        fallback
    })
}

/// Install the page-script API on `window`
///
/// Inline handlers in the markup call these names directly, so they must
/// exist as plain globals and not only as module exports.
pub fn install_globals(window: &Window, debug: bool) -> Result<(), JsValue> {
    let show = Closure::<dyn Fn(String) -> JsValue>::new(|section: String| {
        or_log(show_section(&section).map(JsValue::from_bool), JsValue::from_bool(false))
    })
    .into_js_value();
    let toggle = Closure::<dyn Fn()>::new(|| {
        if let Err(err) = toggle_mobile_menu() {
            warn!("{:?}", err);
        }
    })
    .into_js_value();
    let stats = Closure::<dyn Fn() -> JsValue>::new(|| or_log(get_contact_stats(), JsValue::NULL))
        .into_js_value();
    let csv = Closure::<dyn Fn() -> JsValue>::new(|| {
        or_log(export_contacts_to_csv().map(JsValue::from), JsValue::from_str(""))
    })
    .into_js_value();
    // The form's submit listener does the work; this only stops navigation
    let submit = Closure::<dyn Fn(JsValue)>::new(|event: JsValue| {
        if let Some(event) = event.dyn_ref::<Event>() {
            event.prevent_default();
        }
    })
    .into_js_value();
    let announce = Closure::<dyn Fn(String)>::new(|message: String| {
        if let Err(err) = with_site(|site| site.announce(&message)) {
            warn!("{:?}", err);
        }
    })
    .into_js_value();

    for (name, function) in [
        ("showSection", &show),
        ("toggleMobileMenu", &toggle),
        ("getContactStats", &stats),
        ("exportContactsToCSV", &csv),
        ("handleSubmit", &submit),
        ("announceToScreenReader", &announce),
    ] {
        Reflect::set(window, &JsValue::from_str(name), function)?;
    }

    if debug {
        let tools = Object::new();
        let snapshot = Closure::<dyn Fn() -> JsValue>::new(|| {
            or_log(
                with_site(|site| to_js(&site.debug_snapshot())).and_then(|value| value),
                JsValue::NULL,
            )
        })
        .into_js_value();
        for (name, function) in [
            ("snapshot", &snapshot),
            ("showSection", &show),
            ("getContactStats", &stats),
            ("exportContactsToCSV", &csv),
        ] {
            Reflect::set(&tools, &JsValue::from_str(name), function)?;
        }
        Reflect::set(window, &JsValue::from_str("BoxStoneDebug"), &tools)?;
        info!("BoxStoneDebug tools available on window");
    }
    Ok(())
}

fn with_site<R>(f: impl FnOnce(&mut BrowserSite) -> R) -> Result<R, JsValue> {
    SITE.with(|slot| {
        let slot = slot.borrow();
        let site = slot
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Site is not initialized"))?;
        let mut site = site
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Site is busy"))?;
        Ok(f(&mut site))
    })
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Start a transition to `section`
/// Returns false when the request was ignored or the section does not exist
#[wasm_bindgen(js_name = showSection)]
pub fn show_section(section: &str) -> Result<bool, JsValue> {
    with_site(|site| match site.show_section(section) {
        Ok(outcome) => outcome == ShowOutcome::Started,
        Err(err) => {
            warn!("{}", err);
            false
        }
    })
}

#[wasm_bindgen(js_name = toggleMobileMenu)]
pub fn toggle_mobile_menu() -> Result<(), JsValue> {
    with_site(|site| site.toggle_menu())
}

/// Totals of stored contact requests
#[wasm_bindgen(js_name = getContactStats)]
pub fn get_contact_stats() -> Result<JsValue, JsValue> {
    let stats = with_site(|site| site.contact_stats())?;
    to_js(&stats)
}

/// Stored contact requests as CSV text
#[wasm_bindgen(js_name = exportContactsToCSV)]
pub fn export_contacts_to_csv() -> Result<String, JsValue> {
    with_site(|site| site.export_contacts_csv())
}

#[wasm_bindgen(js_name = getAppState)]
pub fn get_app_state() -> Result<JsValue, JsValue> {
    let state = with_site(|site| site.state().clone())?;
    to_js(&state)
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    boxstone_core::version().to_string()
}
