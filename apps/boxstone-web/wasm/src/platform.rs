//! Browser implementations of the platform capabilities

use std::rc::Rc;
use std::time::Duration;

use boxstone_core::platform::{
    Clipboard, CopyStatus, KeyValueStore, ObserverOptions, Platform, Scheduler, TargetId, Timer,
    VisibilityEntry, VisibilityObserver,
};
use boxstone_core::StorageError;
use chrono::{FixedOffset, Offset, Utc};
use js_sys::{Array, Function, Promise, Reflect};
use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};

use crate::discover::TargetRegistry;
use crate::handle::SiteHandle;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Whether a media query currently matches
pub fn media_matches(window: &Window, query: &str) -> bool {
    window
        .match_media(query)
        .ok()
        .flatten()
        .map(|list| list.matches())
        .unwrap_or(false)
}

fn supports_intersection_observer(window: &Window) -> bool {
    Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

pub struct BrowserPlatform {
    window: Window,
    site: SiteHandle,
    observer: Option<BrowserObserver>,
    storage: Option<LocalStore>,
    clipboard: Option<BrowserClipboard>,
    reduced_motion: bool,
}

impl BrowserPlatform {
    pub fn new(window: Window, site: SiteHandle, registry: Rc<TargetRegistry>) -> Self {
        let observer = if supports_intersection_observer(&window) {
            Some(BrowserObserver::new(site.clone(), registry))
        } else {
            info!("IntersectionObserver not supported");
            None
        };
        let storage = match window.local_storage() {
            Ok(Some(storage)) => Some(LocalStore(storage)),
            _ => {
                warn!("localStorage unavailable, contacts stay in memory");
                None
            }
        };
        let clipboard = BrowserClipboard::new(&window, site.clone());
        if clipboard.is_none() {
            info!("Async clipboard API unavailable, copies use a text selection");
        }
        let reduced_motion = media_matches(&window, REDUCED_MOTION_QUERY);

        Self {
            window,
            site,
            observer,
            storage,
            clipboard,
            reduced_motion,
        }
    }
}

impl Scheduler for BrowserPlatform {
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    fn schedule(&mut self, delay: Duration, timer: Timer) {
        let site = self.site.clone();
        let callback = Closure::once_into_js(move || {
            site.with(|site| site.fire(timer));
        });
        let delay = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            error!("Failed to schedule {:?}: {:?}", timer, err);
        }
    }
}

impl Platform for BrowserPlatform {
    fn observer(&mut self) -> Option<&mut dyn VisibilityObserver> {
        self.observer
            .as_mut()
            .map(|o| o as &mut dyn VisibilityObserver)
    }

    fn storage(&mut self) -> Option<&mut dyn KeyValueStore> {
        self.storage.as_mut().map(|s| s as &mut dyn KeyValueStore)
    }

    fn clipboard(&mut self) -> Option<&mut dyn Clipboard> {
        self.clipboard.as_mut().map(|c| c as &mut dyn Clipboard)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn utc_offset(&self) -> FixedOffset {
        // getTimezoneOffset is minutes behind UTC
        let minutes = js_sys::Date::new_0().get_timezone_offset();
        FixedOffset::west_opt((minutes * 60.0) as i32).unwrap_or_else(|| Utc.fix())
    }
}

type EntriesCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// One `IntersectionObserver` per distinct option set, sharing a callback
pub struct BrowserObserver {
    registry: Rc<TargetRegistry>,
    callback: EntriesCallback,
    observers: Vec<(ObserverOptions, IntersectionObserver)>,
}

impl BrowserObserver {
    fn new(site: SiteHandle, registry: Rc<TargetRegistry>) -> Self {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let entries: Vec<VisibilityEntry> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        Some(VisibilityEntry {
                            target: TargetRegistry::target_of(&entry.target())?,
                            is_intersecting: entry.is_intersecting(),
                        })
                    })
                    .collect();
                site.with(|site| site.on_visibility(&entries));
            },
        );

        Self {
            registry,
            callback,
            observers: Vec::new(),
        }
    }

    fn observer_for(&mut self, options: &ObserverOptions) -> Result<&IntersectionObserver, JsValue> {
        let index = match self.observers.iter().position(|(o, _)| o == options) {
            Some(index) => index,
            None => {
                let init = IntersectionObserverInit::new();
                init.set_threshold(&JsValue::from_f64(options.threshold));
                init.set_root_margin(&options.root_margin);
                let observer = IntersectionObserver::new_with_options(
                    self.callback.as_ref().unchecked_ref(),
                    &init,
                )?;
                self.observers.push((options.clone(), observer));
                self.observers.len() - 1
            }
        };
        Ok(&self.observers[index].1)
    }
}

impl VisibilityObserver for BrowserObserver {
    fn observe(&mut self, target: TargetId, options: &ObserverOptions) {
        let Some(element) = self.registry.get(target) else {
            warn!("Unknown target {}", target);
            return;
        };
        match self.observer_for(options) {
            Ok(observer) => observer.observe(&element),
            Err(err) => error!("Failed to create IntersectionObserver: {:?}", err),
        }
    }

    fn unobserve(&mut self, target: TargetId) {
        if let Some(element) = self.registry.get(target) {
            for (_, observer) in &self.observers {
                observer.unobserve(&element);
            }
        }
    }
}

/// `navigator.clipboard.writeText`, resolved on a later microtask
pub struct BrowserClipboard {
    clipboard: JsValue,
    site: SiteHandle,
}

impl BrowserClipboard {
    fn new(window: &Window, site: SiteHandle) -> Option<Self> {
        let clipboard = Reflect::get(&window.navigator(), &JsValue::from_str("clipboard")).ok()?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return None;
        }
        Some(Self { clipboard, site })
    }

    fn write_promise(&self, text: &str) -> Result<Promise, JsValue> {
        let write: Function = Reflect::get(&self.clipboard, &JsValue::from_str("writeText"))?.dyn_into()?;
        write
            .call1(&self.clipboard, &JsValue::from_str(text))?
            .dyn_into::<Promise>()
    }
}

impl Clipboard for BrowserClipboard {
    fn write_text(&mut self, text: &str) -> CopyStatus {
        let promise = match self.write_promise(text) {
            Ok(promise) => promise,
            Err(err) => {
                warn!("Clipboard write failed: {:?}", err);
                return CopyStatus::Failed;
            }
        };
        let site = self.site.clone();
        let text = text.to_string();
        spawn_local(async move {
            let copied = match JsFuture::from(promise).await {
                Ok(_) => true,
                Err(err) => {
                    warn!("Clipboard write rejected: {:?}", err);
                    false
                }
            };
            site.with(|site| site.finish_copy(&text, copied));
        });
        CopyStatus::Pending
    }
}

/// `localStorage` as a [`KeyValueStore`]
pub struct LocalStore(web_sys::Storage);

impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get_item(key).map_err(storage_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.set_item(key, value).map_err(storage_error)
    }
}

/// Classify a DOMException thrown by `localStorage`
pub fn storage_error(err: JsValue) -> StorageError {
    let name = Reflect::get(&err, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string());
    match name.as_deref() {
        Some("QuotaExceededError") | Some("NS_ERROR_DOM_QUOTA_REACHED") => {
            StorageError::QuotaExceeded
        }
        Some("SecurityError") => StorageError::Unavailable,
        _ => StorageError::Backend(format!("{:?}", err)),
    }
}
