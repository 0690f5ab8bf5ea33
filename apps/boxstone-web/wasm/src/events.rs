//! Page-level event listeners
//!
//! Every listener lives as long as the page, so closures are leaked with
//! `forget()` once attached.

use std::cell::RefCell;
use std::rc::Rc;

use boxstone_core::contact::{format_as_typed, ContactField, FormValues, FormView};
use boxstone_core::navigation::KeyPress;
use boxstone_core::page::{ScriptError, FOCUSABLE_SELECTOR};
use js_sys::Reflect;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, ErrorEvent, Event, EventTarget, HtmlInputElement, HtmlTextAreaElement,
    KeyboardEvent, PromiseRejectionEvent, Window,
};

use crate::discover::{elements, TargetRegistry};
use crate::dom::{hide_tooltip, show_tooltip, CONTACT_FORM_ID};
use crate::handle::SiteHandle;
use crate::platform::{media_matches, REDUCED_MOTION_QUERY};

const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

pub(crate) fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Current value of an input or textarea
fn field_value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    element
        .dyn_ref::<HtmlTextAreaElement>()
        .map(|area| area.value())
}

fn set_field_value(element: &Element, value: &str) {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(value);
    }
}

fn read_form(form: &Element) -> Result<FormValues, JsValue> {
    let mut values = FormValues::default();
    for field in ContactField::ALL {
        let selector = format!("[name=\"{}\"]", field.name());
        if let Some(value) = form.query_selector(&selector)?.as_ref().and_then(field_value) {
            values.set(field, value);
        }
    }
    Ok(values)
}

/// The contact field an event was raised on, if any
fn event_field(event: &Event) -> Option<(ContactField, Element)> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    let field = ContactField::from_name(&element.get_attribute("name")?)?;
    Some((field, element))
}

fn in_text_field(document: &Document) -> bool {
    document
        .active_element()
        .map(|element| matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA"))
        .unwrap_or(false)
}

/// Attach every listener the site reacts to
pub fn install(
    window: &Window,
    document: &Document,
    site: &SiteHandle,
    dark_mode: bool,
) -> Result<(), JsValue> {
    install_navigation(window, document, site)?;
    install_environment(window, site, dark_mode)?;
    install_contact_form(document, site)?;
    install_page(window, document, site)?;
    debug!("Event listeners installed");
    Ok(())
}

fn install_navigation(window: &Window, document: &Document, site: &SiteHandle) -> Result<(), JsValue> {
    if let Some(button) = document.query_selector(".mobile-menu")? {
        let site = site.clone();
        listen(&button, "click", move |_event| {
            site.with(|site| site.toggle_menu());
        })?;
    }

    for link in elements(document, ".nav-link[data-section]")? {
        let Some(section) = link.get_attribute("data-section") else {
            continue;
        };
        let site = site.clone();
        listen(&link, "click", move |event| {
            event.prevent_default();
            site.with(|site| {
                if let Err(err) = site.show_section(&section) {
                    warn!("{}", err);
                }
                site.close_menu();
            });
        })?;
    }

    {
        let site = site.clone();
        let window_for_resize = window.clone();
        listen(window, "resize", move |_event| {
            let width = window_for_resize
                .inner_width()
                .ok()
                .and_then(|width| width.as_f64())
                .unwrap_or(0.0);
            site.with(|site| site.on_resize(width as u32));
        })?;
    }

    {
        let site = site.clone();
        let window_for_scroll = window.clone();
        listen(window, "scroll", move |_event| {
            let scroll_y = window_for_scroll.scroll_y().unwrap_or(0.0);
            site.with(|site| site.on_scroll(scroll_y));
        })?;
    }

    let site = site.clone();
    let document_for_keys = document.clone();
    listen(document, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let key = event.key();
        let press = KeyPress {
            key: &key,
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
            in_text_field: in_text_field(&document_for_keys),
        };
        if site.with(|site| site.on_key(&press)).unwrap_or(false) {
            event.prevent_default();
        }
    })
}

fn install_environment(window: &Window, site: &SiteHandle, dark_mode: bool) -> Result<(), JsValue> {
    for (event, online) in [("online", true), ("offline", false)] {
        let site = site.clone();
        listen(window, event, move |_event| {
            site.with(|site| site.set_online(online));
        })?;
    }

    if dark_mode {
        if let Some(query) = window.match_media(DARK_SCHEME_QUERY)? {
            let site = site.clone();
            let window_for_scheme = window.clone();
            listen(&query, "change", move |_event| {
                let prefers_dark = media_matches(&window_for_scheme, DARK_SCHEME_QUERY);
                site.with(|site| site.on_color_scheme_change(prefers_dark));
            })?;
        }
    }

    let site = site.clone();
    let window_for_load = window.clone();
    listen(window, "load", move |_event| {
        let Some(performance) = window_for_load.performance() else {
            return;
        };
        let elapsed = performance.now();
        site.with(|site| site.record_performance("page_load_time", elapsed));
    })
}

fn install_contact_form(document: &Document, site: &SiteHandle) -> Result<(), JsValue> {
    let Some(form) = document.get_element_by_id(CONTACT_FORM_ID) else {
        debug!("No contact form on this page");
        return Ok(());
    };

    {
        let site = site.clone();
        let form_for_submit = form.clone();
        listen(&form, "submit", move |event| {
            event.prevent_default();
            match read_form(&form_for_submit) {
                Ok(values) => {
                    site.with(|site| site.submit_contact(values));
                }
                Err(err) => warn!("Failed to read contact form: {:?}", err),
            }
        })?;
    }

    // blur does not bubble, focusout does
    {
        let site = site.clone();
        listen(&form, "focusout", move |event| {
            let Some((field, element)) = event_field(&event) else {
                return;
            };
            let value = field_value(&element).unwrap_or_default();
            site.with(|site| site.validate_field(field, &value));
        })?;
    }

    let site = site.clone();
    listen(&form, "input", move |event| {
        let Some((field, element)) = event_field(&event) else {
            return;
        };
        site.with(|site| site.view_mut().clear_field_error(field));
        let value = field_value(&element).unwrap_or_default();
        if let Some(formatted) = format_as_typed(field, &value) {
            if formatted != value {
                set_field_value(&element, &formatted);
            }
        }
    })
}

/// Text a `[data-copy]` element copies: the attribute, else its own text
pub fn copy_text_of(element: &Element) -> String {
    match element.get_attribute("data-copy") {
        Some(text) if !text.is_empty() => text,
        _ => element.text_content().unwrap_or_default(),
    }
}

fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn script_error(event: &Event) -> Option<ScriptError> {
    if let Some(event) = event.dyn_ref::<ErrorEvent>() {
        let stack = Reflect::get(&event.error(), &JsValue::from_str("stack"))
            .ok()
            .and_then(|stack| stack.as_string());
        return Some(ScriptError::uncaught(event.message(), stack));
    }
    event
        .dyn_ref::<PromiseRejectionEvent>()
        .map(|event| ScriptError::rejection(describe(&event.reason())))
}

fn install_page(window: &Window, document: &Document, site: &SiteHandle) -> Result<(), JsValue> {
    for event in ["error", "unhandledrejection"] {
        let site = site.clone();
        listen(window, event, move |event| {
            if let Some(err) = script_error(&event) {
                site.with(|site| site.on_script_error(&err));
            }
        })?;
    }

    {
        let site = site.clone();
        let document_for_visibility = document.clone();
        listen(document, "visibilitychange", move |_event| {
            let hidden = document_for_visibility.hidden();
            site.with(|site| site.on_page_visibility(hidden));
        })?;
    }

    if let Some(query) = window.match_media(REDUCED_MOTION_QUERY)? {
        let site = site.clone();
        let window_for_motion = window.clone();
        listen(&query, "change", move |_event| {
            let reduced = media_matches(&window_for_motion, REDUCED_MOTION_QUERY);
            site.with(|site| site.on_reduced_motion_change(reduced));
        })?;
    }

    for anchor in elements(document, "[data-tooltip]")? {
        let current: Rc<RefCell<Option<Element>>> = Rc::new(RefCell::new(None));
        {
            let current = current.clone();
            let window = window.clone();
            let document = document.clone();
            let anchor_for_enter = anchor.clone();
            listen(&anchor, "mouseenter", move |_event| {
                match show_tooltip(&window, &document, &anchor_for_enter) {
                    Ok(tooltip) => *current.borrow_mut() = tooltip,
                    Err(err) => warn!("Failed to show tooltip: {:?}", err),
                }
            })?;
        }
        let window = window.clone();
        listen(&anchor, "mouseleave", move |_event| {
            if let Some(tooltip) = current.borrow_mut().take() {
                if let Err(err) = hide_tooltip(&window, tooltip) {
                    warn!("Failed to hide tooltip: {:?}", err);
                }
            }
        })?;
    }

    for element in elements(document, "[data-copy]")? {
        let site = site.clone();
        let element_for_click = element.clone();
        listen(&element, "click", move |_event| {
            let text = copy_text_of(&element_for_click);
            site.with(|site| site.copy_text(&text));
        })?;
    }

    // Tab stops were given during initialize; the keys land on the same elements
    for element in elements(document, FOCUSABLE_SELECTOR)? {
        let Some(target) = TargetRegistry::target_of(&element) else {
            continue;
        };
        let site = site.clone();
        listen(&element, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = event.key();
            if site.with(|site| site.on_focusable_key(target, &key)).unwrap_or(false) {
                event.prevent_default();
            }
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn element(html: &str) -> Element {
        let document = web_sys::window().unwrap().document().unwrap();
        let body = document.body().unwrap();
        body.set_inner_html(html);
        body.first_element_child().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_copy_text_prefers_attribute() {
        assert_eq!(
            copy_text_of(&element(r#"<span data-copy="info@boxstone.es">Email us</span>"#)),
            "info@boxstone.es"
        );
        assert_eq!(
            copy_text_of(&element(r#"<span data-copy>+34 600 123 456</span>"#)),
            "+34 600 123 456"
        );
    }

    #[wasm_bindgen_test]
    fn test_rejection_reason_is_described() {
        let reason: JsValue = js_sys::Error::new("network down").into();
        assert_eq!(describe(&reason), "network down");
        assert_eq!(describe(&JsValue::from_str("plain")), "plain");
    }
}
