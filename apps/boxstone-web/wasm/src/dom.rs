//! DOM rendering of every site view

use std::rc::Rc;
use std::time::Duration;

use boxstone_core::animation::{AnimationVariant, AnimationView};
use boxstone_core::app::{Notice, NoticeView, Theme};
use boxstone_core::contact::{ContactField, FormView};
use boxstone_core::navigation::{MenuView, SectionChange, SectionId, SectionStyle, SectionView};
use boxstone_core::page::{tooltip_position, AnchorRect, PageView, TOOLTIP_FADE};
use boxstone_core::platform::TargetId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, HtmlButtonElement, HtmlDocument,
    HtmlElement, HtmlFormElement, HtmlImageElement, HtmlTextAreaElement, Node, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::discover::{elements, TargetRegistry};
use crate::events::listen;
use crate::handle::SiteHandle;

pub const CONTACT_FORM_ID: &str = "contactForm";
pub const ANNOUNCER_ID: &str = "bsAnnouncer";
const ERROR_COLOR: &str = "#e74c3c";
const SECTION_EASING: &str = "cubic-bezier(0.4, 0, 0.2, 1)";
const SKIP_LINK_HIDDEN_TOP: &str = "-40px";
const SKIP_LINK_FOCUSED_TOP: &str = "6px";

/// Log a failed DOM operation instead of propagating it
fn report(result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn!("DOM operation failed: {:?}", err);
    }
}

fn set_styles(element: &Element, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let Some(element) = element.dyn_ref::<HtmlElement>() else {
        return Ok(());
    };
    let style = element.style();
    for (property, value) in styles {
        if value.is_empty() {
            style.remove_property(property)?;
        } else {
            style.set_property(property, value)?;
        }
    }
    Ok(())
}

fn run_later(window: &Window, delay: Duration, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let callback = Closure::once_into_js(f);
    let delay = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)?;
    Ok(())
}

/// Serialize `detail` and dispatch a `CustomEvent` on the document
///
/// Dispatch waits for a microtask: the site is still borrowed while it renders,
/// and page listeners are free to call back into it.
fn dispatch_custom<T: Serialize>(
    window: &Window,
    document: &Document,
    name: &str,
    detail: &T,
) -> Result<(), JsValue> {
    let detail = serde_wasm_bindgen::to_value(detail)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))?;
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    let event = CustomEvent::new_with_event_init_dict(name, &init)?;
    let document = document.clone();
    let dispatch = Closure::once_into_js(move || {
        if let Err(err) = document.dispatch_event(&event) {
            warn!("Failed to dispatch {}: {:?}", event.type_(), err);
        }
    });
    window.queue_microtask(dispatch.unchecked_ref());
    Ok(())
}

/// Show the `data-tooltip` text of `anchor` centered above it
pub fn show_tooltip(window: &Window, document: &Document, anchor: &Element) -> Result<Option<Element>, JsValue> {
    let (Some(text), Some(body)) = (anchor.get_attribute("data-tooltip"), document.body()) else {
        return Ok(None);
    };
    let tooltip = document.create_element("div")?;
    tooltip.set_class_name("tooltip");
    tooltip.set_text_content(Some(&text));
    set_styles(
        &tooltip,
        &[
            ("position", "fixed"),
            ("background", "rgba(0, 0, 0, 0.8)"),
            ("color", "white"),
            ("padding", "0.5rem"),
            ("border-radius", "4px"),
            ("font-size", "0.9rem"),
            ("z-index", "10000"),
            ("pointer-events", "none"),
            ("opacity", "0"),
            ("transition", "opacity 0.3s"),
        ],
    )?;
    body.append_child(&tooltip)?;

    let rect = anchor.get_bounding_client_rect();
    let (width, height) = tooltip
        .dyn_ref::<HtmlElement>()
        .map(|t| (f64::from(t.offset_width()), f64::from(t.offset_height())))
        .unwrap_or_default();
    let anchor_rect = AnchorRect {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
    };
    let (left, top) = tooltip_position(anchor_rect, width, height);
    set_styles(
        &tooltip,
        &[("left", &format!("{}px", left)), ("top", &format!("{}px", top))],
    )?;

    let fading_in = tooltip.clone();
    run_later(window, Duration::from_millis(10), move || {
        report(set_styles(&fading_in, &[("opacity", "1")]));
    })?;
    Ok(Some(tooltip))
}

/// Fade `tooltip` out and remove it
pub fn hide_tooltip(window: &Window, tooltip: Element) -> Result<(), JsValue> {
    set_styles(&tooltip, &[("opacity", "0")])?;
    run_later(window, TOOLTIP_FADE, move || tooltip.remove())
}

#[derive(Serialize)]
struct AppInitializedDetail<'a> {
    version: &'a str,
    timestamp: String,
}

pub struct BrowserDom {
    window: Window,
    document: Document,
    registry: Rc<TargetRegistry>,
    outside_click: Closure<dyn FnMut(Event)>,
}

impl BrowserDom {
    pub fn new(window: Window, document: Document, site: SiteHandle, registry: Rc<TargetRegistry>) -> Self {
        let nav_document = document.clone();
        // Created once and reused, since it detaches itself while running
        let outside_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let inside_nav = match (nav_document.query_selector("nav"), event.target()) {
                (Ok(Some(nav)), Some(target)) => nav.contains(target.dyn_ref::<Node>()),
                _ => false,
            };
            site.with(|site| site.on_document_click(inside_nav));
        });

        Self {
            window,
            document,
            registry,
            outside_click,
        }
    }

    fn target(&self, target: TargetId) -> Result<Element, JsValue> {
        self.registry
            .get(target)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown target {}", target)))
    }

    fn form(&self) -> Result<Element, JsValue> {
        self.document
            .get_element_by_id(CONTACT_FORM_ID)
            .ok_or_else(|| JsValue::from_str("Contact form not found"))
    }

    fn field(&self, field: ContactField) -> Result<Option<Element>, JsValue> {
        self.form()?
            .query_selector(&format!("[name=\"{}\"]", field.name()))
    }

    fn section_style(&self, id: &SectionId, style: SectionStyle) -> Result<(), JsValue> {
        let Some(section) = self.document.get_element_by_id(id.as_str()) else {
            return Ok(());
        };
        match style {
            SectionStyle::Exiting => set_styles(
                &section,
                &[("opacity", "0"), ("transform", "translateX(-50px)")],
            ),
            SectionStyle::Entering => set_styles(
                &section,
                &[
                    ("transition", ""),
                    ("opacity", "0"),
                    ("transform", "translateX(50px)"),
                ],
            ),
            SectionStyle::Entered { duration } => {
                let transition = format!("all {}ms {}", duration.as_millis(), SECTION_EASING);
                set_styles(
                    &section,
                    &[
                        ("transition", &transition),
                        ("opacity", "1"),
                        ("transform", "translateX(0)"),
                    ],
                )
            }
            SectionStyle::Resting => set_styles(
                &section,
                &[("transition", ""), ("opacity", ""), ("transform", "")],
            ),
        }
    }

    fn menu_visuals(&self, open: bool) -> Result<(), JsValue> {
        if let Some(links) = self.document.get_element_by_id("navLinks") {
            links.class_list().toggle_with_force("active", open)?;
        }
        let Some(button) = self.document.query_selector(".mobile-menu")? else {
            return Ok(());
        };
        let spans = button.query_selector_all("span")?;
        let poses: [(&str, &str); 3] = if open {
            [
                ("transform", "rotate(45deg) translate(5px, 5px)"),
                ("opacity", "0"),
                ("transform", "rotate(-45deg) translate(7px, -6px)"),
            ]
        } else {
            [("transform", ""), ("opacity", ""), ("transform", "")]
        };
        for (i, pose) in poses.iter().enumerate() {
            if let Some(span) = spans.item(i as u32).and_then(|n| n.dyn_into::<Element>().ok()) {
                set_styles(&span, &[*pose])?;
            }
        }
        Ok(())
    }

    fn highlight(&self, id: &SectionId) -> Result<(), JsValue> {
        for link in elements(&self.document, ".nav-link")? {
            let matches = link.get_attribute("data-section").as_deref() == Some(id.as_str())
                || link
                    .get_attribute("onclick")
                    .is_some_and(|onclick| onclick.contains(id.as_str()));
            link.class_list().toggle_with_force("active", matches)?;
        }
        Ok(())
    }

    fn show_field_error_in_dom(&self, field: ContactField, message: &str) -> Result<(), JsValue> {
        self.clear_field_error_in_dom(field)?;
        let Some(input) = self.field(field)? else {
            return Ok(());
        };
        let group = input.closest(".form-group")?;
        let error = self.document.create_element("span")?;
        error.set_class_name("field-error");
        error.set_text_content(Some(message));
        set_styles(
            &error,
            &[
                ("color", ERROR_COLOR),
                ("font-size", "0.9rem"),
                ("margin-top", "0.5rem"),
                ("display", "block"),
            ],
        )?;
        match group {
            Some(group) => {
                group.append_child(&error)?;
            }
            None => {
                input.insert_adjacent_element("afterend", &error)?;
            }
        }
        set_styles(
            &input,
            &[
                ("border-color", ERROR_COLOR),
                ("box-shadow", "0 0 5px rgba(231, 76, 60, 0.3)"),
            ],
        )
    }

    fn clear_field_error_in_dom(&self, field: ContactField) -> Result<(), JsValue> {
        let Some(input) = self.field(field)? else {
            return Ok(());
        };
        if let Some(group) = input.closest(".form-group")? {
            if let Some(error) = group.query_selector(".field-error")? {
                error.remove();
            }
        }
        set_styles(&input, &[("border-color", ""), ("box-shadow", "")])
    }

    fn clear_all_errors_in_dom(&self) -> Result<(), JsValue> {
        for error in elements(&self.document, ".field-error, .form-error")? {
            error.remove();
        }
        for input in elements(&self.document, "#contactForm input, #contactForm textarea")? {
            set_styles(&input, &[("border-color", ""), ("box-shadow", "")])?;
        }
        Ok(())
    }

    fn submitting(&self, submitting: bool) -> Result<(), JsValue> {
        let Some(button) = self.form()?.query_selector("button[type=\"submit\"]")? else {
            return Ok(());
        };
        let Some(button) = button.dyn_ref::<HtmlButtonElement>() else {
            return Ok(());
        };
        button.set_disabled(submitting);
        if submitting {
            let label = button.text_content().unwrap_or_default();
            button.set_attribute("data-label", &label)?;
            button.set_inner_html("<div class=\"loading-spinner\"></div> Sending...");
        } else if let Some(label) = button.get_attribute("data-label") {
            button.set_text_content(Some(&label));
        }
        Ok(())
    }

    fn form_banner(&self, message: &str) -> Result<(), JsValue> {
        let form = self.form()?;
        if let Some(existing) = form.query_selector(".form-error")? {
            existing.remove();
        }
        let banner = self.document.create_element("div")?;
        banner.set_class_name("form-error");
        banner.set_text_content(Some(message));
        set_styles(
            &banner,
            &[
                ("background", "linear-gradient(135deg, #e74c3c, #c0392b)"),
                ("color", "white"),
                ("padding", "1rem"),
                ("border-radius", "10px"),
                ("margin", "1rem 0"),
                ("text-align", "center"),
                ("animation", "fadeInUp 0.5s ease"),
            ],
        )?;
        form.insert_before(&banner, form.first_child().as_ref())?;
        Ok(())
    }

    fn success(&self, visible: bool) -> Result<(), JsValue> {
        let Some(message) = self.document.get_element_by_id("successMessage") else {
            return Ok(());
        };
        set_styles(&message, &[("display", if visible { "block" } else { "none" })])?;
        if visible {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Center);
            message.scroll_into_view_with_scroll_into_view_options(&options);
        }
        Ok(())
    }

    fn toast(&self, notice: &Notice) -> Result<(), JsValue> {
        let Some(body) = self.document.body() else {
            return Ok(());
        };
        let toast = self.document.create_element("div")?;
        toast.set_class_name(&format!("notification notification--{}", notice.kind.as_str()));
        toast.set_text_content(Some(&notice.message));
        body.append_child(&toast)?;

        run_later(&self.window, notice.duration, move || toast.remove())
    }

    fn skip_link(&self, text: &str, href: &str) -> Result<(), JsValue> {
        let Some(body) = self.document.body() else {
            return Ok(());
        };
        if self.document.query_selector(".skip-link")?.is_some() {
            return Ok(());
        }
        let link = self.document.create_element("a")?;
        link.set_class_name("skip-link");
        link.set_attribute("href", href)?;
        link.set_text_content(Some(text));
        set_styles(
            &link,
            &[
                ("position", "absolute"),
                ("top", SKIP_LINK_HIDDEN_TOP),
                ("left", "6px"),
                ("background", "var(--primary-color)"),
                ("color", "white"),
                ("padding", "8px"),
                ("text-decoration", "none"),
                ("border-radius", "4px"),
                ("z-index", "10000"),
                ("transition", "top 0.3s ease"),
            ],
        )?;
        for (event, top) in [("focus", SKIP_LINK_FOCUSED_TOP), ("blur", SKIP_LINK_HIDDEN_TOP)] {
            let link_for_event = link.clone();
            listen(&link, event, move |_event| {
                report(set_styles(&link_for_event, &[("top", top)]));
            })?;
        }
        body.insert_before(&link, body.first_child().as_ref())?;
        Ok(())
    }

    /// The visually hidden `aria-live` region, created on first use
    fn live_region(&self) -> Result<Option<Element>, JsValue> {
        if let Some(region) = self.document.get_element_by_id(ANNOUNCER_ID) {
            return Ok(Some(region));
        }
        let Some(body) = self.document.body() else {
            return Ok(None);
        };
        let region = self.document.create_element("div")?;
        region.set_id(ANNOUNCER_ID);
        region.set_attribute("aria-live", "polite")?;
        region.set_attribute("aria-atomic", "true")?;
        set_styles(
            &region,
            &[
                ("position", "absolute"),
                ("left", "-10000px"),
                ("width", "1px"),
                ("height", "1px"),
                ("overflow", "hidden"),
            ],
        )?;
        body.append_child(&region)?;
        Ok(Some(region))
    }

    fn selection_copy(&self, text: &str) -> Result<bool, JsValue> {
        let Some(body) = self.document.body() else {
            return Ok(false);
        };
        let area: HtmlTextAreaElement = self.document.create_element("textarea")?.dyn_into()?;
        area.set_value(text);
        set_styles(&area, &[("position", "fixed"), ("opacity", "0")])?;
        body.append_child(&area)?;
        area.select();
        let copied = self
            .document
            .dyn_ref::<HtmlDocument>()
            .map(|document| document.exec_command("copy").unwrap_or(false))
            .unwrap_or(false);
        area.remove();
        Ok(copied)
    }
}

impl SectionView for BrowserDom {
    fn has_section(&self, id: &SectionId) -> bool {
        self.document.get_element_by_id(id.as_str()).is_some()
    }

    fn set_section_style(&mut self, id: &SectionId, style: SectionStyle) {
        report(self.section_style(id, style));
    }

    fn deactivate_all_sections(&mut self) {
        report(elements(&self.document, ".section").and_then(|sections| {
            for section in sections {
                section.class_list().remove_1("active")?;
                set_styles(&section, &[("opacity", ""), ("transform", "")])?;
            }
            Ok(())
        }));
    }

    fn activate_section(&mut self, id: &SectionId) {
        if let Some(section) = self.document.get_element_by_id(id.as_str()) {
            report(section.class_list().add_1("active"));
        }
    }

    fn highlight_nav_link(&mut self, id: &SectionId) {
        report(self.highlight(id));
    }

    fn scroll_to_top(&mut self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn emit_section_changed(&mut self, change: &SectionChange) {
        report(dispatch_custom(&self.window, &self.document, "sectionChanged", change));
    }

    fn set_header_scrolled(&mut self, scrolled: bool) {
        if let Ok(Some(header)) = self.document.query_selector("header") {
            report(header.class_list().toggle_with_force("scrolled", scrolled).map(|_| ()));
        }
    }
}

impl MenuView for BrowserDom {
    fn set_menu_open(&mut self, open: bool) {
        report(self.menu_visuals(open));
    }

    fn attach_outside_click(&mut self) {
        report(
            self.document
                .add_event_listener_with_callback("click", self.outside_click.as_ref().unchecked_ref()),
        );
    }

    fn detach_outside_click(&mut self) {
        report(
            self.document
                .remove_event_listener_with_callback("click", self.outside_click.as_ref().unchecked_ref()),
        );
    }
}

impl AnimationView for BrowserDom {
    fn prepare(&mut self, target: TargetId, variant: AnimationVariant) {
        report(self.target(target).and_then(|element| {
            set_styles(
                &element,
                &[("opacity", "0"), ("transform", variant.initial_transform())],
            )
        }));
    }

    fn play(&mut self, target: TargetId, variant: AnimationVariant, duration: Duration) {
        let millis = duration.as_millis();
        report(self.target(target).and_then(|element| {
            if variant == AnimationVariant::Bounce {
                let animation = format!("bounce {}ms ease", millis);
                set_styles(&element, &[("animation", &animation)])?;
            } else {
                let transition = format!("all {}ms ease-out", millis);
                set_styles(&element, &[("transition", &transition)])?;
            }
            set_styles(
                &element,
                &[("opacity", "1"), ("transform", variant.final_transform())],
            )
        }));
    }

    fn clear_transition(&mut self, target: TargetId) {
        report(
            self.target(target)
                .and_then(|element| set_styles(&element, &[("transition", "")])),
        );
    }

    fn prepare_stat(&mut self, target: TargetId) {
        report(self.target(target).and_then(|element| {
            element.set_text_content(Some("0"));
            set_styles(&element, &[("opacity", "0")])
        }));
    }

    fn show_stat(&mut self, target: TargetId) {
        report(
            self.target(target)
                .and_then(|element| set_styles(&element, &[("opacity", "1")])),
        );
    }

    fn set_stat_text(&mut self, target: TargetId, text: &str) {
        report(self.target(target).map(|element| element.set_text_content(Some(text))));
    }

    fn set_stat_pulse(&mut self, target: TargetId, on: bool) {
        let transform = if on { "scale(1.1)" } else { "" };
        report(self.target(target).and_then(|element| {
            set_styles(&element, &[("transform", transform)])
        }));
    }

    fn load_image(&mut self, target: TargetId) {
        report(self.target(target).and_then(|element| {
            if let Some(source) = element.get_attribute("data-src") {
                if let Some(image) = element.dyn_ref::<HtmlImageElement>() {
                    image.set_src(&source);
                }
            }
            element.class_list().remove_1("lazy")
        }));
    }
}

impl FormView for BrowserDom {
    fn show_field_error(&mut self, field: ContactField, message: &str) {
        report(self.show_field_error_in_dom(field, message));
    }

    fn clear_field_error(&mut self, field: ContactField) {
        report(self.clear_field_error_in_dom(field));
    }

    fn clear_all_errors(&mut self) {
        report(self.clear_all_errors_in_dom());
    }

    fn set_submitting(&mut self, submitting: bool) {
        report(self.submitting(submitting));
    }

    fn show_form_error(&mut self, message: &str) {
        report(self.form_banner(message));
    }

    fn remove_form_error(&mut self) {
        report(self.form().and_then(|form| {
            if let Some(banner) = form.query_selector(".form-error")? {
                banner.remove();
            }
            Ok(())
        }));
    }

    fn show_success(&mut self) {
        report(self.success(true));
    }

    fn hide_success(&mut self) {
        report(self.success(false));
    }

    fn reset_form(&mut self) {
        if let Ok(form) = self.form() {
            if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
                form.reset();
            }
        }
    }
}

impl NoticeView for BrowserDom {
    fn notify(&mut self, notice: &Notice) {
        report(self.toast(notice));
    }

    fn set_device_classes(&mut self, classes: &[&str]) {
        if let Some(body) = self.document.body() {
            for class in classes {
                report(body.class_list().add_1(class));
            }
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        if let Some(root) = self.document.document_element() {
            report(root.set_attribute("data-theme", theme.as_str()));
        }
    }

    fn emit_app_initialized(&mut self, version: &str, timestamp: DateTime<Utc>) {
        let detail = AppInitializedDetail {
            version,
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        report(dispatch_custom(
            &self.window,
            &self.document,
            "appInitialized",
            &detail,
        ));
    }
}

impl PageView for BrowserDom {
    fn install_skip_link(&mut self, text: &str, href: &str) {
        report(self.skip_link(text, href));
    }

    fn make_focusable(&mut self, target: TargetId) {
        report(self.target(target).and_then(|element| {
            if element.has_attribute("tabindex") {
                return Ok(());
            }
            element.set_attribute("tabindex", "0")
        }));
    }

    fn activate(&mut self, target: TargetId) {
        if let Ok(element) = self.target(target) {
            if let Some(element) = element.dyn_ref::<HtmlElement>() {
                element.click();
            }
        }
    }

    fn announce(&mut self, message: &str) {
        match self.live_region() {
            Ok(Some(region)) => region.set_text_content(Some(message)),
            Ok(None) => {}
            Err(err) => warn!("DOM operation failed: {:?}", err),
        }
    }

    fn copy_via_selection(&mut self, text: &str) -> bool {
        self.selection_copy(text).unwrap_or_else(|err| {
            warn!("Selection copy failed: {:?}", err);
            false
        })
    }

    fn reload_page(&mut self) {
        report(self.window.location().reload());
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use std::rc::Weak;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn dom(html: &str) -> BrowserDom {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        document.body().unwrap().set_inner_html(html);
        BrowserDom::new(
            window,
            document,
            SiteHandle::new(Weak::new()),
            Rc::new(TargetRegistry::default()),
        )
    }

    fn style_of(dom: &BrowserDom, id: &str, property: &str) -> String {
        let element = dom.document.get_element_by_id(id).unwrap();
        element
            .dyn_into::<HtmlElement>()
            .unwrap()
            .style()
            .get_property_value(property)
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_section_styles_and_activation() {
        let mut dom = dom(
            r#"<section id="home" class="section active"></section>
               <section id="about" class="section"></section>"#,
        );
        let about = SectionId::from("about");
        assert!(dom.has_section(&about));
        assert!(!dom.has_section(&SectionId::from("pricing")));

        dom.set_section_style(&about, SectionStyle::Entering);
        assert_eq!(style_of(&dom, "about", "opacity"), "0");
        dom.deactivate_all_sections();
        dom.activate_section(&about);
        let home = dom.document.get_element_by_id("home").unwrap();
        assert!(!home.class_list().contains("active"));
        assert!(dom
            .document
            .get_element_by_id("about")
            .unwrap()
            .class_list()
            .contains("active"));

        dom.set_section_style(&about, SectionStyle::Resting);
        assert_eq!(style_of(&dom, "about", "opacity"), "");
    }

    #[wasm_bindgen_test]
    fn test_field_error_replaced_and_cleared() {
        let mut dom = dom(
            r#"<form id="contactForm">
                 <div class="form-group"><input name="email"></div>
               </form>"#,
        );
        dom.show_field_error(ContactField::Email, "first");
        dom.show_field_error(ContactField::Email, "second");
        let errors = dom.document.query_selector_all(".field-error").unwrap();
        assert_eq!(errors.length(), 1);
        assert_eq!(errors.item(0).unwrap().text_content().unwrap(), "second");

        dom.clear_field_error(ContactField::Email);
        assert!(dom.document.query_selector(".field-error").unwrap().is_none());
    }

    #[wasm_bindgen_test]
    fn test_single_form_banner() {
        let mut dom = dom(r#"<form id="contactForm"><input name="fullName"></form>"#);
        dom.show_form_error("one");
        dom.show_form_error("two");
        let banners = dom.document.query_selector_all(".form-error").unwrap();
        assert_eq!(banners.length(), 1);
        dom.remove_form_error();
        assert!(dom.document.query_selector(".form-error").unwrap().is_none());
    }

    #[wasm_bindgen_test]
    async fn test_custom_events_wait_for_microtask() {
        let dom = dom("");
        let seen = Rc::new(std::cell::Cell::new(false));
        let seen_by_listener = seen.clone();
        listen(&dom.document, "sectionChanged", move |_event| {
            seen_by_listener.set(true);
        })
        .unwrap();

        let change = SectionChange {
            section: SectionId::from("about"),
            previous: SectionId::from("home"),
        };
        dispatch_custom(&dom.window, &dom.document, "sectionChanged", &change).unwrap();
        assert!(!seen.get());

        wasm_bindgen_futures::JsFuture::from(js_sys::Promise::resolve(&JsValue::UNDEFINED))
            .await
            .unwrap();
        assert!(seen.get());
    }

    #[wasm_bindgen_test]
    fn test_selection_copy_leaves_no_textarea() {
        let mut dom = dom("");
        // execCommand may be refused without a user gesture; only cleanup is certain
        let _ = dom.copy_via_selection("info@boxstone.es");
        assert!(dom.document.query_selector("textarea").unwrap().is_none());
    }

    #[wasm_bindgen_test]
    fn test_skip_link_and_live_region() {
        let mut dom = dom("<main id=\"main\"></main>");
        dom.install_skip_link("Skip to main content", "#main");
        dom.install_skip_link("Skip to main content", "#main");
        let body = dom.document.body().unwrap();
        let first = body.first_element_child().unwrap();
        assert_eq!(first.class_name(), "skip-link");
        assert_eq!(first.get_attribute("href").as_deref(), Some("#main"));
        assert_eq!(dom.document.query_selector_all(".skip-link").unwrap().length(), 1);

        dom.announce("Message sent");
        dom.announce("");
        let region = dom.document.get_element_by_id(ANNOUNCER_ID).unwrap();
        assert_eq!(region.get_attribute("aria-live").as_deref(), Some("polite"));
        assert_eq!(region.text_content().unwrap_or_default(), "");
    }

    #[wasm_bindgen_test]
    fn test_focusable_keeps_existing_tabindex() {
        let mut dom = dom(r#"<div class="card"></div><div class="tech-tag" tabindex="-1"></div>"#);
        let card = dom.document.query_selector(".card").unwrap().unwrap();
        let tag = dom.document.query_selector(".tech-tag").unwrap().unwrap();
        let card_id = dom.registry.register(&card).unwrap();
        let tag_id = dom.registry.register(&tag).unwrap();
        dom.make_focusable(card_id);
        dom.make_focusable(tag_id);
        assert_eq!(card.get_attribute("tabindex").as_deref(), Some("0"));
        assert_eq!(tag.get_attribute("tabindex").as_deref(), Some("-1"));
    }

    #[wasm_bindgen_test]
    fn test_tooltip_sits_above_anchor() {
        let dom = dom(r#"<button data-tooltip="Call us">Phone</button>"#);
        let anchor = dom.document.query_selector("button").unwrap().unwrap();
        let tooltip = show_tooltip(&dom.window, &dom.document, &anchor).unwrap().unwrap();
        assert_eq!(tooltip.text_content().as_deref(), Some("Call us"));
        let top: f64 = tooltip
            .dyn_ref::<HtmlElement>()
            .unwrap()
            .style()
            .get_property_value("top")
            .unwrap()
            .trim_end_matches("px")
            .parse()
            .unwrap();
        assert!(top < anchor.get_bounding_client_rect().top());
        hide_tooltip(&dom.window, tooltip).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_theme_attribute() {
        let mut dom = dom("");
        dom.apply_theme(Theme::Dark);
        let root = dom.document.document_element().unwrap();
        assert_eq!(root.get_attribute("data-theme").as_deref(), Some("dark"));
    }
}
