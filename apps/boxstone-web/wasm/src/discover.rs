//! Page scan at startup
//!
//! Every element the site animates or observes gets a numeric handle stored in
//! its `data-bs-target` attribute, so observer callbacks can map elements back
//! to [`TargetId`]s.

use std::cell::RefCell;
use std::collections::HashSet;

use boxstone_core::animation::{
    AnimatedElement, AnimationVariant, ElementRole, PageInventory, StatElement,
};
use boxstone_core::page::FOCUSABLE_SELECTOR;
use boxstone_core::platform::TargetId;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

pub const TARGET_ATTR: &str = "data-bs-target";

#[derive(Debug, Default)]
pub struct TargetRegistry {
    elements: RefCell<Vec<Element>>,
}

impl TargetRegistry {
    /// Handle of `element`, assigning a new one on first sight
    pub fn register(&self, element: &Element) -> Result<TargetId, JsValue> {
        if let Some(target) = Self::target_of(element) {
            if self.get(target).is_some() {
                return Ok(target);
            }
        }
        let mut elements = self.elements.borrow_mut();
        let target = TargetId(elements.len() as u32);
        element.set_attribute(TARGET_ATTR, &target.0.to_string())?;
        elements.push(element.clone());
        Ok(target)
    }

    pub fn get(&self, target: TargetId) -> Option<Element> {
        self.elements.borrow().get(target.0 as usize).cloned()
    }

    pub fn target_of(element: &Element) -> Option<TargetId> {
        element
            .get_attribute(TARGET_ATTR)?
            .parse()
            .ok()
            .map(TargetId)
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Elements matching `selector`, in document order
pub fn elements(root: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn explicit_variant(element: &Element) -> Option<AnimationVariant> {
    element
        .get_attribute("data-animate")
        .and_then(|value| AnimationVariant::from_attr(&value))
}

fn push_animated(
    registry: &TargetRegistry,
    seen: &mut HashSet<TargetId>,
    inventory: &mut PageInventory,
    element: &Element,
    role: ElementRole,
) -> Result<(), JsValue> {
    let target = registry.register(element)?;
    if seen.insert(target) {
        let role = explicit_variant(element)
            .map(ElementRole::Explicit)
            .unwrap_or(role);
        inventory.animated.push(AnimatedElement { target, role });
    }
    Ok(())
}

/// Collect every animated, counted, lazy and load-ordered element
pub fn discover(
    document: &Document,
    registry: &TargetRegistry,
) -> Result<PageInventory, JsValue> {
    let mut inventory = PageInventory::default();
    let mut seen = HashSet::new();

    for (index, card) in elements(document, ".card")?.iter().enumerate() {
        let role = ElementRole::Card { index };
        push_animated(registry, &mut seen, &mut inventory, card, role)?;
    }
    for (index, category) in elements(document, ".service-category")?
        .iter()
        .enumerate()
    {
        let role = ElementRole::ServiceCategory { index };
        push_animated(registry, &mut seen, &mut inventory, category, role)?;
    }
    for content in elements(document, ".section-content")? {
        let role = ElementRole::SectionContent;
        push_animated(registry, &mut seen, &mut inventory, &content, role)?;
    }
    // Remaining elements that only carry an explicit variant
    for element in elements(document, "[data-animate]")? {
        if let Some(variant) = explicit_variant(&element) {
            let role = ElementRole::Explicit(variant);
            push_animated(registry, &mut seen, &mut inventory, &element, role)?;
        }
    }

    for stat in elements(document, ".stat-number")? {
        let target = registry.register(&stat)?;
        inventory.stats.push(StatElement {
            target,
            final_text: stat.text_content().unwrap_or_default().trim().to_string(),
        });
    }

    for image in elements(document, "img[data-src]")? {
        inventory.lazy_images.push(registry.register(&image)?);
    }

    for element in elements(document, "[data-load-order]")? {
        let order = element
            .get_attribute("data-load-order")
            .and_then(|value| value.trim().parse::<u32>().ok());
        if let Some(order) = order {
            inventory.load_sequence.push((registry.register(&element)?, order));
        }
    }

    for element in elements(document, FOCUSABLE_SELECTOR)? {
        inventory.focusable.push(registry.register(&element)?);
    }

    debug!(
        "Discovered {} animated, {} stats, {} lazy images, {} load-ordered, {} focusable",
        inventory.animated.len(),
        inventory.stats.len(),
        inventory.lazy_images.len(),
        inventory.load_sequence.len(),
        inventory.focusable.len()
    );
    Ok(inventory)
}
