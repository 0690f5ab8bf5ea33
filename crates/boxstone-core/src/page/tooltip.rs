//! `[data-tooltip]` placement

use std::time::Duration;

/// Space between the tooltip and its anchor
pub const TOOLTIP_GAP: f64 = 5.0;

/// Fade in and out time; the element is removed once faded out
pub const TOOLTIP_FADE: Duration = Duration::from_millis(300);

/// Viewport rectangle of the hovered element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

/// Top-left corner of a `width` x `height` tooltip centered above `anchor`
pub fn tooltip_position(anchor: AnchorRect, width: f64, height: f64) -> (f64, f64) {
    let left = anchor.left + anchor.width / 2.0 - width / 2.0;
    let top = anchor.top - height - TOOLTIP_GAP;
    (left, top)
}
