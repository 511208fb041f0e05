use axis_protocol::Section;

use crate::registry::SectionRegistry;

/// Live page geometry the observer reads on every recompute.
///
/// All values are CSS pixels. Implementations must be read-only: querying
/// geometry never changes layout.
pub trait PageGeometry {
    /// Current vertical scroll offset of the document.
    fn scroll_y(&self) -> f64;
    /// Total scrollable height of the document.
    fn scroll_height(&self) -> f64;
    /// Height of the visible viewport.
    fn viewport_height(&self) -> f64;
    /// Top edge of the anchor element with this id, relative to the top of the
    /// viewport. `None` when no such anchor is in the document.
    fn anchor_top(&self, id: &str) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Something that can bring a section anchor into view.
///
/// Navigation is fire-and-forget: the scroll events it produces reach the
/// observer like any user scroll.
pub trait Navigator {
    fn scroll_into_view(&mut self, id: &str, behavior: ScrollBehavior);
}

/// How far through the scrollable height the page is, in `[0, 100]`.
///
/// A document no taller than the viewport has nothing to scroll through and
/// reports 0.
pub fn scroll_progress_percent(scroll_y: f64, scroll_height: f64, viewport_height: f64) -> f64 {
    let scrollable = scroll_height - viewport_height;
    if !scrollable.is_finite() || scrollable <= 0.0 {
        return 0.0;
    }
    let percent = scroll_y / scrollable * 100.0;
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// The section whose anchor most recently crossed the viewport midpoint.
///
/// Scans in registry order and keeps the last section whose anchor top is at
/// or above `viewport_height / 2`. Missing anchors are skipped. When nothing
/// qualifies, `fallback` is returned.
///
/// Cost is one anchor lookup per registered section.
pub fn active_section<'a, G: PageGeometry + ?Sized>(
    registry: &'a SectionRegistry,
    geometry: &G,
    fallback: &'a Section,
) -> &'a Section {
    let activation_line = geometry.viewport_height() / 2.0;
    let mut active = fallback;
    for section in registry.iter() {
        if let Some(top) = geometry.anchor_top(&section.id)
            && top <= activation_line
        {
            active = section;
        }
    }
    active
}
