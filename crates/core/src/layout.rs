//! A simulated page: section blocks stacked top to bottom in a scrollable
//! document, with an intersection dispatcher on top.
//!
//! Stands in for the browser wherever there is no DOM (terminal preview,
//! tests). It answers the same questions the DOM does, so the observer and
//! the visibility latch run unchanged against it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use axis_protocol::SectionId;
use tracing::debug;

use crate::geometry::{Navigator, PageGeometry, ScrollBehavior};
use crate::visibility::{Disconnect, InView, InViewOptions, IntersectionSample, ObservationGuard, RootMargin};

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    pub id: SectionId,
    pub height: f64,
    /// Whether the block carries a DOM anchor with its id. Unanchored blocks
    /// still take up space and can still be intersection-observed.
    pub anchored: bool,
}

impl LayoutBlock {
    pub fn new(id: impl Into<SectionId>, height: f64) -> Self {
        Self {
            id: id.into(),
            height: height.max(0.0),
            anchored: true,
        }
    }

    pub fn unanchored(id: impl Into<SectionId>, height: f64) -> Self {
        Self {
            anchored: false,
            ..Self::new(id, height)
        }
    }
}

#[derive(Debug, Clone)]
struct PlacedBlock {
    block: LayoutBlock,
    /// Offset from the top of the document.
    top: f64,
}

#[derive(Debug, Clone)]
pub struct PageLayout {
    blocks: Vec<PlacedBlock>,
    scroll_height: f64,
    viewport_height: f64,
    scroll_y: f64,
}

impl PageLayout {
    pub fn stacked(viewport_height: f64, blocks: impl IntoIterator<Item = LayoutBlock>) -> Self {
        let mut top = 0.0;
        let blocks: Vec<PlacedBlock> = blocks
            .into_iter()
            .map(|block| {
                let placed = PlacedBlock { top, block };
                top += placed.block.height;
                placed
            })
            .collect();
        Self {
            blocks,
            scroll_height: top,
            viewport_height: viewport_height.max(0.0),
            scroll_y: 0.0,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.viewport_height).max(0.0)
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_to(self.scroll_y + dy);
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        self.scroll_to(self.scroll_y);
    }

    /// Document offset of a block, anchored or not.
    pub fn block_top(&self, id: &str) -> Option<f64> {
        self.find(id).map(|b| b.top)
    }

    /// Blocks in page order with their document offsets.
    pub fn blocks(&self) -> impl Iterator<Item = (&LayoutBlock, f64)> {
        self.blocks.iter().map(|b| (&b.block, b.top))
    }

    /// Intersection of a block with the viewport grown by `margin`, as an
    /// intersection observer would report it.
    pub fn intersection(&self, id: &str, margin: &RootMargin) -> Option<IntersectionSample> {
        let placed = self.find(id)?;
        let (grow_top, grow_bottom) = margin.resolve_vertical(self.viewport_height);
        let root_top = -grow_top;
        let root_bottom = self.viewport_height + grow_bottom;
        let top = placed.top - self.scroll_y;
        let height = placed.block.height;

        if height <= 0.0 {
            let inside = top >= root_top && top <= root_bottom;
            return Some(IntersectionSample::new(inside, if inside { 1.0 } else { 0.0 }));
        }
        let overlap = (top + height).min(root_bottom) - top.max(root_top);
        if overlap <= 0.0 {
            return Some(IntersectionSample::new(false, 0.0));
        }
        Some(IntersectionSample::new(true, (overlap / height).min(1.0)))
    }

    fn find(&self, id: &str) -> Option<&PlacedBlock> {
        self.blocks.iter().find(|b| b.block.id == id)
    }
}

impl PageGeometry for PageLayout {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn anchor_top(&self, id: &str) -> Option<f64> {
        self.find(id)
            .filter(|b| b.block.anchored)
            .map(|b| b.top - self.scroll_y)
    }
}

/// Jumps straight to the anchor. Animation is left to the caller, which can
/// interpolate between `scroll_y` before and after.
impl Navigator for PageLayout {
    fn scroll_into_view(&mut self, id: &str, _behavior: ScrollBehavior) {
        match self.anchor_top(id) {
            Some(top) => self.scroll_by(top),
            None => debug!(id, "no anchor to scroll to"),
        }
    }
}

struct Watch {
    key: u64,
    target: SectionId,
    view: Rc<RefCell<InView>>,
    /// Intersecting flag and threshold side at the last delivered
    /// notification.
    last: Option<(bool, bool)>,
}

/// Delivers intersection notifications for blocks of a [`PageLayout`].
///
/// Like a browser intersection observer, a watch is notified once right after
/// it starts and then only when its element starts or stops intersecting or
/// crosses its threshold.
#[derive(Default)]
pub struct SimulatedIntersections {
    watches: Rc<RefCell<Vec<Watch>>>,
    next_key: u64,
}

impl SimulatedIntersections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(
        &mut self,
        target: impl Into<SectionId>,
        options: InViewOptions,
    ) -> (Rc<RefCell<InView>>, ObservationGuard<SimulatedWatch>) {
        let key = self.next_key;
        self.next_key += 1;
        let view = Rc::new(RefCell::new(InView::new(options)));
        self.watches.borrow_mut().push(Watch {
            key,
            target: target.into(),
            view: Rc::clone(&view),
            last: None,
        });
        let handle = SimulatedWatch {
            key,
            watches: Rc::downgrade(&self.watches),
        };
        (view, ObservationGuard::new(handle))
    }

    /// Notify every live watch whose intersection changed in a way an
    /// observer reports. Returns how many notifications were delivered.
    pub fn dispatch(&self, layout: &PageLayout) -> usize {
        let mut delivered = 0;
        for watch in self.watches.borrow_mut().iter_mut() {
            let mut view = watch.view.borrow_mut();
            let Some(sample) = layout.intersection(&watch.target, &view.options().root_margin) else {
                continue;
            };
            let seen = (sample.is_intersecting, view.options().meets_threshold(sample.ratio));
            if watch.last != Some(seen) {
                view.record(sample);
                watch.last = Some(seen);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.watches.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.borrow().is_empty()
    }
}

/// Handle to one watch in a [`SimulatedIntersections`].
#[derive(Debug)]
pub struct SimulatedWatch {
    key: u64,
    watches: Weak<RefCell<Vec<Watch>>>,
}

impl Disconnect for SimulatedWatch {
    fn disconnect(&mut self) {
        if let Some(watches) = self.watches.upgrade() {
            watches.borrow_mut().retain(|w| w.key != self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageLayout {
        PageLayout::stacked(
            800.0,
            [
                LayoutBlock::unanchored("hero", 800.0),
                LayoutBlock::new("about", 600.0),
                LayoutBlock::new("timeline", 1000.0),
            ],
        )
    }

    #[test]
    fn stacks_blocks_in_order() {
        let layout = page();
        assert_eq!(layout.block_top("hero"), Some(0.0));
        assert_eq!(layout.block_top("about"), Some(800.0));
        assert_eq!(layout.block_top("timeline"), Some(1400.0));
        assert_eq!(layout.scroll_height(), 2400.0);
        assert_eq!(layout.max_scroll(), 1600.0);
    }

    #[test]
    fn anchor_tops_follow_scroll() {
        let mut layout = page();
        layout.scroll_to(500.0);
        assert_eq!(layout.anchor_top("about"), Some(300.0));
        assert_eq!(layout.anchor_top("timeline"), Some(900.0));
        // The hero block has no anchor in the document.
        assert_eq!(layout.anchor_top("hero"), None);
        assert_eq!(layout.anchor_top("contact"), None);
    }

    #[test]
    fn scroll_is_clamped_to_document() {
        let mut layout = page();
        layout.scroll_by(-50.0);
        assert_eq!(layout.scroll_y(), 0.0);
        layout.scroll_to(10_000.0);
        assert_eq!(layout.scroll_y(), 1600.0);
        layout.set_viewport_height(2000.0);
        assert_eq!(layout.scroll_y(), 400.0);
    }

    #[test]
    fn navigator_aligns_anchor_with_viewport_top() {
        let mut layout = page();
        layout.scroll_into_view("about", ScrollBehavior::Smooth);
        assert_eq!(layout.scroll_y(), 800.0);
        assert_eq!(layout.anchor_top("about"), Some(0.0));
        layout.scroll_into_view("timeline", ScrollBehavior::Smooth);
        assert_eq!(layout.scroll_y(), 1400.0);
        // Unanchored and unknown ids do nothing.
        layout.scroll_into_view("hero", ScrollBehavior::Smooth);
        layout.scroll_into_view("nowhere", ScrollBehavior::Instant);
        assert_eq!(layout.scroll_y(), 1400.0);
    }

    #[test]
    fn navigator_stops_at_end_of_document() {
        let mut layout = PageLayout::stacked(
            800.0,
            [LayoutBlock::new("about", 1000.0), LayoutBlock::new("contact", 300.0)],
        );
        layout.scroll_into_view("contact", ScrollBehavior::Smooth);
        assert_eq!(layout.scroll_y(), 500.0);
    }

    #[test]
    fn intersection_ratio_and_margin() {
        let mut layout = page();
        layout.scroll_to(500.0);
        // "about" spans 300..900 in viewport space; 500 of 600 px visible.
        let s = layout.intersection("about", &RootMargin::ZERO).expect("block exists");
        assert!(s.is_intersecting);
        assert!((s.ratio - 500.0 / 600.0).abs() < 1e-9);

        // "timeline" starts at 900, below the viewport...
        let s = layout.intersection("timeline", &RootMargin::ZERO).expect("block exists");
        assert!(!s.is_intersecting);
        // ...but a 200px bottom margin pulls 100px of it in.
        let grown: RootMargin = "0px 0px 200px 0px".parse().expect("valid margin");
        let s = layout.intersection("timeline", &grown).expect("block exists");
        assert!(s.is_intersecting);
        assert!((s.ratio - 0.1).abs() < 1e-9);
    }

    #[test]
    fn dispatch_fires_initially_then_on_crossings() {
        let mut layout = page();
        let mut io = SimulatedIntersections::new();
        let (about, _guard) = io.observe("about", InViewOptions::default());

        assert_eq!(io.dispatch(&layout), 1);
        assert!(!about.borrow().is_in_view());

        layout.scroll_to(200.0);
        assert_eq!(io.dispatch(&layout), 1);
        assert!(about.borrow().is_in_view());
        assert_eq!(io.dispatch(&layout), 0);

        layout.scroll_to(1600.0);
        io.dispatch(&layout);
        assert!(!about.borrow().is_in_view());
        assert!(about.borrow().has_been_in_view());
    }

    #[test]
    fn entering_and_crossing_the_threshold_are_separate_notifications() {
        let mut layout = page();
        let mut io = SimulatedIntersections::new();
        let (about, _guard) = io.observe("about", InViewOptions::default());
        io.dispatch(&layout);

        // 30 of 600 px: intersecting, still under 10%.
        layout.scroll_to(30.0);
        assert_eq!(io.dispatch(&layout), 1);
        assert!(about.borrow().is_in_view());

        layout.scroll_to(40.0);
        assert_eq!(io.dispatch(&layout), 0);

        layout.scroll_to(100.0);
        assert_eq!(io.dispatch(&layout), 1);
        assert!(about.borrow().is_in_view());
    }

    #[test]
    fn block_taller_than_viewport_over_threshold_still_reveals() {
        let mut layout = PageLayout::stacked(
            800.0,
            [LayoutBlock::new("intro", 800.0), LayoutBlock::new("essay", 9000.0)],
        );
        let mut io = SimulatedIntersections::new();
        let (essay, _guard) = io.observe("essay", InViewOptions::default());
        let mut max_ratio: f64 = 0.0;
        let mut y = 0.0;
        while y <= layout.max_scroll() {
            layout.scroll_to(y);
            io.dispatch(&layout);
            if let Some(s) = layout.intersection("essay", &RootMargin::ZERO) {
                max_ratio = max_ratio.max(s.ratio);
            }
            y += 100.0;
        }
        assert!(max_ratio < InViewOptions::default().threshold);
        assert!(essay.borrow().has_been_in_view());
        assert!(essay.borrow().is_in_view());
    }

    #[test]
    fn unanchored_blocks_are_still_observable() {
        let layout = page();
        let mut io = SimulatedIntersections::new();
        let (hero, _guard) = io.observe("hero", InViewOptions::default());
        io.dispatch(&layout);
        assert!(hero.borrow().has_been_in_view());
    }

    #[test]
    fn dropping_the_guard_stops_notifications() {
        let mut layout = page();
        let mut io = SimulatedIntersections::new();
        let (timeline, guard) = io.observe("timeline", InViewOptions::default());
        assert_eq!(io.len(), 1);
        io.dispatch(&layout);

        drop(guard);
        assert!(io.is_empty());

        layout.scroll_to(1600.0);
        assert_eq!(io.dispatch(&layout), 0);
        assert!(!timeline.borrow().has_been_in_view());
    }
}
