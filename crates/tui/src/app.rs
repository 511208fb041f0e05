use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use axis_core::config::AxisConfig;
use axis_core::layout::{PageLayout, SimulatedIntersections, SimulatedWatch};
use axis_core::views::navigator_menu::{self, MenuState};
use axis_core::views::{dot_navigator, hit_test, progress_bar, section_indicator};
use axis_core::{InView, Navigator, ObservationGuard, PageGeometry, ScrollBehavior, ViewportObserver};
use axis_protocol::{Point, Rect, RenderCommand, SectionId, Viewport};
use tracing::{debug, info};

use crate::smooth::ScrollAnimation;

/// Virtual pixels per terminal cell.
pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

const LINE_STEP: f64 = CELL_H * 2.0;
const PAGE_FRACTION: f64 = 0.9;
const MENU_WIDTH: f64 = 360.0;
const MENU_INSET: f64 = 24.0;
const MENU_TOP: f64 = 72.0;

/// One page block watched for its one-shot reveal.
pub struct Region {
    pub id: SectionId,
    pub view: Rc<RefCell<InView>>,
    _guard: ObservationGuard<SimulatedWatch>,
}

/// Where a navigation wants the page to go, without moving it yet.
struct ScrollPlan<'a> {
    layout: &'a PageLayout,
    target: Option<(f64, ScrollBehavior)>,
}

impl Navigator for ScrollPlan<'_> {
    fn scroll_into_view(&mut self, id: &str, behavior: ScrollBehavior) {
        if let Some(top) = self.layout.anchor_top(id) {
            let y = (self.layout.scroll_y() + top).clamp(0.0, self.layout.max_scroll());
            self.target = Some((y, behavior));
        }
    }
}

/// The previewed page and everything derived from it. Terminal-free, so it
/// can be driven directly in tests.
pub struct App {
    pub layout: PageLayout,
    pub observer: ViewportObserver,
    pub menu: MenuState,
    pub regions: Vec<Region>,
    intersections: SimulatedIntersections,
    animation: Option<ScrollAnimation>,
    viewport: Viewport,
}

impl App {
    pub fn new(config: &AxisConfig) -> Result<Self> {
        let layout = config.layout();
        let observer = config.observer().context("building section tracker")?;
        let options = config
            .in_view_options()
            .context("reading visibility options")?;

        let mut intersections = SimulatedIntersections::new();
        let regions = layout
            .blocks()
            .map(|(block, _)| {
                let (view, guard) = intersections.observe(block.id.clone(), options);
                Region {
                    id: block.id.clone(),
                    view,
                    _guard: guard,
                }
            })
            .collect();
        let viewport = Viewport::new(1280.0, layout.viewport_height());

        info!(
            sections = observer.dots_count(),
            height = layout.scroll_height(),
            "page loaded"
        );
        Ok(Self {
            layout,
            observer,
            menu: MenuState::default(),
            regions,
            intersections,
            animation: None,
            viewport,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resize to a content area of `cols` by `rows` cells.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport = Viewport::new(f64::from(cols) * CELL_W, f64::from(rows) * CELL_H);
        self.layout.set_viewport_height(self.viewport.height);
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance any animation, then bring tracker and reveal state up to date
    /// with the page, as a scroll event would.
    pub fn tick(&mut self, now: Instant) {
        if let Some(animation) = self.animation {
            self.layout.scroll_to(animation.position_at(now));
            if animation.is_finished(now) {
                self.animation = None;
            }
        }
        self.observer.recompute(&self.layout);
        self.intersections.dispatch(&self.layout);
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.animation = None;
        self.layout.scroll_by(dy);
    }

    pub fn line_down(&mut self) {
        self.scroll_by(LINE_STEP);
    }

    pub fn line_up(&mut self) {
        self.scroll_by(-LINE_STEP);
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.layout.viewport_height() * PAGE_FRACTION);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.layout.viewport_height() * PAGE_FRACTION);
    }

    pub fn scroll_to_top(&mut self, now: Instant) {
        self.animate_to(0.0, now);
    }

    pub fn scroll_to_bottom(&mut self, now: Instant) {
        self.animate_to(self.layout.max_scroll(), now);
    }

    /// Navigate to the section at `index` in registry order.
    pub fn navigate_to_index(&mut self, index: usize, now: Instant) {
        let Some(section) = self.observer.registry().sections().get(index) else {
            return;
        };
        let id = section.id.clone();
        self.navigate_to(&id, now);
    }

    pub fn navigate_to(&mut self, id: &str, now: Instant) {
        let mut plan = ScrollPlan {
            layout: &self.layout,
            target: None,
        };
        self.observer.navigate_to(id, &mut plan);
        let target = plan.target;
        match target {
            Some((y, ScrollBehavior::Smooth)) => self.animate_to(y, now),
            Some((y, ScrollBehavior::Instant)) => {
                self.animation = None;
                self.layout.scroll_to(y);
            }
            None => debug!(id, "navigation did not move the page"),
        }
    }

    fn animate_to(&mut self, y: f64, now: Instant) {
        let from = self.layout.scroll_y();
        self.animation = Some(ScrollAnimation::new(from, y, now));
    }

    pub fn toggle_menu(&mut self) {
        self.menu.toggle();
        debug!(collapsed = self.menu.collapsed, "navigator menu toggled");
    }

    pub fn has_been_revealed(&self, id: &str) -> bool {
        self.regions
            .iter()
            .find(|r| r.id == id)
            .is_some_and(|r| r.view.borrow().has_been_in_view())
    }

    /// Fixed overlays: dot navigator, progress bar and section indicator.
    pub fn overlay(&self) -> Vec<RenderCommand> {
        let registry = self.observer.registry();
        let state = self.observer.state();
        let mut commands = dot_navigator::render_dot_navigator(registry, state, &self.viewport);
        commands.extend(progress_bar::render_progress_bar(state, &self.viewport));
        commands.extend(section_indicator::render_section_indicator(
            &self.observer.readout(),
            &self.viewport,
        ));
        commands
    }

    pub fn menu_commands(&self) -> Vec<RenderCommand> {
        let registry = self.observer.registry();
        let area = Rect::new(
            self.viewport.x + self.viewport.width - MENU_WIDTH - MENU_INSET,
            self.viewport.y + MENU_TOP,
            MENU_WIDTH,
            navigator_menu::menu_height(registry, &self.menu),
        );
        navigator_menu::render_navigator_menu(registry, &self.observer.readout(), &self.menu, area)
    }

    /// Section under a content cell, checking the menu first since it is
    /// drawn on top.
    pub fn section_at_cell(&self, col: u16, row: u16) -> Option<SectionId> {
        let menu = self.menu_commands();
        let overlay = self.overlay();
        cell_samples(col, row).find_map(|p| hit_test(&menu, p).or_else(|| hit_test(&overlay, p)))
    }

    pub fn click(&mut self, col: u16, row: u16, now: Instant) {
        if let Some(id) = self.section_at_cell(col, row) {
            debug!(%id, "clicked section");
            self.navigate_to(&id, now);
        }
    }

    pub fn hover(&mut self, col: u16, row: u16) {
        let menu = self.menu_commands();
        self.menu.hovered = cell_samples(col, row).find_map(|p| hit_test(&menu, p));
    }
}

/// A few points spread over a cell. Shapes smaller than a cell (the
/// navigator dots) are hit from any part of the cell they sit in.
fn cell_samples(col: u16, row: u16) -> impl Iterator<Item = Point> {
    let x0 = f64::from(col) * CELL_W;
    let y0 = f64::from(row) * CELL_H;
    (0..4).flat_map(move |j| {
        (0..3).map(move |i| {
            Point::new(
                x0 + (f64::from(i) + 0.5) * CELL_W / 3.0,
                y0 + (f64::from(j) + 0.5) * CELL_H / 4.0,
            )
        })
    })
}
