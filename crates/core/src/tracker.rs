use axis_protocol::{Section, TrackerState};
use serde::Serialize;
use tracing::{debug, trace};

use crate::geometry::{self, Navigator, PageGeometry, ScrollBehavior};
use crate::registry::{RegistryError, SectionRegistry};

/// Label shown when the active section cannot be resolved to a name.
pub const DEFAULT_SECTION_LABEL: &str = "Project Axis";

/// Handle returned by [`ViewportObserver::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }
}

type Listener = Box<dyn FnMut(&TrackerState)>;

/// Owns the section registry and the one [`TrackerState`] derived from it.
///
/// `recompute` is the only writer of the state. It is a pure function of the
/// geometry passed in, so calling it for every scroll event, for a subset of
/// them, or twice in a row all converge on the same state. Subscribers are
/// called synchronously, only when the state actually changed.
pub struct ViewportObserver {
    registry: SectionRegistry,
    fallback: usize,
    state: TrackerState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ViewportObserver {
    /// Observer that falls back to the first registered section.
    pub fn new(registry: SectionRegistry) -> Self {
        let state = TrackerState::new(registry.first().id.clone());
        Self {
            registry,
            fallback: 0,
            state,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Observer that reports `fallback_id` while no anchor has reached the
    /// activation line.
    pub fn with_fallback(registry: SectionRegistry, fallback_id: &str) -> Result<Self, RegistryError> {
        let fallback = registry
            .index_of(fallback_id)
            .ok_or_else(|| RegistryError::UnknownSection(fallback_id.to_string()))?;
        let mut observer = Self::new(registry);
        observer.fallback = fallback;
        observer.state = TrackerState::new(observer.fallback().id.clone());
        Ok(observer)
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn fallback(&self) -> &Section {
        &self.registry.sections()[self.fallback]
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Re-derive the tracker state from current geometry and publish it if it
    /// changed.
    pub fn recompute<G: PageGeometry + ?Sized>(&mut self, geometry: &G) -> &TrackerState {
        let active = geometry::active_section(&self.registry, geometry, self.fallback());
        let next = TrackerState {
            active_section_id: active.id.clone(),
            scroll_progress_percent: geometry::scroll_progress_percent(
                geometry.scroll_y(),
                geometry.scroll_height(),
                geometry.viewport_height(),
            ),
        };
        trace!(
            active = %next.active_section_id,
            progress = next.scroll_progress_percent,
            "recomputed tracker state"
        );

        if next != self.state {
            if next.active_section_id != self.state.active_section_id {
                debug!(
                    from = %self.state.active_section_id,
                    to = %next.active_section_id,
                    "active section changed"
                );
            }
            self.state = next;
            for (_, listener) in &mut self.listeners {
                listener(&self.state);
            }
        }
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TrackerState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn current_section_name(&self) -> &str {
        self.registry
            .get(&self.state.active_section_id)
            .map_or(DEFAULT_SECTION_LABEL, |s| s.name.as_str())
    }

    /// Zero-based position of the active section in registry order.
    pub fn current_index(&self) -> usize {
        self.registry
            .index_of(&self.state.active_section_id)
            .unwrap_or(self.fallback)
    }

    pub fn dots_count(&self) -> usize {
        self.registry.len()
    }

    pub fn readout(&self) -> Readout {
        Readout {
            name: self.current_section_name().to_string(),
            index: self.current_index(),
            count: self.dots_count(),
            progress_percent: self.state.scroll_progress_percent,
        }
    }

    /// Smooth-scroll to a registered section. Unknown ids are ignored.
    pub fn navigate_to<N: Navigator + ?Sized>(&self, id: &str, navigator: &mut N) {
        if !self.registry.contains(id) {
            debug!(id, "ignoring navigation to unregistered section");
            return;
        }
        navigator.scroll_into_view(id, ScrollBehavior::Smooth);
    }
}

impl std::fmt::Debug for ViewportObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportObserver")
            .field("registry", &self.registry)
            .field("fallback", &self.fallback)
            .field("state", &self.state)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

/// Display values derived from the tracker state and the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub name: String,
    pub index: usize,
    pub count: usize,
    pub progress_percent: f64,
}

impl Readout {
    /// Share of sections reached, counting the active one: `(index + 1) / count`.
    pub fn navigation_fraction(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.index + 1) as f64 / self.count as f64
    }

    pub fn position_label(&self) -> String {
        format!("{} / {} sections", self.index + 1, self.count)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Page {
        scroll_y: f64,
        scroll_height: f64,
        viewport_height: f64,
        tops: HashMap<String, f64>,
    }

    impl PageGeometry for Page {
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
            self.tops.get(id).copied()
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        calls: Vec<(String, ScrollBehavior)>,
    }

    impl Navigator for RecordingNavigator {
        fn scroll_into_view(&mut self, id: &str, behavior: ScrollBehavior) {
            self.calls.push((id.to_string(), behavior));
        }
    }

    fn three_sections() -> SectionRegistry {
        SectionRegistry::new(vec![
            Section::new("hero", "Hero"),
            Section::new("about", "About"),
            Section::new("timeline", "Timeline"),
        ])
        .expect("valid registry")
    }

    fn page(scroll_y: f64, tops: &[(&str, f64)]) -> Page {
        Page {
            scroll_y,
            scroll_height: 2000.0,
            viewport_height: 800.0,
            tops: tops.iter().map(|(id, top)| (id.to_string(), *top)).collect(),
        }
    }

    #[test]
    fn starts_on_first_section_at_zero() {
        let obs = ViewportObserver::new(three_sections());
        assert_eq!(obs.state().active_section_id, "hero");
        assert_eq!(obs.state().scroll_progress_percent, 0.0);
        assert_eq!(obs.current_index(), 0);
    }

    #[test]
    fn about_is_active_when_only_it_crosses_midpoint() {
        let mut obs = ViewportObserver::new(three_sections());
        obs.recompute(&page(0.0, &[("about", 300.0), ("timeline", 900.0)]));
        assert_eq!(obs.state().active_section_id, "about");
        assert_eq!(obs.current_index(), 1);
        assert_eq!(obs.current_section_name(), "About");
        assert_eq!(obs.dots_count(), 3);
    }

    #[test]
    fn progress_is_half_at_600_of_1200() {
        let mut obs = ViewportObserver::new(three_sections());
        let state = obs.recompute(&page(600.0, &[]));
        assert!((state.scroll_progress_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn short_document_has_zero_progress() {
        let mut obs = ViewportObserver::new(three_sections());
        let geo = Page {
            scroll_y: 0.0,
            scroll_height: 500.0,
            viewport_height: 800.0,
            tops: HashMap::new(),
        };
        assert_eq!(obs.recompute(&geo).scroll_progress_percent, 0.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut obs = ViewportObserver::new(three_sections());
        let geo = page(450.0, &[("hero", -450.0), ("about", 150.0), ("timeline", 1050.0)]);
        let first = obs.recompute(&geo).clone();
        let second = obs.recompute(&geo).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn custom_fallback_is_used_before_any_anchor_qualifies() {
        let mut obs =
            ViewportObserver::with_fallback(three_sections(), "about").expect("known fallback");
        assert_eq!(obs.state().active_section_id, "about");
        obs.recompute(&page(0.0, &[("about", 700.0)]));
        assert_eq!(obs.state().active_section_id, "about");
        assert_eq!(obs.fallback().id, "about");
    }

    #[test]
    fn unknown_fallback_is_rejected() {
        let err = ViewportObserver::with_fallback(three_sections(), "agi").err();
        assert_eq!(err, Some(RegistryError::UnknownSection("agi".into())));
    }

    #[test]
    fn subscribers_only_hear_changes() {
        let mut obs = ViewportObserver::new(three_sections());
        let seen: Rc<RefCell<Vec<TrackerState>>> = Rc::default();
        let sink = Rc::clone(&seen);
        obs.subscribe(move |s| sink.borrow_mut().push(s.clone()));

        let geo = page(600.0, &[("about", 300.0)]);
        obs.recompute(&geo);
        obs.recompute(&geo);
        obs.recompute(&page(0.0, &[("about", 900.0)]));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].active_section_id, "about");
        assert_eq!(seen[1].active_section_id, "hero");
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut obs = ViewportObserver::new(three_sections());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = obs.subscribe(move |_| *sink.borrow_mut() += 1);

        obs.recompute(&page(100.0, &[]));
        assert!(obs.unsubscribe(id));
        assert!(!obs.unsubscribe(id));
        obs.recompute(&page(200.0, &[]));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn readout_bundles_display_values() {
        let mut obs = ViewportObserver::new(three_sections());
        obs.recompute(&page(600.0, &[("about", -200.0), ("timeline", 100.0)]));
        let r = obs.readout();
        assert_eq!(r.name, "Timeline");
        assert_eq!(r.index, 2);
        assert_eq!(r.count, 3);
        assert!((r.navigation_fraction() - 1.0).abs() < f64::EPSILON);
        assert_eq!(r.position_label(), "3 / 3 sections");
    }

    #[test]
    fn navigate_issues_smooth_scroll_without_touching_state() {
        let obs = ViewportObserver::new(three_sections());
        let mut nav = RecordingNavigator::default();
        obs.navigate_to("timeline", &mut nav);
        obs.navigate_to("nowhere", &mut nav);
        assert_eq!(nav.calls, vec![("timeline".to_string(), ScrollBehavior::Smooth)]);
        assert_eq!(obs.state().active_section_id, "hero");
    }
}
