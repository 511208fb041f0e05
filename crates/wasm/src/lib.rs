//! Browser bridge for the Project Axis scroll tracker.
//!
//! `ScrollTracker` wires a [`ViewportObserver`] to the window's scroll and
//! resize events and reads geometry straight from the DOM. `InViewObserver`
//! does the same for one element and a browser intersection observer.
//! Everything crossing into JS is JSON.

mod dom;
mod in_view;
mod theme;

use std::cell::RefCell;
use std::rc::Rc;

use axis_core::config::parse_config;
use axis_core::views::navigator_menu::{self, MenuState};
use axis_core::views::{dot_navigator, hit_test, progress_bar, section_indicator};
use axis_core::{PageGeometry, SectionRegistry, SubscriptionId, ViewportObserver};
use axis_protocol::{Point, Rect, RenderCommand, SectionId, TrackerState, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::EventTarget;

pub use dom::DomGeometry;
pub use in_view::InViewObserver;
pub use theme::{css_color, theme_color};

const MENU_WIDTH: f64 = 360.0;
const MENU_INSET: f64 = 24.0;

type Subscriber = Rc<dyn Fn(&TrackerState)>;

/// States published during a recompute, delivered once the observer borrow
/// is released so callbacks may call back into the tracker.
type Outbox = Rc<RefCell<Vec<(Subscriber, TrackerState)>>>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn js_error(err: &JsValue) -> JsError {
    JsError::new(&format!("{err:?}"))
}

fn recompute_and_notify<G: PageGeometry + ?Sized>(
    observer: &RefCell<ViewportObserver>,
    outbox: &Outbox,
    geometry: &G,
) {
    observer.borrow_mut().recompute(geometry);
    let pending: Vec<_> = outbox.borrow_mut().drain(..).collect();
    for (subscriber, state) in pending {
        subscriber(&state);
    }
}

/// Calls a JS function with the state as a plain object.
fn js_subscriber(callback: js_sys::Function) -> Subscriber {
    Rc::new(move |state: &TrackerState| {
        let payload = match serde_json::to_string(state) {
            Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
            web_sys::console::error_2(&"axis: tracker subscriber failed".into(), &err);
        }
    })
}

/// A window event listener that is removed when dropped.
struct EventListenerGuard {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut()>,
}

impl EventListenerGuard {
    fn add(target: EventTarget, event: &'static str, callback: Closure<dyn FnMut()>) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            event,
            callback,
        })
    }
}

impl Drop for EventListenerGuard {
    fn drop(&mut self) {
        let removed = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        if let Err(err) = removed {
            web_sys::console::warn_2(&format!("axis: removing {} listener", self.event).into(), &err);
        }
    }
}

/// Every export borrows the tracker shared, so a subscriber may call any of
/// them while being notified.
#[wasm_bindgen]
pub struct ScrollTracker {
    observer: Rc<RefCell<ViewportObserver>>,
    outbox: Outbox,
    menu: RefCell<MenuState>,
    listeners: RefCell<Vec<EventListenerGuard>>,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::from_observer(ViewportObserver::new(SectionRegistry::project_axis()))
    }
}

impl ScrollTracker {
    fn from_observer(observer: ViewportObserver) -> Self {
        Self {
            observer: Rc::new(RefCell::new(observer)),
            outbox: Rc::default(),
            menu: RefCell::default(),
            listeners: RefCell::default(),
        }
    }

    fn recompute_from<G: PageGeometry + ?Sized>(&self, geometry: &G) {
        recompute_and_notify(&self.observer, &self.outbox, geometry);
    }

    fn subscribe_with(&self, subscriber: Subscriber) -> SubscriptionId {
        let outbox = Rc::clone(&self.outbox);
        self.observer
            .borrow_mut()
            .subscribe(move |state| outbox.borrow_mut().push((Rc::clone(&subscriber), state.clone())))
    }

    fn surfaces(&self, viewport: &Viewport) -> Vec<RenderCommand> {
        let observer = self.observer.borrow();
        let registry = observer.registry();
        let state = observer.state();

        let mut commands = dot_navigator::render_dot_navigator(registry, state, viewport);
        commands.extend(progress_bar::render_progress_bar(state, viewport));
        commands.extend(section_indicator::render_section_indicator(
            &observer.readout(),
            viewport,
        ));
        let menu = self.menu.borrow();
        let menu_height = navigator_menu::menu_height(registry, &menu);
        let area = Rect::new(
            viewport.x + viewport.width - MENU_WIDTH - MENU_INSET,
            viewport.y + viewport.height - menu_height - MENU_INSET,
            MENU_WIDTH,
            menu_height,
        );
        commands.extend(navigator_menu::render_navigator_menu(
            registry,
            &observer.readout(),
            &menu,
            area,
        ));
        commands
    }
}

#[wasm_bindgen]
impl ScrollTracker {
    /// Tracker over the built-in Project Axis sections.
    #[wasm_bindgen(constructor)]
    pub fn new() -> ScrollTracker {
        Self::default()
    }

    /// Tracker over the sections and fallback of a TOML configuration.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(toml: &str) -> Result<ScrollTracker, JsError> {
        let config = parse_config(toml).map_err(|e| JsError::new(&e.to_string()))?;
        let observer = config.observer().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self::from_observer(observer))
    }

    /// Start listening to window scroll and resize, then recompute once so
    /// subscribers see the initial state.
    pub fn attach(&self) -> Result<(), JsError> {
        if self.is_attached() {
            return Ok(());
        }
        let geometry = DomGeometry::current().ok_or_else(|| JsError::new("no window"))?;
        let mut guards = Vec::with_capacity(2);
        for event in ["scroll", "resize"] {
            let observer = Rc::clone(&self.observer);
            let outbox = Rc::clone(&self.outbox);
            let page = geometry.clone();
            let callback = Closure::<dyn FnMut()>::new(move || {
                recompute_and_notify(&observer, &outbox, &page);
            });
            let target: EventTarget = geometry.window().clone().into();
            guards.push(EventListenerGuard::add(target, event, callback).map_err(|e| js_error(&e))?);
        }
        *self.listeners.borrow_mut() = guards;
        self.recompute_from(&geometry);
        Ok(())
    }

    /// Remove the window listeners. Also happens when the tracker is freed.
    pub fn detach(&self) {
        // Guards drop outside the borrow.
        let removed = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(removed);
    }

    #[wasm_bindgen(js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        !self.listeners.borrow().is_empty()
    }

    /// Recompute from the live DOM without waiting for an event.
    pub fn recompute(&self) {
        if let Some(geometry) = DomGeometry::current() {
            self.recompute_from(&geometry);
        }
    }

    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.observer.borrow().state()).map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = readoutJson)]
    pub fn readout_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.observer.borrow().readout()).map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = sectionsJson)]
    pub fn sections_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.observer.borrow().registry().sections())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = currentSectionName)]
    pub fn current_section_name(&self) -> String {
        self.observer.borrow().current_section_name().to_string()
    }

    /// Call `callback(state)` whenever the tracker state changes. Returns an
    /// id for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(&self, callback: js_sys::Function) -> Result<u32, JsError> {
        let id = self.subscribe_with(js_subscriber(callback));
        u32::try_from(id.as_u64()).map_err(|_| JsError::new("subscription ids exhausted"))
    }

    pub fn unsubscribe(&self, id: u32) -> bool {
        self.observer
            .borrow_mut()
            .unsubscribe(SubscriptionId::from_u64(u64::from(id)))
    }

    /// Smooth-scroll a registered section into view. Unknown ids are ignored.
    #[wasm_bindgen(js_name = scrollTo)]
    pub fn scroll_to(&self, id: &str) {
        if let Some(mut page) = DomGeometry::current() {
            self.observer.borrow().navigate_to(id, &mut page);
        }
    }

    #[wasm_bindgen(js_name = toggleMenu)]
    pub fn toggle_menu(&self) {
        self.menu.borrow_mut().toggle();
    }

    #[wasm_bindgen(js_name = setMenuHover)]
    pub fn set_menu_hover(&self, id: Option<String>) {
        self.menu.borrow_mut().hovered = id.map(SectionId::from);
    }

    /// Render the dot navigator, progress bar, section indicator and
    /// navigator menu for a viewport, as JSON render commands.
    #[wasm_bindgen(js_name = renderSurfaces)]
    pub fn render_surfaces(&self, width: f64, height: f64) -> Result<String, JsError> {
        let commands = self.surfaces(&Viewport::new(width, height));
        serde_json::to_string(&commands).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Section under a point of the rendered surfaces, if any.
    #[wasm_bindgen(js_name = hitTest)]
    pub fn hit_test(&self, width: f64, height: f64, x: f64, y: f64) -> Option<String> {
        let commands = self.surfaces(&Viewport::new(width, height));
        hit_test(&commands, Point::new(x, y)).map(|id| id.as_str().to_string())
    }
}
