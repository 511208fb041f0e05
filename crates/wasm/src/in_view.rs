use std::cell::RefCell;
use std::rc::Rc;

use axis_core::visibility::{Disconnect, InView, InViewOptions, IntersectionSample, ObservationGuard, RootMargin};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

type EntriesCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// A live browser intersection observer plus the callback it calls into.
struct DomIntersection {
    observer: IntersectionObserver,
    _callback: EntriesCallback,
}

impl Disconnect for DomIntersection {
    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

/// Tracks whether one element is in view and whether it ever has been.
///
/// If the browser cannot create an intersection observer the element simply
/// never reports in view; the page still renders.
#[wasm_bindgen]
pub struct InViewObserver {
    view: Rc<RefCell<InView>>,
    guard: ObservationGuard<DomIntersection>,
}

#[wasm_bindgen]
impl InViewObserver {
    /// Start observing `element`. `on_change` is called with
    /// `(isInView, hasBeenInView)` whenever either flag changes.
    #[wasm_bindgen(constructor)]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(
        element: &Element,
        threshold: Option<f64>,
        root_margin: Option<String>,
        on_change: Option<js_sys::Function>,
    ) -> Result<InViewObserver, JsError> {
        let defaults = InViewOptions::default();
        let root_margin = match root_margin.as_deref() {
            Some(margin) => margin
                .parse::<RootMargin>()
                .map_err(|e| JsError::new(&e.to_string()))?,
            None => defaults.root_margin,
        };
        let options = InViewOptions::new(threshold.unwrap_or(defaults.threshold), root_margin)
            .map_err(|e| JsError::new(&e.to_string()))?;

        let view = Rc::new(RefCell::new(InView::new(options)));
        let guard = match connect(element, options, Rc::clone(&view), on_change) {
            Ok(handle) => ObservationGuard::new(handle),
            Err(err) => {
                web_sys::console::warn_2(&"axis: intersection observer unavailable".into(), &err);
                ObservationGuard::inert()
            }
        };
        Ok(Self { view, guard })
    }

    #[wasm_bindgen(js_name = isInView)]
    pub fn is_in_view(&self) -> bool {
        self.view.borrow().is_in_view()
    }

    #[wasm_bindgen(js_name = hasBeenInView)]
    pub fn has_been_in_view(&self) -> bool {
        self.view.borrow().has_been_in_view()
    }

    /// Whether the element is still being observed.
    #[wasm_bindgen(js_name = isObserving)]
    pub fn is_observing(&self) -> bool {
        self.guard.is_active()
    }

    /// Stop observing. Safe to call more than once; also happens on free.
    pub fn disconnect(&mut self) {
        self.guard.release();
    }
}

fn connect(
    element: &Element,
    options: InViewOptions,
    view: Rc<RefCell<InView>>,
    on_change: Option<js_sys::Function>,
) -> Result<DomIntersection, JsValue> {
    let callback: EntriesCallback = Closure::new(move |entries: js_sys::Array, _: IntersectionObserver| {
        let mut changed = false;
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let sample = IntersectionSample::new(entry.is_intersecting(), entry.intersection_ratio());
            changed |= view.borrow_mut().record(sample);
        }
        if !changed {
            return;
        }
        if let Some(f) = &on_change {
            let (in_view, has_been) = {
                let view = view.borrow();
                (view.is_in_view(), view.has_been_in_view())
            };
            if let Err(err) = f.call2(&JsValue::NULL, &in_view.into(), &has_been.into()) {
                web_sys::console::error_2(&"axis: in-view callback failed".into(), &err);
            }
        }
    });

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(&options.root_margin.to_string());
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    observer.observe(element);
    Ok(DomIntersection {
        observer,
        _callback: callback,
    })
}
