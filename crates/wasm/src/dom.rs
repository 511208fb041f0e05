use axis_core::{Navigator, PageGeometry, ScrollBehavior};
use web_sys::{Document, ScrollIntoViewOptions, Window};

/// The live page, read and scrolled through the DOM.
///
/// Every query goes to the DOM at call time; nothing is cached between
/// scroll events.
#[derive(Debug, Clone)]
pub struct DomGeometry {
    window: Window,
    document: Document,
}

impl DomGeometry {
    /// `None` outside a browser main thread.
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl PageGeometry for DomGeometry {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_height(&self) -> f64 {
        self.document
            .document_element()
            .map_or(0.0, |root| f64::from(root.scroll_height()))
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn anchor_top(&self, id: &str) -> Option<f64> {
        let element = self.document.get_element_by_id(id)?;
        Some(element.get_bounding_client_rect().top())
    }
}

impl Navigator for DomGeometry {
    fn scroll_into_view(&mut self, id: &str, behavior: ScrollBehavior) {
        let Some(element) = self.document.get_element_by_id(id) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}
