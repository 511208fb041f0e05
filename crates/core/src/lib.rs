//! Scroll tracking for the Project Axis page.
//!
//! ```text
//!   scroll / resize ─▶ PageGeometry ─▶ ViewportObserver ─▶ TrackerState ─▶ views ─▶ RenderCommand[]
//!   intersection    ─▶ InView (per region, one-shot latch)
//! ```
//!
//! Nothing here touches a DOM. Browsers plug in through `axis-wasm`; the
//! terminal preview and the tests use the simulated [`layout::PageLayout`].

pub mod config;
pub mod geometry;
pub mod layout;
pub mod registry;
pub mod tracker;
pub mod views;
pub mod visibility;

pub use geometry::{Navigator, PageGeometry, ScrollBehavior};
pub use registry::{RegistryError, SectionRegistry};
pub use tracker::{Readout, SubscriptionId, ViewportObserver};
pub use visibility::{InView, InViewOptions, IntersectionSample, ObservationGuard, RootMargin};
