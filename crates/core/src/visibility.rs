//! Per-region "has this been seen yet" detection.
//!
//! Independent of the [`ViewportObserver`](crate::tracker::ViewportObserver):
//! each content region owns one [`InView`], fed by intersection
//! notifications instead of scroll math, and uses the
//! [`has_been_in_view`](InView::has_been_in_view) latch to gate a one-shot
//! reveal animation.

use std::fmt;
use std::str::FromStr;

use axis_protocol::ViewState;
use thiserror::Error;

pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum VisibilityError {
    #[error("threshold must be within [0, 1], got {0}")]
    Threshold(f64),
    #[error("invalid root margin {0:?}: expected 1 to 4 px or % values")]
    RootMargin(String),
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    Px(f64),
    /// Percentage of the root's size along the same axis.
    Percent(f64),
}

impl MarginLength {
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => reference * pct / 100.0,
        }
    }
}

impl FromStr for MarginLength {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, make): (&str, fn(f64) -> Self) = if let Some(n) = s.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Self::Percent)
        } else if s == "0" {
            (s, Self::Px)
        } else {
            return Err(());
        };
        let value: f64 = number.parse().map_err(|_| ())?;
        if !value.is_finite() {
            return Err(());
        }
        Ok(make(value))
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Growth (positive) or shrinkage (negative) of the viewport box used for
/// intersection tests, written like CSS `margin` shorthand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub const ZERO: Self = Self {
        top: MarginLength::Px(0.0),
        right: MarginLength::Px(0.0),
        bottom: MarginLength::Px(0.0),
        left: MarginLength::Px(0.0),
    };

    /// Top and bottom margins in pixels for a viewport of this height.
    pub fn resolve_vertical(&self, viewport_height: f64) -> (f64, f64) {
        (
            self.top.resolve(viewport_height),
            self.bottom.resolve(viewport_height),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = VisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VisibilityError::RootMargin(s.to_string());
        let values = s
            .split_whitespace()
            .map(str::parse::<MarginLength>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|()| invalid())?;
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(invalid()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InViewOptions {
    /// Visible fraction whose crossing triggers a notification.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl InViewOptions {
    pub fn new(threshold: f64, root_margin: RootMargin) -> Result<Self, VisibilityError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(VisibilityError::Threshold(threshold));
        }
        Ok(Self {
            threshold,
            root_margin,
        })
    }

    /// Which side of the threshold a visible fraction falls on.
    pub fn meets_threshold(&self, ratio: f64) -> bool {
        ratio >= self.threshold
    }
}

impl Default for InViewOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            root_margin: RootMargin::ZERO,
        }
    }
}

/// One intersection notification for an observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionSample {
    pub is_intersecting: bool,
    /// Visible fraction of the element, `[0, 1]`.
    pub ratio: f64,
}

impl IntersectionSample {
    pub fn new(is_intersecting: bool, ratio: f64) -> Self {
        Self {
            is_intersecting,
            ratio,
        }
    }
}

/// Visibility state of exactly one observed element.
#[derive(Debug, Clone, Default)]
pub struct InView {
    options: InViewOptions,
    state: ViewState,
}

impl InView {
    pub fn new(options: InViewOptions) -> Self {
        Self {
            options,
            state: ViewState::default(),
        }
    }

    pub fn options(&self) -> &InViewOptions {
        &self.options
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_in_view(&self) -> bool {
        self.state.is_in_view()
    }

    pub fn has_been_in_view(&self) -> bool {
        self.state.has_been_in_view()
    }

    /// Apply an intersection notification. Returns whether the state changed.
    ///
    /// The element is in view exactly when the notification says it
    /// intersects; the threshold only decides when notifications arrive.
    pub fn record(&mut self, sample: IntersectionSample) -> bool {
        self.state.record(sample.is_intersecting)
    }
}

/// A live intersection watch that can be torn down.
pub trait Disconnect {
    fn disconnect(&mut self);
}

/// Owns an intersection watch and disconnects it exactly once: on
/// [`release`](Self::release) or when dropped, whichever comes first.
#[must_use = "dropping the guard disconnects the observation"]
pub struct ObservationGuard<D: Disconnect> {
    handle: Option<D>,
}

impl<D: Disconnect> ObservationGuard<D> {
    pub fn new(handle: D) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// A guard for an observation that could not be set up.
    pub fn inert() -> Self {
        Self { handle: None }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.disconnect();
        }
    }
}

impl<D: Disconnect> Drop for ObservationGuard<D> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: Disconnect> fmt::Debug for ObservationGuard<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationGuard")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    struct CountingHandle(Rc<Cell<u32>>);

    impl Disconnect for CountingHandle {
        fn disconnect(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn default_options() {
        let opts = InViewOptions::default();
        assert!((opts.threshold - 0.1).abs() < f64::EPSILON);
        assert_eq!(opts.root_margin, RootMargin::ZERO);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        assert_eq!(
            InViewOptions::new(1.5, RootMargin::ZERO),
            Err(VisibilityError::Threshold(1.5))
        );
        assert!(InViewOptions::new(f64::NAN, RootMargin::ZERO).is_err());
        assert!(InViewOptions::new(0.0, RootMargin::ZERO).is_ok());
        assert!(InViewOptions::new(1.0, RootMargin::ZERO).is_ok());
    }

    #[test]
    fn root_margin_shorthand() {
        let one: RootMargin = "10px".parse().expect("one value");
        assert_eq!(one.left, MarginLength::Px(10.0));

        let two: RootMargin = "-20% 5px".parse().expect("two values");
        assert_eq!(two.top, MarginLength::Percent(-20.0));
        assert_eq!(two.bottom, MarginLength::Percent(-20.0));
        assert_eq!(two.right, MarginLength::Px(5.0));

        let three: RootMargin = "1px 2px 3px".parse().expect("three values");
        assert_eq!(three.left, MarginLength::Px(2.0));
        assert_eq!(three.bottom, MarginLength::Px(3.0));

        let zero: RootMargin = "0".parse().expect("bare zero");
        assert_eq!(zero, RootMargin::ZERO);
    }

    #[test]
    fn root_margin_rejects_garbage() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("10em".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!("12".parse::<RootMargin>().is_err());
    }

    #[test]
    fn root_margin_display_is_css() {
        let m: RootMargin = "0px 0px -25% 0px".parse().expect("valid");
        assert_eq!(m.to_string(), "0px 0px -25% 0px");
        assert_eq!(m.resolve_vertical(800.0), (0.0, -200.0));
    }

    #[test]
    fn intersecting_below_threshold_is_in_view() {
        let mut v = InView::default();
        assert!(v.record(IntersectionSample::new(true, 0.05)));
        assert!(v.is_in_view());
        assert!(v.has_been_in_view());
    }

    #[test]
    fn not_intersecting_is_out_of_view_whatever_the_ratio() {
        let mut v = InView::new(InViewOptions::new(0.0, RootMargin::ZERO).expect("valid"));
        assert!(!v.record(IntersectionSample::new(false, 0.0)));
        assert!(!v.is_in_view());
        assert!(!v.has_been_in_view());
    }

    #[test]
    fn threshold_side() {
        let opts = InViewOptions::new(0.2, RootMargin::ZERO).expect("valid");
        assert!(!opts.meets_threshold(0.1));
        assert!(opts.meets_threshold(0.2));
        assert!(opts.meets_threshold(1.0));
    }

    #[test]
    fn has_been_in_view_never_resets() {
        let mut v = InView::default();
        let sequence = [
            (false, 0.0),
            (true, 0.5),
            (false, 0.0),
            (true, 0.05),
            (false, 0.0),
            (false, 0.0),
        ];
        let mut latched = false;
        for (intersecting, ratio) in sequence {
            v.record(IntersectionSample::new(intersecting, ratio));
            latched |= v.is_in_view();
            assert_eq!(v.has_been_in_view(), latched);
        }
        assert!(v.has_been_in_view());
        assert!(!v.is_in_view());
    }

    #[test]
    fn guard_disconnects_once_on_drop() {
        let calls = Rc::new(Cell::new(0));
        {
            let _guard = ObservationGuard::new(CountingHandle(Rc::clone(&calls)));
            assert_eq!(calls.get(), 0);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn explicit_release_then_drop_disconnects_once() {
        let calls = Rc::new(Cell::new(0));
        let mut guard = ObservationGuard::new(CountingHandle(Rc::clone(&calls)));
        assert!(guard.is_active());
        guard.release();
        guard.release();
        assert!(!guard.is_active());
        drop(guard);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn inert_guard_is_a_no_op() {
        let guard = ObservationGuard::<CountingHandle>::inert();
        assert!(!guard.is_active());
    }
}
