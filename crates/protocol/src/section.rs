use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identifier of a page section, matching the id of its DOM anchor.
///
/// Backed by `Arc<str>`: the tracker hands out the active id on every scroll
/// tick, and cloning must not allocate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(Arc<str>);

impl SectionId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SectionId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SectionId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl std::ops::Deref for SectionId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        SectionId(Arc::from(s))
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        SectionId(Arc::from(s))
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Plain string on the wire; avoids serde's `rc` feature.
impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SectionId::from(s))
    }
}

/// One navigable region of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    /// Human-readable label.
    pub name: String,
}

impl Section {
    pub fn new(id: impl Into<SectionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Derived scroll-tracking state, recomputed on every scroll event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    /// Always an id present in the section registry.
    pub active_section_id: SectionId,
    /// Clamped to `[0, 100]`.
    pub scroll_progress_percent: f64,
}

impl TrackerState {
    pub fn new(active_section_id: SectionId) -> Self {
        Self {
            active_section_id,
            scroll_progress_percent: 0.0,
        }
    }
}

/// Visibility of one observed element.
///
/// `has_been_in_view` is a one-shot latch: once set it stays set for the
/// lifetime of the observed element. Writes go through [`ViewState::record`],
/// so it serializes for display but cannot be read back from outside:
///
/// ```compile_fail
/// let state: Option<axis_protocol::ViewState> =
///     serde_json::from_str(r#"{"isInView":true,"hasBeenInView":false}"#).ok();
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    is_in_view: bool,
    has_been_in_view: bool,
}

impl ViewState {
    pub fn is_in_view(&self) -> bool {
        self.is_in_view
    }

    pub fn has_been_in_view(&self) -> bool {
        self.has_been_in_view
    }

    /// Apply the current intersection status. Returns whether anything changed.
    pub fn record(&mut self, intersecting: bool) -> bool {
        let before = *self;
        self.is_in_view = intersecting;
        if intersecting && !self.has_been_in_view {
            self.has_been_in_view = true;
        }
        before != *self
    }
}
