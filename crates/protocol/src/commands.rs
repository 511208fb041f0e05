use serde::{Deserialize, Serialize};

use crate::section::SectionId;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// Views emit a `Vec<RenderCommand>` per surface. Renderers consume the list
/// in order; each command carries everything it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle. `section_id` marks it as a navigation target
    /// for hit-testing.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        section_id: Option<SectionId>,
    },

    /// Draw a filled circle (navigator dots).
    DrawDot {
        center: Point,
        radius: f64,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        section_id: Option<SectionId>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Begin a logical group (one per surface).
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
