pub mod commands;
pub mod section;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use section::{Section, SectionId, TrackerState, ViewState};
pub use theme::ThemeToken;
pub use types::{Point, Rect, Viewport};
