//! Presentation surfaces driven by the tracker state.
//!
//! Each view is a pure function of state and a target area, returning
//! [`RenderCommand`]s for whatever renderer is attached (canvas via
//! `axis-wasm`, terminal via `axis-tui`).

pub mod dot_navigator;
pub mod navigator_menu;
pub mod progress_bar;
pub mod section_indicator;

use axis_protocol::{Point, RenderCommand, SectionId};

/// Approximate advance of one monospace glyph, as a fraction of font size.
const MONO_ADVANCE: f64 = 0.6;

pub(crate) fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * MONO_ADVANCE
}

/// The section targeted by the topmost selectable shape under `point`.
///
/// Commands are painted in order, so later commands are on top.
pub fn hit_test(commands: &[RenderCommand], point: Point) -> Option<SectionId> {
    commands.iter().rev().find_map(|cmd| match cmd {
        RenderCommand::DrawRect {
            rect,
            section_id: Some(id),
            ..
        } if rect.contains(point) => Some(id.clone()),
        RenderCommand::DrawDot {
            center,
            radius,
            section_id: Some(id),
            ..
        } if (point.x - center.x).hypot(point.y - center.y) <= *radius => Some(id.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axis_protocol::{Rect, ThemeToken};

    fn rect(x: f64, y: f64, w: f64, h: f64, id: Option<&str>) -> RenderCommand {
        RenderCommand::DrawRect {
            rect: Rect::new(x, y, w, h),
            color: ThemeToken::Surface,
            border_color: None,
            label: None,
            section_id: id.map(SectionId::from),
        }
    }

    #[test]
    fn hit_test_prefers_topmost_shape() {
        let cmds = vec![
            rect(0.0, 0.0, 100.0, 100.0, Some("about")),
            rect(10.0, 10.0, 20.0, 20.0, Some("timeline")),
        ];
        assert_eq!(hit_test(&cmds, Point::new(15.0, 15.0)), Some(SectionId::from("timeline")));
        assert_eq!(hit_test(&cmds, Point::new(50.0, 50.0)), Some(SectionId::from("about")));
        assert_eq!(hit_test(&cmds, Point::new(150.0, 50.0)), None);
    }

    #[test]
    fn hit_test_ignores_unselectable_shapes() {
        let cmds = vec![
            rect(0.0, 0.0, 100.0, 100.0, Some("about")),
            rect(0.0, 0.0, 100.0, 100.0, None),
        ];
        assert_eq!(hit_test(&cmds, Point::new(5.0, 5.0)), Some(SectionId::from("about")));
    }

    #[test]
    fn hit_test_dots_use_radius() {
        let cmds = vec![RenderCommand::DrawDot {
            center: Point::new(30.0, 30.0),
            radius: 6.0,
            color: ThemeToken::MarkerInactive,
            border_color: None,
            label: None,
            section_id: Some(SectionId::from("hero")),
        }];
        assert!(hit_test(&cmds, Point::new(34.0, 34.0)).is_some());
        assert!(hit_test(&cmds, Point::new(36.0, 36.0)).is_none());
    }

    #[test]
    fn mono_text_width() {
        assert!((text_width("ABOUT", 10.0) - 30.0).abs() < 1e-9);
    }
}
