use axis_protocol::{Point, RenderCommand, ThemeToken, TrackerState, Viewport};

use crate::registry::SectionRegistry;

const LEFT_INSET: f64 = 24.0;
const DOT_SIZE: f64 = 12.0;
const DOT_GAP: f64 = 12.0;
const ACTIVE_SCALE: f64 = 1.25;

/// Below this width the navigator is hidden.
pub const MIN_WIDTH: f64 = 1024.0;

/// Render the fixed side column of section dots.
///
/// One selectable dot per section, vertically centered on the left edge. The
/// active section's dot is enlarged and drawn in the accent color.
pub fn render_dot_navigator(
    registry: &SectionRegistry,
    state: &TrackerState,
    viewport: &Viewport,
) -> Vec<RenderCommand> {
    if viewport.width < MIN_WIDTH {
        return Vec::new();
    }

    let count = registry.len() as f64;
    let column_height = count * DOT_SIZE + (count - 1.0).max(0.0) * DOT_GAP;
    let top = viewport.y + (viewport.height - column_height) / 2.0;
    let x = viewport.x + LEFT_INSET + DOT_SIZE / 2.0;

    let mut commands = Vec::with_capacity(registry.len() + 2);
    commands.push(RenderCommand::BeginGroup {
        id: "dot-navigator".into(),
        label: Some("Sections".into()),
    });

    for (i, section) in registry.iter().enumerate() {
        let active = section.id == state.active_section_id;
        let y = top + i as f64 * (DOT_SIZE + DOT_GAP) + DOT_SIZE / 2.0;
        let (radius, color, border) = if active {
            (
                DOT_SIZE / 2.0 * ACTIVE_SCALE,
                ThemeToken::MarkerActive,
                ThemeToken::MarkerActive,
            )
        } else {
            (DOT_SIZE / 2.0, ThemeToken::MarkerInactive, ThemeToken::MarkerBorder)
        };
        commands.push(RenderCommand::DrawDot {
            center: Point::new(x, y),
            radius,
            color,
            border_color: Some(border),
            label: Some(section.name.clone()),
            section_id: Some(section.id.clone()),
        });
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
