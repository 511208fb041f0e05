use axis_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use super::text_width;
use crate::tracker::Readout;

const INSET: f64 = 24.0;
const PAD_X: f64 = 16.0;
const PAD_Y: f64 = 8.0;
const ITEM_GAP: f64 = 12.0;
const FONT_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;
const TICK_SIZE: f64 = 6.0;
const TICK_GAP: f64 = 4.0;
const LABEL: &str = "CURRENT SECTION:";

/// Below this width the readout is hidden.
pub const MIN_WIDTH: f64 = 640.0;

/// Render the top-right "current section" readout: a caption, the active
/// section's name, and one tick per section with the active index lit.
pub fn render_section_indicator(readout: &Readout, viewport: &Viewport) -> Vec<RenderCommand> {
    if viewport.width < MIN_WIDTH {
        return Vec::new();
    }

    let name = readout.name.to_uppercase();
    let label_w = text_width(LABEL, FONT_SIZE);
    let name_w = text_width(&name, FONT_SIZE);
    let ticks_w = readout.count as f64 * TICK_SIZE + readout.count.saturating_sub(1) as f64 * TICK_GAP;
    let panel_w = PAD_X * 2.0 + label_w + ITEM_GAP + name_w + ITEM_GAP + ticks_w;
    let panel_h = PAD_Y * 2.0 + LINE_HEIGHT;
    let panel_x = viewport.x + viewport.width - INSET - panel_w;
    let panel_y = viewport.y + INSET;
    let baseline = panel_y + PAD_Y + LINE_HEIGHT / 2.0;

    let mut commands = Vec::with_capacity(readout.count + 5);
    commands.push(RenderCommand::BeginGroup {
        id: "section-indicator".into(),
        label: Some("Current section".into()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(panel_x, panel_y, panel_w, panel_h),
        color: ThemeToken::Surface,
        border_color: Some(ThemeToken::Border),
        label: None,
        section_id: None,
    });

    let mut x = panel_x + PAD_X;
    commands.push(RenderCommand::DrawText {
        position: Point::new(x, baseline),
        text: LABEL.into(),
        color: ThemeToken::TextSecondary,
        font_size: FONT_SIZE,
        align: TextAlign::Left,
    });
    x += label_w + ITEM_GAP;
    commands.push(RenderCommand::DrawText {
        position: Point::new(x, baseline),
        text: name,
        color: ThemeToken::Accent,
        font_size: FONT_SIZE,
        align: TextAlign::Left,
    });
    x += name_w + ITEM_GAP;

    let tick_y = baseline - TICK_SIZE / 2.0;
    for i in 0..readout.count {
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(x, tick_y, TICK_SIZE, TICK_SIZE),
            color: if i == readout.index {
                ThemeToken::TickActive
            } else {
                ThemeToken::TickInactive
            },
            border_color: None,
            label: None,
            section_id: None,
        });
        x += TICK_SIZE + TICK_GAP;
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
