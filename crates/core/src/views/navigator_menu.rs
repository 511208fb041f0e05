use axis_protocol::{Point, Rect, RenderCommand, SectionId, TextAlign, ThemeToken};

use crate::registry::SectionRegistry;
use crate::tracker::Readout;

const PAD: f64 = 32.0;
const HEADER_HEIGHT: f64 = 72.0;
const ITEM_HEIGHT: f64 = 44.0;
const ITEM_GAP: f64 = 8.0;
const ITEM_PAD_X: f64 = 16.0;
const STATUS_DOT: f64 = 6.0;
const TITLE_SIZE: f64 = 18.0;
const BODY_SIZE: f64 = 14.0;
const SMALL_SIZE: f64 = 12.0;
const TRACK_HEIGHT: f64 = 8.0;
/// Hovered and active items shift their arrow right by this much.
const ARROW_NUDGE: f64 = 8.0;

/// Interaction state owned by whoever hosts the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    pub collapsed: bool,
    pub hovered: Option<SectionId>,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            collapsed: true,
            hovered: None,
        }
    }
}

impl MenuState {
    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }
}

/// Height of the menu panel in its current collapsed/expanded state.
pub fn menu_height(registry: &SectionRegistry, menu: &MenuState) -> f64 {
    if menu.collapsed {
        return HEADER_HEIGHT;
    }
    let n = registry.len() as f64;
    HEADER_HEIGHT
        + PAD
        + BODY_SIZE * 2.0
        + n * ITEM_HEIGHT
        + (n - 1.0).max(0.0) * ITEM_GAP
        + PAD
        + SMALL_SIZE * 2.0
        + TRACK_HEIGHT
        + SMALL_SIZE * 2.0
        + PAD
}

/// Render the collapsible "navigate site" panel into `area`.
///
/// Expanded, it lists every section as a selectable row (active row
/// highlighted, hovered row tinted) followed by a navigation-progress bar
/// filled to the readout's navigation fraction and an `N / M sections`
/// caption.
pub fn render_navigator_menu(
    registry: &SectionRegistry,
    readout: &Readout,
    menu: &MenuState,
    area: Rect,
) -> Vec<RenderCommand> {
    let height = menu_height(registry, menu);
    let mut commands = Vec::with_capacity(registry.len() * 2 + 12);
    commands.push(RenderCommand::BeginGroup {
        id: "navigator-menu".into(),
        label: Some("Navigate site".into()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(area.x, area.y, area.w, height),
        color: ThemeToken::Surface,
        border_color: Some(ThemeToken::Border),
        label: None,
        section_id: None,
    });

    // Header: status dot, title (only when expanded) and the toggle chevron.
    let header_mid = area.y + HEADER_HEIGHT / 2.0;
    commands.push(RenderCommand::DrawDot {
        center: Point::new(area.x + PAD + STATUS_DOT, header_mid),
        radius: STATUS_DOT,
        color: ThemeToken::Accent,
        border_color: None,
        label: None,
        section_id: None,
    });
    if !menu.collapsed {
        commands.push(RenderCommand::DrawText {
            position: Point::new(area.x + PAD + STATUS_DOT * 2.0 + 12.0, header_mid),
            text: "NAVIGATE SITE".into(),
            color: ThemeToken::TextPrimary,
            font_size: TITLE_SIZE,
            align: TextAlign::Left,
        });
    }
    commands.push(RenderCommand::DrawText {
        position: Point::new(area.x + area.w - PAD, header_mid),
        text: (if menu.collapsed { "▸" } else { "▾" }).into(),
        color: ThemeToken::TextPrimary,
        font_size: TITLE_SIZE,
        align: TextAlign::Right,
    });

    if menu.collapsed {
        commands.push(RenderCommand::EndGroup);
        return commands;
    }

    let inner_x = area.x + PAD;
    let inner_w = (area.w - PAD * 2.0).max(0.0);
    let mut y = area.y + HEADER_HEIGHT + PAD;

    commands.push(RenderCommand::DrawText {
        position: Point::new(inner_x, y + BODY_SIZE / 2.0),
        text: "Jump to any section of Project Axis".into(),
        color: ThemeToken::TextSecondary,
        font_size: BODY_SIZE,
        align: TextAlign::Left,
    });
    y += BODY_SIZE * 2.0;

    for (index, section) in registry.iter().enumerate() {
        let active = index == readout.index;
        let hovered = menu.hovered.as_ref() == Some(&section.id);
        let (fill, border, text_color) = if active {
            (ThemeToken::MenuItemActive, ThemeToken::Accent, ThemeToken::Accent)
        } else if hovered {
            (ThemeToken::MenuItemHover, ThemeToken::Accent, ThemeToken::TextPrimary)
        } else {
            (ThemeToken::MenuItemBackground, ThemeToken::Border, ThemeToken::TextPrimary)
        };
        let label = section.name.to_uppercase();
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(inner_x, y, inner_w, ITEM_HEIGHT),
            color: fill,
            border_color: Some(border),
            label: Some(label.clone()),
            section_id: Some(section.id.clone()),
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(inner_x + ITEM_PAD_X, y + ITEM_HEIGHT / 2.0),
            text: label,
            color: text_color,
            font_size: BODY_SIZE,
            align: TextAlign::Left,
        });
        let nudge = if active || hovered { ARROW_NUDGE } else { 0.0 };
        commands.push(RenderCommand::DrawText {
            position: Point::new(inner_x + inner_w - ITEM_PAD_X - ARROW_NUDGE + nudge, y + ITEM_HEIGHT / 2.0),
            text: "›".into(),
            color: text_color,
            font_size: BODY_SIZE,
            align: TextAlign::Right,
        });
        y += ITEM_HEIGHT + ITEM_GAP;
    }
    y += PAD - ITEM_GAP;

    commands.push(RenderCommand::DrawText {
        position: Point::new(inner_x, y + SMALL_SIZE / 2.0),
        text: "NAVIGATION PROGRESS".into(),
        color: ThemeToken::TextSecondary,
        font_size: SMALL_SIZE,
        align: TextAlign::Left,
    });
    y += SMALL_SIZE * 2.0;
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(inner_x, y, inner_w, TRACK_HEIGHT),
        color: ThemeToken::ProgressTrack,
        border_color: Some(ThemeToken::Border),
        label: None,
        section_id: None,
    });
    let fraction = readout.navigation_fraction();
    if fraction > 0.0 {
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(inner_x, y, inner_w * fraction, TRACK_HEIGHT),
            color: ThemeToken::ProgressFill,
            border_color: None,
            label: None,
            section_id: None,
        });
    }
    y += TRACK_HEIGHT + SMALL_SIZE;

    commands.push(RenderCommand::DrawText {
        position: Point::new(inner_x, y + SMALL_SIZE / 2.0),
        text: readout.position_label(),
        color: ThemeToken::TextMuted,
        font_size: SMALL_SIZE,
        align: TextAlign::Left,
    });

    commands.push(RenderCommand::EndGroup);
    commands
}
