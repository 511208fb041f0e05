use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use axis_core::PageGeometry;
use axis_protocol::{Point, Rect as PxRect, RenderCommand, TextAlign, ThemeToken};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Paragraph},
};
use tracing::info;

use crate::app::{App, CELL_H, CELL_W};

const ACCENT: Color = Color::Rgb(0, 200, 83);
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const IDLE_INTERVAL: Duration = Duration::from_millis(100);
const WHEEL_LINES: u8 = 3;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Accent => ACCENT,
        ThemeToken::Background => Color::Black,
        ThemeToken::Surface => Color::Rgb(18, 18, 18),
        ThemeToken::Border => Color::Gray,
        ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextSecondary => Color::Gray,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::MarkerActive => ACCENT,
        ThemeToken::MarkerInactive => Color::DarkGray,
        ThemeToken::MarkerBorder => Color::Gray,
        ThemeToken::ProgressTrack => Color::Rgb(40, 40, 40),
        ThemeToken::ProgressFill => ACCENT,
        ThemeToken::TickActive => ACCENT,
        ThemeToken::TickInactive => Color::DarkGray,
        ThemeToken::MenuItemBackground => Color::Rgb(18, 18, 18),
        ThemeToken::MenuItemActive => Color::Rgb(8, 48, 24),
        ThemeToken::MenuItemHover => Color::Rgb(40, 40, 40),
        ThemeToken::BlockHidden => Color::Rgb(10, 10, 10),
        ThemeToken::BlockRevealed => Color::Rgb(28, 28, 28),
    }
}

/// Cells covered by a rectangle in virtual pixels, clipped to `area`.
fn px_rect_to_cells(rect: &PxRect, area: Rect) -> Option<Rect> {
    let left = (rect.x / CELL_W).floor().max(0.0);
    let top = (rect.y / CELL_H).floor().max(0.0);
    let right = ((rect.x + rect.w) / CELL_W).ceil().min(f64::from(area.width));
    let bottom = ((rect.y + rect.h) / CELL_H).ceil().min(f64::from(area.height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        area.x + left as u16,
        area.y + top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

/// Paint render commands into `buf`, with virtual pixel (0, 0) at the top
/// left of `area`.
fn paint(buf: &mut Buffer, area: Rect, commands: &[RenderCommand]) {
    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect { rect, color, .. } => {
                if let Some(cells) = px_rect_to_cells(rect, area) {
                    buf.set_style(cells, Style::default().bg(theme_to_color(*color)));
                }
            }
            RenderCommand::DrawDot {
                center,
                color,
                radius,
                ..
            } => {
                let col = (center.x / CELL_W).floor();
                let row = (center.y / CELL_H).floor();
                if col < 0.0 || row < 0.0 || col >= f64::from(area.width) || row >= f64::from(area.height) {
                    continue;
                }
                let glyph = if *radius > 6.0 { "●" } else { "•" };
                let cell = &mut buf[(area.x + col as u16, area.y + row as u16)];
                cell.set_symbol(glyph).set_fg(theme_to_color(*color));
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let len = text.chars().count() as f64;
                let start = match align {
                    TextAlign::Left => position.x / CELL_W,
                    TextAlign::Center => position.x / CELL_W - len / 2.0,
                    TextAlign::Right => position.x / CELL_W - len,
                };
                let row = (position.y / CELL_H).floor();
                if row < 0.0 || row >= f64::from(area.height) {
                    continue;
                }
                let y = area.y + row as u16;
                let fg = theme_to_color(*color);
                for (i, ch) in text.chars().enumerate() {
                    let col = (start + i as f64).floor();
                    if col < 0.0 || col >= f64::from(area.width) {
                        continue;
                    }
                    buf[(area.x + col as u16, y)].set_char(ch).set_fg(fg);
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

/// The page itself: one band per section, labelled once revealed.
fn page_commands(app: &App) -> Vec<RenderCommand> {
    let scroll_y = app.layout.scroll_y();
    let width = app.viewport().width;
    let mut commands = Vec::new();
    for (block, top) in app.layout.blocks() {
        let y = top - scroll_y;
        if y + block.height < 0.0 || y > app.viewport().height {
            continue;
        }
        let revealed = app.has_been_revealed(&block.id);
        commands.push(RenderCommand::DrawRect {
            rect: PxRect::new(0.0, y, width, block.height),
            color: if revealed {
                ThemeToken::BlockRevealed
            } else {
                ThemeToken::BlockHidden
            },
            border_color: None,
            label: None,
            section_id: None,
        });
        commands.push(RenderCommand::DrawRect {
            rect: PxRect::new(0.0, y, width, 1.0),
            color: ThemeToken::Border,
            border_color: None,
            label: None,
            section_id: None,
        });
        if revealed {
            let name = app
                .observer
                .registry()
                .get(&block.id)
                .map_or_else(|| block.id.to_string(), |s| s.name.to_uppercase());
            commands.push(RenderCommand::DrawText {
                position: Point::new(width / 2.0, y + block.height / 2.0),
                text: name,
                color: ThemeToken::TextPrimary,
                font_size: 48.0,
                align: TextAlign::Center,
            });
        }
    }
    commands
}

fn draw(frame: &mut ratatui::Frame<'_>, app: &App) {
    let area = frame.area();
    let header_area = Rect::new(0, 0, area.width, 1);
    let readout = app.observer.readout();
    let header = Paragraph::new(format!(
        " Project Axis | {} | {:>3.0}% | j/k scroll | 1-9 jump | m menu | q quit ",
        readout.position_label(),
        readout.progress_percent
    ))
    .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, header_area);

    let content = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), content);

    let buf = frame.buffer_mut();
    paint(buf, content, &page_commands(app));
    paint(buf, content, &app.overlay());
    paint(buf, content, &app.menu_commands());
}

/// Content cell under a terminal position, if it is below the header.
fn content_cell(column: u16, row: u16) -> Option<(u16, u16)> {
    row.checked_sub(1).map(|r| (column, r))
}

/// Leave raw mode and the alternate screen. Errors are ignored since this
/// also runs from the panic hook.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Runs its closure when dropped, on every way out of the scope.
struct OnExit<F: FnMut()>(F);

impl<F: FnMut()> Drop for OnExit<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

pub fn run(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let _restore = OnExit(restore_terminal);
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);
    terminal.show_cursor()?;
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.resize(size.width, size.height.saturating_sub(1));
        app.tick(Instant::now());
        terminal.draw(|frame| draw(frame, app))?;

        let timeout = if app.is_animating() {
            FRAME_INTERVAL
        } else {
            IDLE_INTERVAL
        };
        if !event::poll(timeout)? {
            continue;
        }
        let now = Instant::now();
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    info!("quit");
                    return Ok(());
                }
                KeyCode::Char('j') | KeyCode::Down => app.line_down(),
                KeyCode::Char('k') | KeyCode::Up => app.line_up(),
                KeyCode::PageDown | KeyCode::Char(' ') => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home | KeyCode::Char('g') => app.scroll_to_top(now),
                KeyCode::End | KeyCode::Char('G') => app.scroll_to_bottom(now),
                KeyCode::Char('m') => app.toggle_menu(),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    app.navigate_to_index(index, now);
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    for _ in 0..WHEEL_LINES {
                        app.line_down();
                    }
                }
                MouseEventKind::ScrollUp => {
                    for _ in 0..WHEEL_LINES {
                        app.line_up();
                    }
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    if let Some((col, row)) = content_cell(mouse.column, mouse.row) {
                        app.click(col, row, now);
                    }
                }
                MouseEventKind::Moved => {
                    if let Some((col, row)) = content_cell(mouse.column, mouse.row) {
                        app.hover(col, row);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn area() -> Rect {
        Rect::new(0, 1, 40, 10)
    }

    #[test]
    fn rects_snap_outward_to_cells() {
        let cells = px_rect_to_cells(&PxRect::new(4.0, 8.0, 10.0, 10.0), area()).expect("visible");
        assert_eq!(cells, Rect::new(0, 1, 2, 2));
    }

    #[test]
    fn rects_are_clipped_to_the_area() {
        let cells = px_rect_to_cells(&PxRect::new(-80.0, -32.0, 1000.0, 1000.0), area()).expect("visible");
        assert_eq!(cells, Rect::new(0, 1, 40, 10));
        assert_eq!(px_rect_to_cells(&PxRect::new(0.0, 500.0, 10.0, 10.0), area()), None);
    }

    #[test]
    fn text_is_aligned_in_cells() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 11));
        let commands = vec![
            RenderCommand::DrawText {
                position: Point::new(80.0, 8.0),
                text: "AXIS".into(),
                color: ThemeToken::Accent,
                font_size: 12.0,
                align: TextAlign::Right,
            },
            RenderCommand::DrawText {
                position: Point::new(160.0, 40.0),
                text: "MID".into(),
                color: ThemeToken::TextPrimary,
                font_size: 12.0,
                align: TextAlign::Center,
            },
        ];
        paint(&mut buf, area(), &commands);
        assert_eq!(buf[(6, 1)].symbol(), "A");
        assert_eq!(buf[(9, 1)].symbol(), "S");
        assert_eq!(buf[(6, 1)].fg, ACCENT);
        assert_eq!(buf[(18, 3)].symbol(), "M");
    }

    #[test]
    fn active_dot_uses_the_large_glyph() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 11));
        let commands = vec![RenderCommand::DrawDot {
            center: Point::new(30.0, 20.0),
            radius: 7.5,
            color: ThemeToken::MarkerActive,
            border_color: None,
            label: None,
            section_id: None,
        }];
        paint(&mut buf, area(), &commands);
        assert_eq!(buf[(3, 2)].symbol(), "●");
    }

    #[test]
    fn header_row_is_not_content() {
        assert_eq!(content_cell(5, 0), None);
        assert_eq!(content_cell(5, 3), Some((5, 2)));
    }

    #[test]
    fn cleanup_runs_when_setup_fails_halfway() {
        fn setup(cleanups: &Cell<u32>) -> Result<()> {
            let _restore = OnExit(|| cleanups.set(cleanups.get() + 1));
            anyhow::bail!("no terminal");
        }

        let cleanups = Cell::new(0);
        assert!(setup(&cleanups).is_err());
        assert_eq!(cleanups.get(), 1);
    }
}
