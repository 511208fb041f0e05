use axis_protocol::{Rect, RenderCommand, ThemeToken, TrackerState, Viewport};

const BAR_HEIGHT: f64 = 4.0;

/// Render the full-width progress bar pinned to the bottom edge.
///
/// The fill spans `scroll_progress_percent` of the width; the state is
/// already clamped, so the fill never overruns the track.
pub fn render_progress_bar(state: &TrackerState, viewport: &Viewport) -> Vec<RenderCommand> {
    let y = viewport.y + viewport.height - BAR_HEIGHT;
    let fill_width = viewport.width * state.scroll_progress_percent / 100.0;

    let mut commands = vec![
        RenderCommand::BeginGroup {
            id: "progress-bar".into(),
            label: Some("Scroll progress".into()),
        },
        RenderCommand::DrawRect {
            rect: Rect::new(viewport.x, y, viewport.width, BAR_HEIGHT),
            color: ThemeToken::ProgressTrack,
            border_color: None,
            label: None,
            section_id: None,
        },
    ];
    if fill_width > 0.0 {
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(viewport.x, y, fill_width, BAR_HEIGHT),
            color: ThemeToken::ProgressFill,
            border_color: None,
            label: None,
            section_id: None,
        });
    }
    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use axis_protocol::SectionId;

    fn fill_width(commands: &[RenderCommand]) -> Option<f64> {
        commands.iter().find_map(|c| match c {
            RenderCommand::DrawRect {
                rect,
                color: ThemeToken::ProgressFill,
                ..
            } => Some(rect.w),
            _ => None,
        })
    }

    #[test]
    fn fill_tracks_progress() {
        let state = TrackerState {
            active_section_id: SectionId::from("about"),
            scroll_progress_percent: 50.0,
        };
        let cmds = render_progress_bar(&state, &Viewport::new(1200.0, 800.0));
        assert_eq!(fill_width(&cmds), Some(600.0));
    }

    #[test]
    fn no_fill_at_top_of_page() {
        let state = TrackerState::new(SectionId::from("hero"));
        let cmds = render_progress_bar(&state, &Viewport::new(1200.0, 800.0));
        assert_eq!(fill_width(&cmds), None);
        // Track is still drawn along the bottom edge.
        assert!(cmds.iter().any(|c| matches!(
            c,
            RenderCommand::DrawRect { rect, color: ThemeToken::ProgressTrack, .. }
                if rect.y == 796.0 && rect.w == 1200.0
        )));
    }
}
