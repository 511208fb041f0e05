use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Accent,

    Background,
    Surface,
    Border,

    TextPrimary,
    TextSecondary,
    TextMuted,

    // Dot navigator
    MarkerActive,
    MarkerInactive,
    MarkerBorder,

    // Progress bar
    ProgressTrack,
    ProgressFill,

    // Section readout
    TickActive,
    TickInactive,

    // Navigator menu
    MenuItemBackground,
    MenuItemActive,
    MenuItemHover,

    // Page blocks (preview renderers)
    BlockHidden,
    BlockRevealed,
}
