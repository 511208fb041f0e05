use axis_protocol::ThemeToken;
use wasm_bindgen::prelude::*;

/// CSS color for a theme token, matching the site's black, white and green
/// palette.
pub fn css_color(token: ThemeToken) -> &'static str {
    match token {
        ThemeToken::Accent => "#00C853",
        ThemeToken::Background => "#FFFFFF",
        ThemeToken::Surface => "#FFFFFF",
        ThemeToken::Border => "#000000",
        ThemeToken::TextPrimary => "#000000",
        ThemeToken::TextSecondary => "#4B5563",
        ThemeToken::TextMuted => "#6B7280",
        ThemeToken::MarkerActive => "#00C853",
        ThemeToken::MarkerInactive => "#FFFFFF",
        ThemeToken::MarkerBorder => "#000000",
        ThemeToken::ProgressTrack => "#000000",
        ThemeToken::ProgressFill => "#00C853",
        ThemeToken::TickActive => "#00C853",
        ThemeToken::TickInactive => "#D1D5DB",
        ThemeToken::MenuItemBackground => "#FFFFFF",
        ThemeToken::MenuItemActive => "#F9FFF7",
        ThemeToken::MenuItemHover => "#F9FAFB",
        ThemeToken::BlockHidden => "#F3F4F6",
        ThemeToken::BlockRevealed => "#FFFFFF",
    }
}

/// Resolve a token name as it appears in render-command JSON (e.g.
/// `"ProgressFill"`) to a CSS color.
#[wasm_bindgen(js_name = themeColor)]
pub fn theme_color(token: &str) -> Result<String, JsError> {
    let token: ThemeToken = serde_json::from_value(serde_json::Value::String(token.to_string()))
        .map_err(|_| JsError::new(&format!("unknown theme token: {token}")))?;
    Ok(css_color(token).to_string())
}
