//! Panel palette and semantic styling for the TUI.
//!
//! Hues follow the card's traditional scheme: green handles for closed
//! breakers, red for open or unreachable ones, amber for warning loads,
//! orange tinting for surge protection, blue highlights for the phase
//! breakers.

use breakerboard_core::LoadTier;
use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SUCCESS_GREEN: Color = Color::Rgb(67, 160, 71); // #43a047
pub const WARNING_AMBER: Color = Color::Rgb(255, 166, 0); // #ffa600
pub const ERROR_RED: Color = Color::Rgb(219, 68, 55); // #db4437
pub const DPS_ORANGE: Color = Color::Rgb(255, 152, 0); // #ff9800
pub const PHASE_BLUE: Color = Color::Rgb(33, 150, 243); // #2196f3

// ── Extended Palette ──────────────────────────────────────────────────

pub const PRIMARY_TEXT: Color = Color::Rgb(224, 224, 224); // #e0e0e0
pub const SECONDARY_TEXT: Color = Color::Rgb(158, 158, 158); // #9e9e9e
pub const DISABLED_TEXT: Color = Color::Rgb(117, 117, 117); // #757575
pub const BORDER_GRAY: Color = Color::Rgb(97, 97, 97); // #616161
pub const BG_DARK: Color = Color::Rgb(24, 24, 28); // #18181c

// ── Semantic Styles ───────────────────────────────────────────────────

/// Color for a load tier (current readout and load bar fill).
pub fn tier_color(tier: LoadTier) -> Color {
    match tier {
        LoadTier::Normal => SUCCESS_GREEN,
        LoadTier::Warning => WARNING_AMBER,
        LoadTier::Critical => ERROR_RED,
    }
}

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default()
        .fg(PRIMARY_TEXT)
        .add_modifier(Modifier::BOLD)
}

/// Border for the selected breaker cell.
pub fn border_selected() -> Style {
    Style::default().fg(PHASE_BLUE).add_modifier(Modifier::BOLD)
}

/// Border for an unselected breaker cell.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Informational label text ("Current", "Voltage", ...).
pub fn label_style() -> Style {
    Style::default().fg(SECONDARY_TEXT)
}

/// Informational value text under the off-state override.
pub fn disabled_value() -> Style {
    Style::default().fg(DISABLED_TEXT)
}

/// Styling for the DPS badge.
pub fn dps_badge() -> Style {
    Style::default().fg(DPS_ORANGE).add_modifier(Modifier::BOLD)
}

/// Styling for the unavailable message and border.
pub fn unavailable_style() -> Style {
    Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD)
}

/// Key hint text in the status bar and help overlay.
pub fn key_hint() -> Style {
    Style::default().fg(SECONDARY_TEXT)
}

/// Highlighted key in a key hint.
pub fn key_hint_key() -> Style {
    Style::default()
        .fg(PRIMARY_TEXT)
        .add_modifier(Modifier::BOLD)
}
