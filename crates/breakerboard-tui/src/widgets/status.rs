//! Breaker handle indicator — ●/○/◌ with color mapping.

use breakerboard_core::BreakerView;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

/// Returns a styled `Span` with the handle dot for a breaker's state.
pub fn handle_span(view: &BreakerView) -> Span<'static> {
    let (symbol, color) = if view.empty {
        ("·", theme::DISABLED_TEXT)
    } else if view.unavailable {
        ("◌", theme::ERROR_RED)
    } else if view.on {
        ("●", theme::SUCCESS_GREEN)
    } else {
        ("○", theme::ERROR_RED)
    };
    Span::styled(symbol.to_owned(), Style::default().fg(color))
}

/// Returns the handle character without styling (for logs and tests).
pub fn handle_char(view: &BreakerView) -> &'static str {
    if view.empty {
        "·"
    } else if view.unavailable {
        "◌"
    } else if view.on {
        "●"
    } else {
        "○"
    }
}
