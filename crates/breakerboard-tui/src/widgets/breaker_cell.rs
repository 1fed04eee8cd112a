//! Rendering of a single breaker cell.
//!
//! A cell is a bordered box: handle + name (+ DPS badge) in the title,
//! readouts and the load bar inside. Unavailable cells swap the readout
//! line for an error message and, when a MAC is configured, a reconnect
//! control whose rect is reported back for mouse hit-testing.

use breakerboard_core::BreakerView;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::theme;
use crate::widgets::status;

/// Render one breaker into `area`. Returns the rect of the reconnect
/// control when one is shown, so the screen can route clicks to it
/// without also triggering the cell's toggle.
pub fn render(view: &BreakerView, selected: bool, frame: &mut Frame, area: Rect) -> Option<Rect> {
    if area.width < 4 || area.height < 2 {
        return None;
    }

    if view.empty {
        render_placeholder(view, frame, area);
        return None;
    }

    let border_style = if selected {
        theme::border_selected()
    } else if view.unavailable {
        theme::unavailable_style()
    } else if view.dps {
        Style::default().fg(theme::DPS_ORANGE)
    } else if view.primary {
        Style::default().fg(theme::PHASE_BLUE)
    } else {
        theme::border_default()
    };

    let mut title_spans = vec![
        Span::raw(" "),
        status::handle_span(view),
        Span::raw(" "),
        Span::styled(view.name.clone().unwrap_or_default(), theme::title_style()),
    ];
    if view.dps {
        title_spans.push(Span::raw(" "));
        title_spans.push(Span::styled("DPS", theme::dps_badge()));
    }
    title_spans.push(Span::raw(" "));

    let block = Block::default()
        .title(Line::from(title_spans))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return None;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut reconnect_row: Option<u16> = None;

    if view.unavailable {
        lines.push(Line::from(Span::styled(
            " device unavailable",
            theme::unavailable_style(),
        )));
        if view.reconnect_mac.is_some() {
            reconnect_row = Some(u16::try_from(lines.len()).unwrap_or(u16::MAX));
            lines.push(Line::from(vec![
                Span::raw(" "),
                Span::styled("[↻ reconnect]", theme::key_hint_key()),
            ]));
        }
    } else {
        lines.push(readout_line(view));
    }

    let load_row = load_gauge_row(view, &lines);
    frame.render_widget(Paragraph::new(lines), inner);

    // The load bar renders as its own widget below the text lines.
    if let Some((row, percent)) = load_row {
        if row < inner.height {
            let gauge_area = Rect::new(
                inner.x + 1,
                inner.y + row,
                inner.width.saturating_sub(2),
                1,
            );
            let color = if view.dimmed() {
                theme::DISABLED_TEXT
            } else {
                theme::tier_color(view.tier)
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let label = format!("{}%", percent.round() as u16);
            let gauge = Gauge::default()
                .ratio(percent / 100.0)
                .gauge_style(Style::default().fg(color).bg(theme::BG_DARK))
                .label(Span::styled(label, Style::default().fg(theme::PRIMARY_TEXT)));
            frame.render_widget(gauge, gauge_area);
        }
    }

    reconnect_row.and_then(|row| {
        (row < inner.height).then(|| Rect::new(inner.x, inner.y + row, inner.width, 1))
    })
}

/// Readout line: current (tier-colored), voltage, power.
fn readout_line(view: &BreakerView) -> Line<'static> {
    let value_style = |tiered: bool| {
        if view.dimmed() {
            theme::disabled_value()
        } else if tiered {
            Style::default().fg(theme::tier_color(view.tier))
        } else {
            Style::default().fg(theme::PRIMARY_TEXT)
        }
    };

    let mut spans = Vec::new();
    if let Some(current) = view.current_text() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(current, value_style(true)));
    }
    if let Some(voltage) = view.voltage_text() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(voltage, value_style(false)));
    }
    if let Some(power) = view.power.clone() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(power, value_style(false)));
    }
    if spans.is_empty() {
        spans.push(Span::styled(" (no sensors)", theme::label_style()));
    }
    Line::from(spans)
}

/// Where the load bar goes (row inside the inner area) and its fill.
fn load_gauge_row(view: &BreakerView, lines: &[Line]) -> Option<(u16, f64)> {
    let percent = view.load_percent?;
    let row = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    Some((row, percent.clamp(0.0, 100.0)))
}

fn render_placeholder(view: &BreakerView, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(theme::DISABLED_TEXT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let name = view.name.clone().unwrap_or_else(|| "No connection".into());
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(name, theme::disabled_value())))
            .centered(),
        inner,
    );
}
