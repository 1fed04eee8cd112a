//! Panel screen — the distribution panel itself.
//!
//! Two zones: the main-breaker row on top, then the breaker grid laid out
//! in the configured column count. Geometry is derived from configuration
//! order and correlated to views by positional index; snapshot ticks only
//! replace the view models, so selection and interaction wiring survive
//! between ticks. A configuration reload rebuilds everything.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders};

use breakerboard_core::{BreakerView, PanelConfig, PanelView, StateSnapshot, evaluate_panel};

use crate::action::{Action, Zone};
use crate::component::Component;
use crate::theme;
use crate::widgets::breaker_cell;

/// Height of one grid cell in terminal rows (border included).
const CELL_HEIGHT: u16 = 5;
/// Height of a main-breaker cell.
const MAIN_HEIGHT: u16 = 6;

/// One positioned breaker cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    zone: Zone,
    index: usize,
    rect: Rect,
}

pub struct PanelScreen {
    panel: Arc<PanelConfig>,
    view: PanelView,
    /// Flat selection index over `cells` (mains first, then breakers).
    selected: Option<usize>,
    /// Layout cache from the last render, used for mouse hit-testing.
    cells: Vec<Cell>,
    /// Reconnect-control rects from the last render, checked before the
    /// cell rects so a reconnect click never also toggles.
    reconnect_rects: Vec<(Zone, usize, Rect)>,
}

impl PanelScreen {
    pub fn new(panel: Arc<PanelConfig>) -> Self {
        let view = evaluate_panel(&panel, &StateSnapshot::new());
        Self {
            panel,
            view,
            selected: None,
            cells: Vec::new(),
            reconnect_rects: Vec::new(),
        }
    }

    fn view_at(&self, zone: Zone, index: usize) -> Option<&BreakerView> {
        match zone {
            Zone::Main => self.view.main_breakers.get(index),
            Zone::Breakers => self.view.breakers.get(index),
        }
    }

    fn selected_cell(&self) -> Option<Cell> {
        self.selected.and_then(|i| self.cells.get(i)).copied()
    }

    /// Move the selection by one cell, skipping placeholders.
    fn move_selection(&mut self, delta: isize) {
        if self.cells.is_empty() {
            self.selected = None;
            return;
        }
        #[allow(clippy::cast_possible_wrap)]
        let len = self.cells.len() as isize;
        // Starting off-grid means the first SelectNext lands on cell 0.
        #[allow(clippy::cast_possible_wrap)]
        let mut position = self
            .selected
            .map_or(if delta > 0 { -1 } else { 0 }, |i| i as isize);
        for _ in 0..len {
            position = (position + delta).rem_euclid(len);
            #[allow(clippy::cast_sign_loss)]
            let candidate = position as usize;
            let cell = self.cells[candidate];
            if self
                .view_at(cell.zone, cell.index)
                .is_some_and(|v| !v.empty)
            {
                self.selected = Some(candidate);
                return;
            }
        }
        self.selected = None;
    }

    /// Toggle request for the selected breaker, if it is clickable.
    fn activate_selected(&self) -> Option<Action> {
        let cell = self.selected_cell()?;
        let view = self.view_at(cell.zone, cell.index)?;
        view.clickable
            .then_some(Action::ToggleBreaker(cell.zone, cell.index))
    }

    /// Reconnect request for the selected breaker, if one is offered.
    fn reconnect_selected(&self) -> Option<Action> {
        let cell = self.selected_cell()?;
        let view = self.view_at(cell.zone, cell.index)?;
        view.reconnect_mac
            .is_some()
            .then_some(Action::ReconnectBreaker(cell.zone, cell.index))
    }

    fn hit_test(&mut self, column: u16, row: u16) -> Option<Action> {
        // Reconnect controls are checked first: a click there must not
        // propagate to the surrounding cell's toggle.
        for (zone, index, rect) in &self.reconnect_rects {
            if contains(*rect, column, row) {
                return Some(Action::ReconnectBreaker(*zone, *index));
            }
        }

        for (position, cell) in self.cells.iter().enumerate() {
            if contains(cell.rect, column, row) {
                let view = self.view_at(cell.zone, cell.index)?;
                if view.empty {
                    return None;
                }
                let clickable = view.clickable;
                self.selected = Some(position);
                return clickable
                    .then_some(Action::ToggleBreaker(cell.zone, cell.index));
            }
        }
        None
    }
}

impl Component for PanelScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j' | 'l') => {
                Some(Action::SelectNext)
            }
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k' | 'h') => Some(Action::SelectPrev),
            KeyCode::Enter | KeyCode::Char(' ' | 't') => Some(Action::ActivateSelected),
            KeyCode::Char('r') => Some(Action::ReconnectSelected),
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            return Ok(self.hit_test(mouse.column, mouse.row));
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SnapshotUpdated(snapshot) => {
                // Value patch: views are replaced in configuration order,
                // geometry and selection stay put.
                self.view = evaluate_panel(&self.panel, snapshot);
            }
            Action::PanelReloaded(panel) => {
                // Full rebuild: new zones, new geometry, selection reset.
                self.panel = Arc::clone(panel);
                self.view = evaluate_panel(&self.panel, &StateSnapshot::new());
                self.selected = None;
                self.cells.clear();
                self.reconnect_rects.clear();
            }
            Action::SelectNext => self.move_selection(1),
            Action::SelectPrev => self.move_selection(-1),
            Action::ActivateSelected => return Ok(self.activate_selected()),
            Action::ReconnectSelected => return Ok(self.reconnect_selected()),
            _ => {}
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(self.panel.title.clone(), theme::title_style()),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.cells = layout_cells(inner, &self.panel);
        self.reconnect_rects.clear();

        for (position, cell) in self.cells.clone().into_iter().enumerate() {
            let Some(view) = self.view_at(cell.zone, cell.index).cloned() else {
                continue;
            };
            let selected = self.selected == Some(position);
            if let Some(rect) = breaker_cell::render(&view, selected, frame, cell.rect) {
                self.reconnect_rects.push((cell.zone, cell.index, rect));
            }
        }
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x + rect.width
        && row >= rect.y
        && row < rect.y + rect.height
}

/// Compute cell geometry for both zones inside `area`.
///
/// Mains share one full-width row; breakers fill a `columns`-wide grid in
/// configuration order, with `double` breakers spanning two rows. Cells
/// that would overflow the area are dropped (the terminal is too small to
/// show them; nothing is scrolled).
fn layout_cells(area: Rect, panel: &PanelConfig) -> Vec<Cell> {
    let mut cells = Vec::new();
    if area.width < 8 || area.height < CELL_HEIGHT {
        return cells;
    }

    let mut y = area.y;

    if !panel.main_breakers.is_empty() {
        let count = u16::try_from(panel.main_breakers.len()).unwrap_or(u16::MAX);
        let width = area.width / count.max(1);
        if y + MAIN_HEIGHT <= area.y + area.height {
            for (index, _) in panel.main_breakers.iter().enumerate() {
                let column = u16::try_from(index).unwrap_or(u16::MAX);
                cells.push(Cell {
                    zone: Zone::Main,
                    index,
                    rect: Rect::new(area.x + column * width, y, width, MAIN_HEIGHT),
                });
            }
        }
        y += MAIN_HEIGHT;
    }

    let columns = usize::from(panel.columns.max(1));
    let spans: Vec<usize> = panel
        .breakers
        .iter()
        .map(|b| if b.double { 2 } else { 1 })
        .collect();
    let width = area.width / u16::try_from(columns).unwrap_or(1).max(1);

    for (index, (row, column)) in place_grid(&spans, columns).into_iter().enumerate() {
        let height = CELL_HEIGHT * u16::try_from(spans[index]).unwrap_or(1);
        let rect = Rect::new(
            area.x + u16::try_from(column).unwrap_or(u16::MAX) * width,
            y + u16::try_from(row).unwrap_or(u16::MAX) * CELL_HEIGHT,
            width,
            height,
        );
        if rect.y + rect.height <= area.y + area.height {
            cells.push(Cell {
                zone: Zone::Breakers,
                index,
                rect,
            });
        }
    }

    cells
}

/// Row-major auto-placement with row spans, the way a CSS grid places the
/// original card's cells: each item takes the first free slot scanning
/// left-to-right, top-to-bottom; a spanning item also claims the cell(s)
/// below it in the same column.
fn place_grid(spans: &[usize], columns: usize) -> Vec<(usize, usize)> {
    fn ensure_rows(grid: &mut Vec<Vec<bool>>, rows: usize, columns: usize) {
        while grid.len() < rows {
            grid.push(vec![false; columns]);
        }
    }

    let columns = columns.max(1);
    let mut occupied: Vec<Vec<bool>> = Vec::new();
    let mut positions = Vec::with_capacity(spans.len());

    for &span in spans {
        let mut placed = None;
        let mut row = 0;
        while placed.is_none() {
            ensure_rows(&mut occupied, row + span, columns);
            for column in 0..columns {
                let free = (row..row + span).all(|r| !occupied[r][column]);
                if free {
                    for r in row..row + span {
                        occupied[r][column] = true;
                    }
                    placed = Some((row, column));
                    break;
                }
            }
            row += 1;
        }
        // Loop always terminates: new rows are always free.
        positions.push(placed.unwrap_or((0, 0)));
    }

    positions
}
