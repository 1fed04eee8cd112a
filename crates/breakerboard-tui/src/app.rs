//! Application core — event loop, action dispatch, status bar.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use breakerboard_core::{
    PanelConfig, ServiceMap, StateSnapshot, reconnect_command, toggle_command,
};

use crate::action::{Action, Notification, NotificationLevel, Zone};
use crate::component::Component;
use crate::data_bridge::{self, SnapshotSource};
use crate::event::{Event, EventReader};
use crate::screens::PanelScreen;
use crate::theme;
use crate::tui::Tui;

/// How long a notification stays in the status bar.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Top-level application state and event loop.
pub struct App {
    panel: Arc<PanelConfig>,
    /// Path the panel was loaded from, for the `R` reload binding.
    panel_path: Option<PathBuf>,
    services: ServiceMap,
    source: SnapshotSource,
    poll_interval: Duration,

    screen: PanelScreen,

    /// Latest snapshot, kept for dispatch-time availability checks.
    snapshot: Arc<StateSnapshot>,
    last_snapshot_at: Option<Instant>,
    source_error: Option<String>,
    notification: Option<(Notification, Instant)>,
    help_visible: bool,
    running: bool,

    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    outbox_tx: mpsc::UnboundedSender<breakerboard_core::ServiceCall>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(
        panel: PanelConfig,
        panel_path: Option<PathBuf>,
        services: ServiceMap,
        source: SnapshotSource,
        outbox: Option<PathBuf>,
        poll_interval: Duration,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let outbox_tx = data_bridge::spawn_outbox(outbox, cancel.clone());
        let panel = Arc::new(panel);

        Self {
            screen: PanelScreen::new(Arc::clone(&panel)),
            panel,
            panel_path,
            services,
            source,
            poll_interval,
            snapshot: Arc::new(StateSnapshot::new()),
            last_snapshot_at: None,
            source_error: None,
            notification: None,
            help_visible: false,
            running: true,
            action_tx,
            action_rx,
            outbox_tx,
            cancel,
        }
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        data_bridge::spawn_snapshot_feed(
            self.source.clone(),
            Arc::clone(&self.panel),
            self.poll_interval,
            self.action_tx.clone(),
            self.cancel.clone(),
        );

        let mut events = EventReader::new(Duration::from_millis(200));
        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
            }

            // Drain and process all queued actions, then draw once.
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
            }
            tui.draw(|frame| self.render(frame))?;
        }

        events.stop();
        self.cancel.cancel();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// everything else is delegated to the panel screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            // In help mode, Esc or ? closes help.
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::SHIFT, KeyCode::Char('R')) => {
                self.reload_panel();
                return Ok(None);
            }

            _ => {}
        }

        self.screen.handle_key_event(key)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return Ok(None);
        }
        self.screen.handle_mouse_event(mouse)
    }

    /// Process a single action — update app state and propagate to the screen.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Tick => {
                if let Some((_, shown_at)) = &self.notification {
                    if shown_at.elapsed() > NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
            }

            Action::SnapshotUpdated(snapshot) => {
                self.snapshot = Arc::clone(snapshot);
                self.last_snapshot_at = Some(Instant::now());
                self.source_error = None;
                self.screen.update(action)?;
            }

            Action::PanelReloaded(panel) => {
                self.panel = Arc::clone(panel);
                self.screen.update(action)?;
            }

            Action::SourceError(reason) => {
                self.source_error = Some(reason.clone());
            }

            Action::ToggleBreaker(zone, index) => self.dispatch_toggle(*zone, *index),
            Action::ReconnectBreaker(zone, index) => self.dispatch_reconnect(*zone, *index),

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            // Resize is absorbed here; the screen re-derives geometry on
            // the next render pass.
            Action::Resize(..) => {}

            // Propagate everything else to the screen; follow-ups loop back.
            other => {
                if let Some(follow_up) = self.screen.update(other)? {
                    self.action_tx.send(follow_up)?;
                }
            }
        }

        Ok(())
    }

    fn breaker_at(&self, zone: Zone, index: usize) -> Option<&breakerboard_core::BreakerConfig> {
        match zone {
            Zone::Main => self.panel.main_breakers.get(index),
            Zone::Breakers => self.panel.breakers.get(index),
        }
    }

    /// Toggle dispatch with the availability gate: a request against an
    /// unavailable switch is silently dropped.
    fn dispatch_toggle(&mut self, zone: Zone, index: usize) {
        let Some(entity_id) = self.breaker_at(zone, index).and_then(|b| b.switch_ref()) else {
            return;
        };
        match toggle_command(&self.snapshot, entity_id) {
            Some(command) => {
                let call = self.services.render(&command);
                debug!(domain = %call.domain, service = %call.service, "toggle dispatched");
                let _ = self.outbox_tx.send(call);
            }
            None => {
                debug!(entity = %entity_id, "toggle dropped: switch unavailable");
            }
        }
    }

    /// Reconnect dispatch — fire-and-forget, no precondition.
    fn dispatch_reconnect(&mut self, zone: Zone, index: usize) {
        let Some(mac) = self.breaker_at(zone, index).and_then(|b| b.mac.clone()) else {
            return;
        };
        let call = self.services.render(&reconnect_command(&mac));
        let _ = self.outbox_tx.send(call);
        self.notification = Some((
            Notification::info(format!("reconnect requested for {mac}")),
            Instant::now(),
        ));
    }

    /// Reload the panel definition file, if one was given.
    fn reload_panel(&mut self) {
        let Some(path) = self.panel_path.clone() else {
            return;
        };
        match breakerboard_config::load_panel_file(&path) {
            Ok(panel) => {
                let _ = self
                    .action_tx
                    .send(Action::PanelReloaded(Arc::new(panel)));
                let _ = self.action_tx.send(Action::Notify(Notification::info(
                    "panel configuration reloaded",
                )));
            }
            Err(e) => {
                let _ = self
                    .action_tx
                    .send(Action::Notify(Notification::error(format!(
                        "panel reload failed: {e}"
                    ))));
            }
        }
    }

    /// Format the data age for the status bar.
    fn snapshot_age_str(&self) -> String {
        match self.last_snapshot_at {
            Some(t) => {
                let secs = t.elapsed().as_secs();
                if secs < 5 {
                    "just now".into()
                } else if secs < 60 {
                    format!("{secs}s ago")
                } else {
                    format!("{}m ago", secs / 60)
                }
            }
            None => "no data".into(),
        }
    }

    /// Render the full application frame.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Panel content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    /// Render the bottom status bar with source status and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let source_indicator = if let Some(reason) = &self.source_error {
            Span::styled(
                format!("○ source error: {reason}"),
                Style::default().fg(theme::ERROR_RED),
            )
        } else {
            let label = match &self.source {
                SnapshotSource::Demo => "demo feed".to_owned(),
                SnapshotSource::File(path) => path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |n| {
                        n.to_string_lossy().into_owned()
                    }),
            };
            Span::styled(
                format!("● {label} · {}", self.snapshot_age_str()),
                Style::default().fg(theme::SUCCESS_GREEN),
            )
        };

        let middle = match &self.notification {
            Some((notification, _)) => {
                let color = match notification.level {
                    NotificationLevel::Info => theme::PRIMARY_TEXT,
                    NotificationLevel::Warning => theme::WARNING_AMBER,
                    NotificationLevel::Error => theme::ERROR_RED,
                };
                Span::styled(
                    format!(" │ {}", notification.message),
                    Style::default().fg(color),
                )
            }
            None => Span::styled(
                " │ ↑↓ select  ⏎ toggle  r reconnect  R reload  ? help  q quit",
                theme::key_hint(),
            ),
        };

        let line = Line::from(vec![Span::raw(" "), source_indicator, middle]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 48u16.min(area.width.saturating_sub(4));
        let help_height = 14u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_selected());
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |key: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(text, theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            entry("↑↓ ←→ hjkl", "Move selection"),
            entry("Enter / t", "Toggle selected breaker"),
            entry("r", "Reconnect selected (when unavailable)"),
            entry("R", "Reload panel configuration"),
            entry("mouse", "Click a breaker to toggle it"),
            Line::from(""),
            entry("?", "This help"),
            entry("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "                 Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
