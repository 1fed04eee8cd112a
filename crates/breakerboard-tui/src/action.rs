//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use breakerboard_core::{PanelConfig, StateSnapshot};

/// Which breaker zone a position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Main,
    Breakers,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A transient status-bar notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

#[allow(dead_code)]
impl Notification {
    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Resize(u16, u16),

    // ── Data events (from the data bridge) ─────────────────────────
    SnapshotUpdated(Arc<StateSnapshot>),
    PanelReloaded(Arc<PanelConfig>),
    SourceError(String),

    // ── Breaker interaction ────────────────────────────────────────
    /// Attempt a toggle on the breaker at (zone, index).
    ToggleBreaker(Zone, usize),
    /// Fire the reconnect action for the breaker at (zone, index).
    ReconnectBreaker(Zone, usize),

    // ── Selection (keyboard navigation) ────────────────────────────
    SelectNext,
    SelectPrev,
    ActivateSelected,
    ReconnectSelected,

    // ── Overlays / notifications ───────────────────────────────────
    ToggleHelp,
    Notify(Notification),
}
