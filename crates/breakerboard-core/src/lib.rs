//! State-derivation core for the breakerboard distribution panel.
//!
//! This crate owns the portable logic between a host automation runtime
//! and the panel renderer:
//!
//! - **Domain model** ([`model`]) — [`PanelConfig`]/[`BreakerConfig`] (the
//!   static panel description), [`BreakerView`] (the per-snapshot view
//!   model), and the identity types [`EntityId`] / [`MacAddress`].
//!
//! - **[`config`]** — normalizes a raw configuration value into a
//!   [`PanelConfig`]. The only hard failure is a missing `breakers` list;
//!   everything else defaults, and bad entity references degrade to
//!   unavailable readings at evaluation time.
//!
//! - **[`snapshot`]** — [`StateSnapshot`], the flat entity-id → state
//!   mapping delivered by the host, and
//!   [`resolve`](snapshot::StateSnapshot::resolve) which turns a reference
//!   into a typed [`EntityReading`](snapshot::EntityReading).
//!
//! - **[`evaluate`]** — the pure evaluator mapping (breaker, snapshot) →
//!   [`BreakerView`]. Re-run on every snapshot tick; never errors, never
//!   holds state.
//!
//! - **[`command`]** — outbound [`PanelCommand`]s (toggle / reconnect),
//!   the availability gate that silently drops toggles against unavailable
//!   switches, and the [`ServiceMap`] that renders commands into
//!   host-specific service calls.
//!
//! The crate is synchronous and I/O-free; renderers and host bridges live
//! in `breakerboard-tui`.

pub mod command;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{PanelCommand, ServiceCall, ServiceMap, reconnect_command, toggle_command};
pub use error::ConfigError;
pub use evaluate::{PanelView, evaluate, evaluate_panel, format_power};
pub use snapshot::{EntityReading, EntityState, StateSnapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{BreakerConfig, BreakerView, EntityId, LoadTier, MacAddress, PanelConfig};

/// Card-picker registration metadata, consumed once by the surrounding
/// integration layer. Not used anywhere inside the core.
pub const CARD_TYPE: &str = "breakerboard-panel";
/// Human-readable card name for picker listings.
pub const CARD_NAME: &str = "Distribution Panel";
/// One-line card description for picker listings.
pub const CARD_DESCRIPTION: &str =
    "Visual electrical distribution panel with live breaker monitoring.";
