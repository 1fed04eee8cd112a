// ── Per-snapshot view model ──
//
// BreakerView is the evaluator's output: everything the renderer needs to
// draw one breaker, derived fresh from (config, snapshot) on every tick and
// discarded after the render pass. It is never mutated in place.

use serde::Serialize;

use super::entity::MacAddress;

/// Color tier for the current readout and the load bar.
///
/// The boundaries are strict: exactly 90% of rated current is still
/// `Warning`, exactly 75% is still `Normal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LoadTier {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl LoadTier {
    /// Classify a load percentage (current / rated * 100).
    pub fn for_percent(percent: f64) -> Self {
        if percent > 90.0 {
            Self::Critical
        } else if percent > 75.0 {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

/// Complete visual state of one breaker for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct BreakerView {
    pub name: Option<String>,

    pub on: bool,
    pub unavailable: bool,

    /// Amps from the current sensor, when one is configured.
    pub current_amps: Option<f64>,
    /// Volts from the voltage sensor, when one is configured.
    pub voltage_volts: Option<f64>,
    /// Pre-formatted power readout ("1500W", "0.500kW"), when a power
    /// sensor is configured.
    pub power: Option<String>,

    /// Load bar fill, clamped to 0–100. `None` suppresses the indicator.
    pub load_percent: Option<f64>,
    /// Tier for the current readout and load bar.
    pub tier: LoadTier,

    // Presentation hints passed through from configuration.
    pub dps: bool,
    pub double: bool,
    pub empty: bool,
    pub clickable: bool,
    /// Positional role: the first two main breakers are the phase breakers
    /// and get the highlighted styling.
    pub primary: bool,

    /// Set only while the breaker is unavailable and a MAC is configured —
    /// the renderer shows the reconnect control exactly then.
    pub reconnect_mac: Option<MacAddress>,
}

impl BreakerView {
    /// Placeholder view for a vacant slot. Skips every evaluation rule.
    pub fn placeholder(name: Option<String>) -> Self {
        Self {
            name,
            empty: true,
            ..Self::default()
        }
    }

    /// Whether the off-state override is in effect: informational text is
    /// muted and the load indicator pinned at zero. Unavailable styling
    /// takes precedence and uses its own presentation instead.
    pub fn dimmed(&self) -> bool {
        !self.on && !self.unavailable && !self.empty
    }

    /// Current readout as rendered ("12.3A").
    pub fn current_text(&self) -> Option<String> {
        self.current_amps.map(|a| format!("{a:.1}A"))
    }

    /// Voltage readout as rendered ("230V").
    pub fn voltage_text(&self) -> Option<String> {
        self.voltage_volts.map(|v| format!("{v:.0}V"))
    }
}
