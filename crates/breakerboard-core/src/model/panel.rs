// ── Panel configuration types ──

use serde::{Deserialize, Serialize};

use super::entity::{EntityId, MacAddress};

/// Default panel title when the configuration does not name one.
pub const DEFAULT_TITLE: &str = "Distribution Panel";
/// Default number of grid columns in the breaker zone.
pub const DEFAULT_COLUMNS: u16 = 2;

/// Static description of a single breaker position.
///
/// All fields are optional; an `empty` breaker carries no refs and renders
/// as a placeholder slot. A breaker with a `mac` but no `switch` is never
/// toggled but can still offer a reconnect action while unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Switch entity controlling (and reporting) the breaker state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<EntityId>,

    /// Current sensor (amps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_entity: Option<EntityId>,

    /// Voltage sensor (volts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_entity: Option<EntityId>,

    /// Power sensor (watts or kilowatts, inferred at evaluation time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_entity: Option<EntityId>,

    /// Rated current in amps; enables the load indicator and color tiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_current: Option<f64>,

    /// Surge protection device — badge and tinted styling, no toggle logic.
    #[serde(default)]
    pub dps: bool,

    /// Double-width breaker: spans two rows and counts as two width units.
    #[serde(default)]
    pub double: bool,

    /// Vacant slot rendered as a dashed placeholder.
    #[serde(default)]
    pub empty: bool,

    /// Network MAC of the metering device, for the reconnect action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<MacAddress>,
}

/// Treat `switch: ""` and friends the same as an absent reference.
fn active(reference: Option<&EntityId>) -> Option<&EntityId> {
    reference.filter(|id| !id.is_empty())
}

impl BreakerConfig {
    pub fn switch_ref(&self) -> Option<&EntityId> {
        active(self.switch.as_ref())
    }

    pub fn current_ref(&self) -> Option<&EntityId> {
        active(self.current_entity.as_ref())
    }

    pub fn voltage_ref(&self) -> Option<&EntityId> {
        active(self.voltage_entity.as_ref())
    }

    pub fn power_ref(&self) -> Option<&EntityId> {
        active(self.power_entity.as_ref())
    }

    /// Whether a click on this breaker should attempt a toggle.
    pub fn is_clickable(&self) -> bool {
        !self.empty && self.switch_ref().is_some()
    }

    /// Grid width units this breaker occupies (`double` spans two).
    pub fn width_units(&self) -> u32 {
        if self.double { 2 } else { 1 }
    }
}

/// The full panel: two disjoint zones of breakers plus layout settings.
///
/// Order within each zone is display order and must be preserved across
/// re-renders — views are correlated to positions by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub title: String,
    pub columns: u16,
    pub main_breakers: Vec<BreakerConfig>,
    pub breakers: Vec<BreakerConfig>,
}

impl PanelConfig {
    /// Host sizing hint: rows the card occupies in the dashboard grid.
    ///
    /// Two rows for the main-breaker zone when present, one per grid row of
    /// the breaker zone (`double` breakers count twice), plus one for the
    /// header.
    pub fn card_size(&self) -> u32 {
        let mains = if self.main_breakers.is_empty() { 0 } else { 2 };
        let units: u32 = self.breakers.iter().map(BreakerConfig::width_units).sum();
        mains + units.div_ceil(u32::from(self.columns.max(1))) + 1
    }
}
