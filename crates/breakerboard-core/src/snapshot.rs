//! State snapshots and entity resolution.
//!
//! The host delivers telemetry as a flat mapping of entity id → raw state
//! plus attributes. [`StateSnapshot::resolve`] turns one reference into a
//! typed [`EntityReading`] with the degradation rules the panel relies on:
//! absence and parse failures never raise, they produce neutral readings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::EntityId;

/// Raw states that mean "this entity cannot be trusted right now".
const UNAVAILABLE_STATES: [&str; 2] = ["unavailable", "unknown"];

/// Unit assumed for power sensors that do not report one.
const DEFAULT_POWER_UNIT: &str = "W";

/// Attributes carried alongside a raw state. Only `unit_of_measurement`
/// participates in panel logic; everything else is passed through opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entity's entry in a snapshot, exactly as the host reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub state: String,

    #[serde(default)]
    pub attributes: Attributes,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Attributes::default(),
        }
    }

    pub fn with_unit(state: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Attributes {
                unit_of_measurement: Some(unit.into()),
                extra: serde_json::Map::new(),
            },
        }
    }
}

/// A full state snapshot: every entity the host currently knows about.
///
/// Snapshots are delivered serially and consumed within the tick that
/// delivered them — the core never caches one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot {
    entities: HashMap<EntityId, EntityState>,
}

/// A typed reading for one entity reference.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityReading {
    /// The reference resolved to an entry in the snapshot.
    pub present: bool,
    /// False when absent, `"unavailable"`, or `"unknown"`.
    pub available: bool,
    /// Raw state string, when present.
    pub state: Option<String>,
    /// Numeric coercion of the raw state; parse failures yield 0.0 so a
    /// garbled sensor displays as zero instead of failing the panel.
    pub value: f64,
    /// Reported unit, defaulting to watts when the attribute is absent.
    pub unit: String,
}

impl EntityReading {
    /// Reading for an absent or empty reference.
    fn missing() -> Self {
        Self {
            present: false,
            available: false,
            state: None,
            value: 0.0,
            unit: DEFAULT_POWER_UNIT.into(),
        }
    }

    /// Whether the raw state is the literal `"on"`.
    pub fn is_on(&self) -> bool {
        self.state.as_deref() == Some("on")
    }
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: EntityId, state: EntityState) {
        self.entities.insert(id, state);
    }

    pub fn get(&self, id: &EntityId) -> Option<&EntityState> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Resolve a (possibly absent) entity reference into a reading.
    ///
    /// `None`, empty ids, and ids missing from the snapshot all produce the
    /// same neutral reading: not present, not available, value 0.
    pub fn resolve(&self, reference: Option<&EntityId>) -> EntityReading {
        let Some(id) = reference.filter(|id| !id.is_empty()) else {
            return EntityReading::missing();
        };
        let Some(entry) = self.entities.get(id) else {
            return EntityReading::missing();
        };

        let available = !UNAVAILABLE_STATES.contains(&entry.state.as_str());
        let value = entry.state.trim().parse::<f64>().unwrap_or(0.0);
        let unit = entry
            .attributes
            .unit_of_measurement
            .clone()
            .unwrap_or_else(|| DEFAULT_POWER_UNIT.into());

        EntityReading {
            present: true,
            available,
            state: Some(entry.state.clone()),
            value,
            unit,
        }
    }
}

impl FromIterator<(EntityId, EntityState)> for StateSnapshot {
    fn from_iter<I: IntoIterator<Item = (EntityId, EntityState)>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn snapshot() -> StateSnapshot {
        [
            (
                EntityId::from("switch.a"),
                EntityState::new("on"),
            ),
            (
                EntityId::from("sensor.amps"),
                EntityState::with_unit("12.5", "A"),
            ),
            (
                EntityId::from("sensor.dead"),
                EntityState::new("unavailable"),
            ),
            (
                EntityId::from("sensor.lost"),
                EntityState::new("unknown"),
            ),
            (
                EntityId::from("sensor.garbled"),
                EntityState::new("not-a-number"),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn resolve_none_reference() {
        let reading = snapshot().resolve(None);
        assert!(!reading.present);
        assert!(!reading.available);
        assert_eq!(reading.value, 0.0);
    }

    #[test]
    fn resolve_empty_reference() {
        let id = EntityId::from("");
        let reading = snapshot().resolve(Some(&id));
        assert!(!reading.present);
        assert!(!reading.available);
    }

    #[test]
    fn resolve_missing_entity() {
        let id = EntityId::from("sensor.nope");
        let reading = snapshot().resolve(Some(&id));
        assert!(!reading.present);
        assert!(!reading.available);
    }

    #[test]
    fn resolve_numeric_with_unit() {
        let id = EntityId::from("sensor.amps");
        let reading = snapshot().resolve(Some(&id));
        assert!(reading.present);
        assert!(reading.available);
        assert_eq!(reading.value, 12.5);
        assert_eq!(reading.unit, "A");
    }

    #[test]
    fn unavailable_and_unknown_states() {
        let snap = snapshot();
        for name in ["sensor.dead", "sensor.lost"] {
            let id = EntityId::from(name);
            let reading = snap.resolve(Some(&id));
            assert!(reading.present, "{name} is in the snapshot");
            assert!(!reading.available, "{name} must not be available");
        }
    }

    #[test]
    fn parse_failure_degrades_to_zero() {
        let id = EntityId::from("sensor.garbled");
        let reading = snapshot().resolve(Some(&id));
        assert!(reading.available);
        assert_eq!(reading.value, 0.0);
    }

    #[test]
    fn unit_defaults_to_watts() {
        let id = EntityId::from("switch.a");
        let reading = snapshot().resolve(Some(&id));
        assert_eq!(reading.unit, "W");
        assert!(reading.is_on());
    }
}
