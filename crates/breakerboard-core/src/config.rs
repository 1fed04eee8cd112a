//! Raw configuration → [`PanelConfig`] normalization.
//!
//! Deliberately forgiving: the single hard requirement is a `breakers`
//! sequence. Titles, column counts, and the main-breaker zone all default,
//! and a breaker referencing a nonexistent entity is not a configuration
//! error — it shows up as unavailable once snapshots arrive.

use serde_json::Value;

use crate::error::ConfigError;
use crate::model::{BreakerConfig, DEFAULT_COLUMNS, DEFAULT_TITLE, PanelConfig};

impl PanelConfig {
    /// Normalize a raw configuration value (already parsed from YAML/JSON
    /// by the surrounding layer) into a panel.
    ///
    /// Fails only when `breakers` is missing or not a sequence, or when a
    /// present field cannot be coerced into its breaker shape.
    pub fn from_value(raw: &Value) -> Result<Self, ConfigError> {
        let breakers = raw
            .get("breakers")
            .filter(|v| v.is_array())
            .ok_or(ConfigError::MissingBreakers)?;
        let breakers: Vec<BreakerConfig> = serde_json::from_value(breakers.clone())?;

        let main_breakers: Vec<BreakerConfig> = match raw.get("main_breakers") {
            Some(v) => serde_json::from_value(v.clone())?,
            None => Vec::new(),
        };

        let title = raw
            .get("title")
            .and_then(Value::as_str)
            .map_or_else(|| DEFAULT_TITLE.to_owned(), str::to_owned);

        // A configured 0 falls back to the default, like the absent case.
        let columns = raw
            .get("columns")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .filter(|c| *c >= 1)
            .unwrap_or(DEFAULT_COLUMNS);

        Ok(Self {
            title,
            columns,
            main_breakers,
            breakers,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::ConfigError;
    use crate::model::EntityId;

    #[test]
    fn missing_breakers_is_fatal() {
        let raw = json!({ "title": "Garage" });
        let err = PanelConfig::from_value(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBreakers));
    }

    #[test]
    fn non_sequence_breakers_is_fatal() {
        let raw = json!({ "breakers": "oops" });
        let err = PanelConfig::from_value(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBreakers));
    }

    #[test]
    fn everything_else_defaults() {
        let raw = json!({ "breakers": [] });
        let panel = PanelConfig::from_value(&raw).unwrap();
        assert_eq!(panel.title, DEFAULT_TITLE);
        assert_eq!(panel.columns, 2);
        assert!(panel.main_breakers.is_empty());
    }

    #[test]
    fn zero_columns_falls_back_to_default() {
        let raw = json!({ "breakers": [], "columns": 0 });
        let panel = PanelConfig::from_value(&raw).unwrap();
        assert_eq!(panel.columns, 2);
    }

    #[test]
    fn full_configuration_parses() {
        let raw = json!({
            "title": "Main Panel",
            "columns": 3,
            "main_breakers": [
                { "name": "Phase A", "switch": "switch.phase_a" },
                { "name": "Phase B", "switch": "switch.phase_b" },
            ],
            "breakers": [
                {
                    "name": "Kitchen",
                    "switch": "switch.kitchen",
                    "current_entity": "sensor.kitchen_amps",
                    "voltage_entity": "sensor.kitchen_volts",
                    "power_entity": "sensor.kitchen_power",
                    "max_current": 20,
                    "mac": "AA-BB-CC-00-11-22",
                },
                { "name": "Heater", "switch": "switch.heater", "double": true },
                { "dps": true },
                { "empty": true },
            ],
        });

        let panel = PanelConfig::from_value(&raw).unwrap();
        assert_eq!(panel.title, "Main Panel");
        assert_eq!(panel.columns, 3);
        assert_eq!(panel.main_breakers.len(), 2);
        assert_eq!(panel.breakers.len(), 4);

        let kitchen = &panel.breakers[0];
        assert_eq!(
            kitchen.switch_ref(),
            Some(&EntityId::from("switch.kitchen"))
        );
        assert_eq!(kitchen.max_current, Some(20.0));
        assert_eq!(
            kitchen.mac.as_ref().map(|m| m.as_str().to_owned()),
            Some("aa:bb:cc:00:11:22".to_owned())
        );
        assert!(panel.breakers[1].double);
        assert!(panel.breakers[2].dps);
        assert!(panel.breakers[3].empty);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = json!({
            "breakers": [{ "name": "A", "theme": "legacy" }],
            "type": "custom:breakerboard-panel",
        });
        let panel = PanelConfig::from_value(&raw).unwrap();
        assert_eq!(panel.breakers[0].name.as_deref(), Some("A"));
    }
}
