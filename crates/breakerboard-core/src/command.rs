//! Outbound commands and the dispatch precondition gate.
//!
//! The panel makes exactly two kinds of calls against the host: toggling a
//! breaker's switch and asking the network integration to reconnect a
//! metering device. Commands are plain data; the host bridge serializes
//! them into service calls and forwards them fire-and-forget — no awaited
//! completion, no retry. The next snapshot reports whatever actually
//! happened.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{EntityId, MacAddress};
use crate::snapshot::StateSnapshot;

/// A mutation request produced by user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Flip a breaker's switch to the opposite of its current state.
    ToggleSwitch { entity_id: EntityId, turn_on: bool },
    /// Ask the integration to reconnect the device with this MAC.
    ReconnectClient { mac: MacAddress },
}

/// Build a toggle for `entity_id`, reading its current state from the
/// snapshot to pick the direction.
///
/// Returns `None` when the switch is absent or unavailable: the host would
/// reject the call anyway, so the request is silently dropped rather than
/// surfaced as an error.
pub fn toggle_command(snapshot: &StateSnapshot, entity_id: &EntityId) -> Option<PanelCommand> {
    let reading = snapshot.resolve(Some(entity_id));
    if !reading.available {
        debug!(entity = %entity_id, "dropping toggle against unavailable switch");
        return None;
    }

    Some(PanelCommand::ToggleSwitch {
        entity_id: entity_id.clone(),
        turn_on: !reading.is_on(),
    })
}

/// Build a reconnect request. No precondition: reconnecting is always a
/// legitimate ask for a device we consider unreachable.
pub fn reconnect_command(mac: &MacAddress) -> PanelCommand {
    PanelCommand::ReconnectClient { mac: mac.clone() }
}

/// Host-specific service names. The portable contract is "toggle" and
/// "reconnect"; which domain/service implements each belongs to deployment
/// configuration, with defaults matching the reference integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceMap {
    pub switch_domain: String,
    pub turn_on: String,
    pub turn_off: String,
    pub reconnect_domain: String,
    pub reconnect_service: String,
}

impl Default for ServiceMap {
    fn default() -> Self {
        Self {
            switch_domain: "switch".into(),
            turn_on: "turn_on".into(),
            turn_off: "turn_off".into(),
            reconnect_domain: "tplink_omada".into(),
            reconnect_service: "reconnect_client".into(),
        }
    }
}

/// A rendered service call, ready for the host transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub data: serde_json::Value,
}

impl ServiceMap {
    /// Render a command into the host's service-call shape.
    pub fn render(&self, command: &PanelCommand) -> ServiceCall {
        match command {
            PanelCommand::ToggleSwitch { entity_id, turn_on } => ServiceCall {
                domain: self.switch_domain.clone(),
                service: if *turn_on {
                    self.turn_on.clone()
                } else {
                    self.turn_off.clone()
                },
                data: serde_json::json!({ "entity_id": entity_id }),
            },
            PanelCommand::ReconnectClient { mac } => ServiceCall {
                domain: self.reconnect_domain.clone(),
                service: self.reconnect_service.clone(),
                data: serde_json::json!({ "mac": mac }),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::snapshot::EntityState;

    fn snapshot_with(id: &str, state: &str) -> StateSnapshot {
        [(EntityId::from(id), EntityState::new(state))]
            .into_iter()
            .collect()
    }

    #[test]
    fn toggle_picks_the_opposite_direction() {
        let id = EntityId::from("switch.kitchen");

        let on = snapshot_with("switch.kitchen", "on");
        assert_eq!(
            toggle_command(&on, &id),
            Some(PanelCommand::ToggleSwitch {
                entity_id: id.clone(),
                turn_on: false,
            })
        );

        let off = snapshot_with("switch.kitchen", "off");
        assert_eq!(
            toggle_command(&off, &id),
            Some(PanelCommand::ToggleSwitch {
                entity_id: id.clone(),
                turn_on: true,
            })
        );
    }

    #[test]
    fn toggle_is_dropped_for_unavailable_switch() {
        let id = EntityId::from("switch.kitchen");
        for state in ["unavailable", "unknown"] {
            let snap = snapshot_with("switch.kitchen", state);
            assert_eq!(toggle_command(&snap, &id), None, "state {state}");
        }
    }

    #[test]
    fn toggle_is_dropped_for_missing_switch() {
        let id = EntityId::from("switch.kitchen");
        assert_eq!(toggle_command(&StateSnapshot::new(), &id), None);
    }

    #[test]
    fn reconnect_has_no_precondition() {
        let mac = MacAddress::new("AA:BB:CC:DD:EE:FF");
        assert_eq!(
            reconnect_command(&mac),
            PanelCommand::ReconnectClient { mac }
        );
    }

    #[test]
    fn service_map_renders_toggle() {
        let map = ServiceMap::default();
        let call = map.render(&PanelCommand::ToggleSwitch {
            entity_id: EntityId::from("switch.kitchen"),
            turn_on: true,
        });
        assert_eq!(call.domain, "switch");
        assert_eq!(call.service, "turn_on");
        assert_eq!(
            call.data,
            serde_json::json!({ "entity_id": "switch.kitchen" })
        );
    }

    #[test]
    fn service_map_renders_reconnect() {
        let map = ServiceMap {
            reconnect_domain: "unifi".into(),
            reconnect_service: "reconnect".into(),
            ..ServiceMap::default()
        };
        let call = map.render(&reconnect_command(&MacAddress::new("aa:bb:cc:dd:ee:ff")));
        assert_eq!(call.domain, "unifi");
        assert_eq!(call.service, "reconnect");
        assert_eq!(call.data, serde_json::json!({ "mac": "aa:bb:cc:dd:ee:ff" }));
    }
}
