//! Data bridge — background tasks connecting the TUI to the outside world.
//!
//! Inbound: a snapshot feed task polls the configured source and forwards
//! every new [`StateSnapshot`] as an [`Action`] through the action channel,
//! so delivery into the panel is serialized with everything else. Outbound:
//! an outbox task appends rendered service calls as NDJSON for the host
//! bridge to pick up — fire-and-forget, a failed write is logged and
//! dropped.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use breakerboard_core::{EntityState, PanelConfig, ServiceCall, StateSnapshot};

use crate::action::Action;

/// Where state snapshots come from.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    /// Re-read a JSON file (entity id → state object) on every poll tick.
    File(PathBuf),
    /// Deterministic synthetic telemetry derived from the panel layout,
    /// for trying the UI without a host runtime.
    Demo,
}

/// Spawn the snapshot feed task.
pub fn spawn_snapshot_feed(
    source: SnapshotSource,
    panel: Arc<PanelConfig>,
    poll_interval: Duration,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_sent: Option<StateSnapshot> = None;
        let mut last_error: Option<String> = None;
        let mut tick: u64 = 0;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let snapshot = match &source {
                SnapshotSource::File(path) => match read_snapshot_file(path).await {
                    Ok(snapshot) => {
                        last_error = None;
                        snapshot
                    }
                    Err(reason) => {
                        // Report each distinct failure once, keep the last
                        // good snapshot on screen.
                        if last_error.as_deref() != Some(reason.as_str()) {
                            warn!(%reason, "snapshot source failed");
                            let _ = action_tx.send(Action::SourceError(reason.clone()));
                            last_error = Some(reason);
                        }
                        continue;
                    }
                },
                SnapshotSource::Demo => demo_snapshot(&panel, tick),
            };
            tick += 1;

            if last_sent.as_ref() == Some(&snapshot) {
                continue;
            }
            last_sent = Some(snapshot.clone());
            if action_tx
                .send(Action::SnapshotUpdated(Arc::new(snapshot)))
                .is_err()
            {
                break;
            }
        }

        debug!("snapshot feed shut down");
    });
}

async fn read_snapshot_file(path: &std::path::Path) -> Result<StateSnapshot, String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("parse {}: {e}", path.display()))
}

// ── Demo feed ───────────────────────────────────────────────────────

/// Build a deterministic snapshot for the demo feed.
///
/// Loads oscillate against each breaker's rating, voltages wobble around
/// 230V, and every breaker periodically cycles through off and (for those
/// with a MAC) unavailable so all presentation states are reachable.
fn demo_snapshot(panel: &PanelConfig, tick: u64) -> StateSnapshot {
    let mut snapshot = StateSnapshot::new();
    let breakers = panel.main_breakers.iter().chain(panel.breakers.iter());

    for (index, breaker) in breakers.enumerate() {
        let offset = index as u64;
        #[allow(clippy::cast_precision_loss)]
        let phase = (tick + offset * 3) as f64 * 0.2;

        let cycle = (tick / 12 + offset) % 8;
        let switch_state = match cycle {
            6 => "off",
            7 if breaker.mac.is_some() => "unavailable",
            _ => "on",
        };

        if let Some(id) = breaker.switch_ref() {
            snapshot.insert(id.clone(), EntityState::new(switch_state));
        }

        let rating = breaker.max_current.unwrap_or(16.0);
        let amps = rating * (0.55 + 0.40 * phase.sin()).clamp(0.0, 1.0);
        if let Some(id) = breaker.current_ref() {
            snapshot.insert(id.clone(), EntityState::new(format!("{amps:.2}")));
        }

        let volts = 230.0 + 2.5 * (phase * 0.3).sin();
        if let Some(id) = breaker.voltage_ref() {
            snapshot.insert(id.clone(), EntityState::new(format!("{volts:.1}")));
        }

        if let Some(id) = breaker.power_ref() {
            let watts = amps * volts;
            // Alternate units across breakers to exercise the formatter.
            let state = if index % 3 == 2 {
                EntityState::with_unit(format!("{:.3}", watts / 1000.0), "kW")
            } else {
                EntityState::with_unit(format!("{watts:.0}"), "W")
            };
            snapshot.insert(id.clone(), state);
        }
    }

    snapshot
}

// ── Outbox ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct OutboxRecord<'a> {
    ts: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    call: &'a ServiceCall,
}

/// Spawn the outbox task and return its sender.
///
/// With a path, every call is appended as one JSON line; without one,
/// calls are only logged. Either way the sender never blocks the UI.
pub fn spawn_outbox(
    path: Option<PathBuf>,
    cancel: CancellationToken,
) -> mpsc::UnboundedSender<ServiceCall> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServiceCall>();

    tokio::spawn(async move {
        loop {
            let call = tokio::select! {
                () = cancel.cancelled() => break,
                call = rx.recv() => match call {
                    Some(call) => call,
                    None => break,
                },
            };

            info!(domain = %call.domain, service = %call.service, "dispatching service call");

            let Some(path) = &path else { continue };
            let record = OutboxRecord {
                ts: chrono::Utc::now(),
                call: &call,
            };
            let Ok(mut line) = serde_json::to_string(&record) else {
                continue;
            };
            line.push('\n');

            let result = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await;
            match result {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(line.as_bytes()).await {
                        warn!(path = %path.display(), error = %e, "outbox write failed");
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "outbox open failed"),
            }
        }

        debug!("outbox shut down");
    });

    tx
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use breakerboard_core::EntityId;

    use super::*;

    fn demo_panel() -> PanelConfig {
        let raw = serde_json::json!({
            "breakers": [
                { "name": "A", "switch": "switch.a",
                  "current_entity": "sensor.a_amps",
                  "voltage_entity": "sensor.a_volts",
                  "power_entity": "sensor.a_power",
                  "max_current": 20, "mac": "aa:bb:cc:dd:ee:01" },
                { "name": "B", "switch": "switch.b" },
            ],
        });
        PanelConfig::from_value(&raw).unwrap()
    }

    #[test]
    fn demo_snapshot_is_deterministic() {
        let panel = demo_panel();
        assert_eq!(demo_snapshot(&panel, 42), demo_snapshot(&panel, 42));
        assert_ne!(demo_snapshot(&panel, 0), demo_snapshot(&panel, 1));
    }

    #[test]
    fn demo_snapshot_covers_configured_entities() {
        let panel = demo_panel();
        let snapshot = demo_snapshot(&panel, 0);
        for id in [
            "switch.a",
            "sensor.a_amps",
            "sensor.a_volts",
            "sensor.a_power",
            "switch.b",
        ] {
            assert!(
                snapshot.get(&EntityId::from(id)).is_some(),
                "missing {id}"
            );
        }
        // Only configured refs are fabricated.
        assert_eq!(snapshot.len(), 5);
    }

    #[test]
    fn demo_currents_stay_within_rating() {
        let panel = demo_panel();
        let amps_id = EntityId::from("sensor.a_amps");
        for tick in 0..100 {
            let snapshot = demo_snapshot(&panel, tick);
            let amps: f64 = snapshot.get(&amps_id).unwrap().state.parse().unwrap();
            assert!((0.0..=20.0).contains(&amps), "tick {tick}: {amps}");
        }
    }

    #[test]
    fn demo_cycles_through_unavailable_only_with_mac() {
        let panel = demo_panel();
        let a = EntityId::from("switch.a");
        let b = EntityId::from("switch.b");
        let mut saw_unavailable_a = false;
        for tick in 0..200 {
            let snapshot = demo_snapshot(&panel, tick);
            if snapshot.get(&a).unwrap().state == "unavailable" {
                saw_unavailable_a = true;
            }
            assert_ne!(snapshot.get(&b).unwrap().state, "unavailable");
        }
        assert!(saw_unavailable_a);
    }
}
