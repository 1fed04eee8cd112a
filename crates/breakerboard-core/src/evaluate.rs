//! The breaker evaluator — pure derivation of [`BreakerView`]s.
//!
//! `evaluate` maps one (breaker, snapshot) pair to its complete visual
//! state; `evaluate_panel` runs both zones in display order and fills in
//! positional fallbacks (phase names, primary highlighting). Both are
//! deterministic, side-effect free, and never raise: malformed or missing
//! telemetry degrades to zero/neutral values so rapid snapshot ticks can
//! re-run them without flicker or failure.

use crate::model::{BreakerConfig, BreakerView, LoadTier, PanelConfig};
use crate::snapshot::StateSnapshot;

/// Derived visual state for the whole panel, one view per configured
/// breaker, index-correlated to the configuration zones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelView {
    pub main_breakers: Vec<BreakerView>,
    pub breakers: Vec<BreakerView>,
}

/// Format a power reading the way the panel displays it.
///
/// Recognized units ("kW"/"W", case-insensitive) format directly. Anything
/// else falls back to magnitude inference because the telemetry source does
/// not always report a usable unit attribute. The thresholds (1000, 0.1)
/// and decimal counts are load-bearing: downstream displays compare against
/// these exact strings.
pub fn format_power(value: f64, unit: &str) -> String {
    match unit.to_lowercase().as_str() {
        "kw" => {
            if value < 1.0 {
                format!("{value:.3}kW")
            } else {
                format!("{value:.2}kW")
            }
        }
        "w" => format!("{value:.0}W"),
        _ => {
            if value > 1000.0 {
                format!("{value:.0}W")
            } else if value > 0.1 {
                format!("{value:.2}kW")
            } else {
                format!("{value:.3}kW")
            }
        }
    }
}

/// Derive the view model for a single breaker from the current snapshot.
pub fn evaluate(breaker: &BreakerConfig, snapshot: &StateSnapshot) -> BreakerView {
    // Vacant slots skip every rule.
    if breaker.empty {
        return BreakerView::placeholder(breaker.name.clone());
    }

    let switch = snapshot.resolve(breaker.switch_ref());

    // Availability is only meaningful when a switch is configured; a DPS
    // breaker without one has nothing to be unavailable about.
    let unavailable = breaker.switch_ref().is_some() && !switch.available;

    // No switch means a display-only breaker: always shown closed.
    let on = breaker.switch_ref().is_none() || switch.is_on();

    let current_amps = breaker
        .current_ref()
        .map(|id| snapshot.resolve(Some(id)).value);
    let voltage_volts = breaker
        .voltage_ref()
        .map(|id| snapshot.resolve(Some(id)).value);

    let power = breaker.power_ref().map(|id| {
        let reading = snapshot.resolve(Some(id));
        if reading.present {
            format_power(reading.value, &reading.unit)
        } else {
            "0W".to_owned()
        }
    });

    // A configured rating of 0 behaves like no rating at all.
    let rating = breaker.max_current.filter(|max| *max > 0.0);

    let ratio_percent = match (current_amps, rating) {
        (Some(amps), Some(max)) => Some(amps / max * 100.0),
        _ => None,
    };
    let tier = ratio_percent.map(LoadTier::for_percent).unwrap_or_default();

    let mut load_percent = match (current_amps, rating) {
        (Some(amps), Some(max)) if amps > 0.0 => Some((amps / max * 100.0).clamp(0.0, 100.0)),
        _ => None,
    };

    // An open breaker must not show load, whatever stale value the current
    // sensor still reports. Unavailable presentation wins over this.
    if !on && !unavailable && rating.is_some() {
        load_percent = Some(0.0);
    }

    BreakerView {
        name: breaker.name.clone(),
        on,
        unavailable,
        current_amps,
        voltage_volts,
        power,
        load_percent,
        tier,
        dps: breaker.dps,
        double: breaker.double,
        empty: false,
        clickable: breaker.is_clickable(),
        primary: false,
        reconnect_mac: if unavailable { breaker.mac.clone() } else { None },
    }
}

/// Evaluate both zones in display order, applying positional fallbacks.
pub fn evaluate_panel(panel: &PanelConfig, snapshot: &StateSnapshot) -> PanelView {
    let main_breakers = panel
        .main_breakers
        .iter()
        .enumerate()
        .map(|(index, breaker)| {
            let mut view = evaluate(breaker, snapshot);
            view.primary = index < 2;
            if view.name.is_none() {
                view.name = Some(main_fallback_name(index, breaker.empty));
            }
            view
        })
        .collect();

    let breakers = panel
        .breakers
        .iter()
        .enumerate()
        .map(|(index, breaker)| {
            let mut view = evaluate(breaker, snapshot);
            if view.name.is_none() {
                view.name = Some(breaker_fallback_name(index, breaker.empty));
            }
            view
        })
        .collect();

    PanelView {
        main_breakers,
        breakers,
    }
}

fn main_fallback_name(index: usize, empty: bool) -> String {
    if empty {
        "No connection".to_owned()
    } else if index == 0 {
        "Phase A".to_owned()
    } else {
        "Phase B".to_owned()
    }
}

fn breaker_fallback_name(index: usize, empty: bool) -> String {
    if empty {
        "No connection".to_owned()
    } else {
        format!("Breaker {}", index + 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{EntityId, MacAddress};
    use crate::snapshot::EntityState;

    fn snap(entries: &[(&str, EntityState)]) -> StateSnapshot {
        entries
            .iter()
            .map(|(id, state)| (EntityId::from(*id), state.clone()))
            .collect()
    }

    fn monitored(max_current: Option<f64>) -> BreakerConfig {
        BreakerConfig {
            name: Some("Kitchen".into()),
            switch: Some(EntityId::from("switch.kitchen")),
            current_entity: Some(EntityId::from("sensor.amps")),
            voltage_entity: Some(EntityId::from("sensor.volts")),
            power_entity: Some(EntityId::from("sensor.power")),
            max_current,
            ..BreakerConfig::default()
        }
    }

    // ── format_power ─────────────────────────────────────────────────

    #[test]
    fn format_power_recognized_units() {
        assert_eq!(format_power(1500.0, "W"), "1500W");
        assert_eq!(format_power(1500.4, "w"), "1500W");
        assert_eq!(format_power(0.5, "kW"), "0.500kW");
        assert_eq!(format_power(2.3, "kW"), "2.30kW");
        assert_eq!(format_power(1.0, "kw"), "1.00kW");
    }

    #[test]
    fn format_power_magnitude_fallback() {
        assert_eq!(format_power(2500.0, ""), "2500W");
        assert_eq!(format_power(0.05, ""), "0.050kW");
        // Mid-magnitude unit-less values land in the 2-decimal kW band,
        // even when they were almost certainly watts.
        assert_eq!(format_power(500.0, ""), "500.00kW");
        assert_eq!(format_power(500.0, "VA"), "500.00kW");
    }

    #[test]
    fn format_power_fallback_boundaries_are_strict() {
        assert_eq!(format_power(1000.0, ""), "1000.00kW");
        assert_eq!(format_power(1000.01, ""), "1000W");
        assert_eq!(format_power(0.1, ""), "0.100kW");
        assert_eq!(format_power(0.11, ""), "0.11kW");
    }

    // ── evaluation rules ─────────────────────────────────────────────

    #[test]
    fn empty_breaker_short_circuits() {
        let breaker = BreakerConfig {
            empty: true,
            switch: Some(EntityId::from("switch.ghost")),
            ..BreakerConfig::default()
        };
        // Even with a live snapshot for the ghost switch, the slot stays inert.
        let snapshot = snap(&[("switch.ghost", EntityState::new("on"))]);
        let view = evaluate(&breaker, &snapshot);
        assert!(view.empty);
        assert!(!view.on);
        assert!(!view.unavailable);
        assert_eq!(view.current_amps, None);
        assert_eq!(view.load_percent, None);
    }

    #[test]
    fn no_switch_is_always_on() {
        let breaker = BreakerConfig {
            name: Some("Feed".into()),
            ..BreakerConfig::default()
        };
        assert!(evaluate(&breaker, &StateSnapshot::new()).on);
        assert!(!evaluate(&breaker, &StateSnapshot::new()).unavailable);
    }

    #[test]
    fn dps_without_switch_is_never_unavailable() {
        let breaker = BreakerConfig {
            dps: true,
            ..BreakerConfig::default()
        };
        let view = evaluate(&breaker, &StateSnapshot::new());
        assert!(!view.unavailable);
        assert!(view.on);
        assert!(view.dps);
    }

    #[test]
    fn unavailable_switch_wins_over_off_override() {
        let breaker = monitored(Some(20.0));
        let snapshot = snap(&[
            ("switch.kitchen", EntityState::new("unavailable")),
            ("sensor.amps", EntityState::new("15.0")),
        ]);
        let view = evaluate(&breaker, &snapshot);
        assert!(view.unavailable);
        // "unavailable" is not "on", but the off-state override must not
        // fire: the computed load survives for the unavailable styling.
        assert!(!view.on);
        assert!(!view.dimmed());
        assert_eq!(view.load_percent, Some(75.0));
    }

    #[test]
    fn off_override_pins_load_to_zero() {
        let breaker = monitored(Some(20.0));
        for stale in ["18.0", "-3.0", "99999"] {
            let snapshot = snap(&[
                ("switch.kitchen", EntityState::new("off")),
                ("sensor.amps", EntityState::new(stale)),
            ]);
            let view = evaluate(&breaker, &snapshot);
            assert!(!view.on);
            assert!(view.dimmed());
            assert_eq!(view.load_percent, Some(0.0), "stale current {stale}");
        }
    }

    #[test]
    fn load_percent_is_clamped() {
        let breaker = monitored(Some(10.0));
        let snapshot = snap(&[
            ("switch.kitchen", EntityState::new("on")),
            ("sensor.amps", EntityState::new("25.0")),
        ]);
        let view = evaluate(&breaker, &snapshot);
        assert_eq!(view.load_percent, Some(100.0));
        assert_eq!(view.tier, LoadTier::Critical);
    }

    #[test]
    fn load_suppressed_without_rating_or_current() {
        // No max_current: no indicator, tier stays Normal.
        let no_rating = monitored(None);
        let snapshot = snap(&[
            ("switch.kitchen", EntityState::new("on")),
            ("sensor.amps", EntityState::new("15.0")),
        ]);
        let view = evaluate(&no_rating, &snapshot);
        assert_eq!(view.load_percent, None);
        assert_eq!(view.tier, LoadTier::Normal);

        // Rated but idle: indicator suppressed while on.
        let rated = monitored(Some(20.0));
        let idle = snap(&[
            ("switch.kitchen", EntityState::new("on")),
            ("sensor.amps", EntityState::new("0")),
        ]);
        assert_eq!(evaluate(&rated, &idle).load_percent, None);
    }

    #[test]
    fn zero_rating_behaves_as_unrated() {
        let breaker = monitored(Some(0.0));
        let snapshot = snap(&[
            ("switch.kitchen", EntityState::new("on")),
            ("sensor.amps", EntityState::new("15.0")),
        ]);
        let view = evaluate(&breaker, &snapshot);
        assert_eq!(view.load_percent, None);
        assert_eq!(view.tier, LoadTier::Normal);
    }

    #[test]
    fn tier_boundaries_against_rating() {
        let breaker = monitored(Some(100.0));
        let cases = [
            ("75.0", LoadTier::Normal),
            ("75.01", LoadTier::Warning),
            ("90.0", LoadTier::Warning),
            ("90.01", LoadTier::Critical),
        ];
        for (amps, expected) in cases {
            let snapshot = snap(&[
                ("switch.kitchen", EntityState::new("on")),
                ("sensor.amps", EntityState::new(amps)),
            ]);
            assert_eq!(evaluate(&breaker, &snapshot).tier, expected, "{amps}A");
        }
    }

    #[test]
    fn power_uses_reported_unit_and_defaults_when_absent() {
        let breaker = monitored(Some(20.0));
        let snapshot = snap(&[
            ("switch.kitchen", EntityState::new("on")),
            ("sensor.power", EntityState::with_unit("1.5", "kW")),
        ]);
        assert_eq!(
            evaluate(&breaker, &snapshot).power.as_deref(),
            Some("1.50kW")
        );

        // Configured power entity missing from the snapshot: literal 0W.
        let empty = StateSnapshot::new();
        assert_eq!(evaluate(&breaker, &empty).power.as_deref(), Some("0W"));

        // No power entity configured: no readout at all.
        let unmetered = BreakerConfig {
            switch: Some(EntityId::from("switch.kitchen")),
            ..BreakerConfig::default()
        };
        assert_eq!(evaluate(&unmetered, &snapshot).power, None);
    }

    #[test]
    fn reconnect_mac_only_while_unavailable() {
        let mut breaker = monitored(Some(20.0));
        breaker.mac = Some(MacAddress::new("AA:BB:CC:DD:EE:FF"));

        let live = snap(&[("switch.kitchen", EntityState::new("on"))]);
        assert_eq!(evaluate(&breaker, &live).reconnect_mac, None);

        let dead = snap(&[("switch.kitchen", EntityState::new("unavailable"))]);
        assert_eq!(
            evaluate(&breaker, &dead)
                .reconnect_mac
                .map(|m| m.as_str().to_owned()),
            Some("aa:bb:cc:dd:ee:ff".to_owned())
        );
    }

    #[test]
    fn switch_missing_from_snapshot_is_unavailable() {
        let breaker = monitored(Some(20.0));
        let view = evaluate(&breaker, &StateSnapshot::new());
        assert!(view.unavailable);
        assert!(!view.on);
    }

    // ── zone evaluation ──────────────────────────────────────────────

    #[test]
    fn panel_fallback_names_and_primary_roles() {
        let panel = PanelConfig {
            title: "Main".into(),
            columns: 2,
            main_breakers: vec![
                BreakerConfig::default(),
                BreakerConfig::default(),
                BreakerConfig {
                    name: Some("Generator".into()),
                    ..BreakerConfig::default()
                },
            ],
            breakers: vec![
                BreakerConfig::default(),
                BreakerConfig {
                    empty: true,
                    ..BreakerConfig::default()
                },
            ],
        };

        let view = evaluate_panel(&panel, &StateSnapshot::new());
        assert_eq!(view.main_breakers[0].name.as_deref(), Some("Phase A"));
        assert_eq!(view.main_breakers[1].name.as_deref(), Some("Phase B"));
        assert_eq!(view.main_breakers[2].name.as_deref(), Some("Generator"));
        assert!(view.main_breakers[0].primary);
        assert!(view.main_breakers[1].primary);
        assert!(!view.main_breakers[2].primary);

        assert_eq!(view.breakers[0].name.as_deref(), Some("Breaker 1"));
        assert_eq!(view.breakers[1].name.as_deref(), Some("No connection"));
        assert!(!view.breakers[0].primary);
    }

    #[test]
    fn panel_views_are_index_correlated() {
        let panel = PanelConfig {
            title: "Main".into(),
            columns: 2,
            main_breakers: Vec::new(),
            breakers: vec![
                BreakerConfig {
                    name: Some("A".into()),
                    ..BreakerConfig::default()
                },
                BreakerConfig {
                    name: Some("B".into()),
                    ..BreakerConfig::default()
                },
            ],
        };
        let view = evaluate_panel(&panel, &StateSnapshot::new());
        let names: Vec<_> = view
            .breakers
            .iter()
            .map(|b| b.name.clone().unwrap())
            .collect();
        assert_eq!(names, ["A", "B"]);
    }
}
