// ── Core error types ──
//
// The core deliberately has a single fatal error class: configuration
// rejected at setup. Everything downstream (missing entities, malformed
// telemetry, toggles against dead switches) degrades to neutral values
// instead of erroring, so the panel stays usable through partial outages.

use thiserror::Error;

/// Raised by [`PanelConfig::from_value`](crate::PanelConfig::from_value)
/// when the raw configuration cannot produce a panel.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The one required field. A panel without `breakers` is meaningless.
    #[error("configuration must define a 'breakers' list")]
    MissingBreakers,

    /// A present field could not be coerced into its expected shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}
