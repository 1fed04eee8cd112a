//! Shared configuration for the breakerboard TUI.
//!
//! TOML profiles (panel file, snapshot source, outbox path, service-name
//! overrides) merged with `BREAKERBOARD_`-prefixed environment variables,
//! plus loading of panel definition files (YAML or JSON) into the core's
//! [`PanelConfig`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use breakerboard_core::{PanelConfig, ServiceMap};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no profile named '{profile}' in the config file")]
    NoProfile { profile: String },

    #[error("failed to read panel file {path}: {source}")]
    PanelFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse panel file {path}: {reason}")]
    PanelParse { path: PathBuf, reason: String },

    #[error(transparent)]
    Panel(#[from] breakerboard_core::ConfigError),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration for the TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named panel profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// How often the snapshot source is polled, in milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms: u64,

    /// Log file path; falls back to the platform temp dir.
    pub log_file: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_ms(),
            log_file: None,
        }
    }
}

fn default_poll_ms() -> u64 {
    1000
}

/// A named panel profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Panel definition file (YAML or JSON).
    pub panel: PathBuf,

    /// Snapshot JSON file to watch for state updates. Absent means the
    /// built-in demo feed.
    pub snapshot: Option<PathBuf>,

    /// NDJSON file where outbound service calls are appended for the host
    /// bridge to pick up.
    pub outbox: Option<PathBuf>,

    /// Host-specific service names for toggle/reconnect.
    #[serde(default)]
    pub services: ServiceMap,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "breakerboard", "breakerboard").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("breakerboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from a specific file plus the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BREAKERBOARD_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the full Config from the canonical path plus the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

/// Look up a profile by name, falling back to `default_profile`.
pub fn resolve_profile<'a>(
    config: &'a Config,
    name: Option<&'a str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let name = name
        .or(config.default_profile.as_deref())
        .unwrap_or("default");
    config
        .profiles
        .get(name)
        .map(|profile| (name, profile))
        .ok_or_else(|| ConfigError::NoProfile {
            profile: name.into(),
        })
}

// ── Panel definition loading ────────────────────────────────────────

/// Read and normalize a panel definition file.
///
/// `.yaml`/`.yml` files parse as YAML, everything else as JSON; both feed
/// the same raw value into [`PanelConfig::from_value`], so the core's
/// validation rules apply identically.
pub fn load_panel_file(path: &Path) -> Result<PanelConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::PanelFile {
        path: path.to_owned(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let raw: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| ConfigError::PanelParse {
            path: path.to_owned(),
            reason: e.to_string(),
        })?
    } else {
        serde_json::from_str(&text).map_err(|e| ConfigError::PanelParse {
            path: path.to_owned(),
            reason: e.to_string(),
        })?
    };

    Ok(PanelConfig::from_value(&raw)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::io::Write;

    use super::*;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "config.toml",
            r#"
default_profile = "garage"

[defaults]
poll_interval_ms = 250

[profiles.garage]
panel = "/etc/breakerboard/garage.yaml"
snapshot = "/run/breakerboard/states.json"

[profiles.garage.services]
reconnect_domain = "unifi"
reconnect_service = "reconnect"
"#,
        );

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.poll_interval_ms, 250);

        let (name, profile) = resolve_profile(&config, None).unwrap();
        assert_eq!(name, "garage");
        assert_eq!(profile.panel, PathBuf::from("/etc/breakerboard/garage.yaml"));
        assert_eq!(profile.services.reconnect_domain, "unifi");
        // Unspecified service names keep their defaults.
        assert_eq!(profile.services.switch_domain, "switch");
    }

    #[test]
    fn missing_profile_errors() {
        let config = Config::default();
        let err = resolve_profile(&config, Some("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::NoProfile { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.poll_interval_ms, 1000);
    }

    #[test]
    fn loads_yaml_panel_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "panel.yaml",
            r"
title: Garage
columns: 3
breakers:
  - name: EV Charger
    switch: switch.ev
    max_current: 32
    double: true
  - empty: true
",
        );

        let panel = load_panel_file(&path).unwrap();
        assert_eq!(panel.title, "Garage");
        assert_eq!(panel.columns, 3);
        assert_eq!(panel.breakers.len(), 2);
        assert!(panel.breakers[0].double);
        assert!(panel.breakers[1].empty);
    }

    #[test]
    fn loads_json_panel_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "panel.json",
            r#"{ "breakers": [ { "name": "Lights", "switch": "switch.lights" } ] }"#,
        );

        let panel = load_panel_file(&path).unwrap();
        assert_eq!(panel.title, "Distribution Panel");
        assert_eq!(panel.breakers[0].name.as_deref(), Some("Lights"));
    }

    #[test]
    fn panel_without_breakers_propagates_core_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "panel.json", r#"{ "title": "Empty" }"#);
        let err = load_panel_file(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Panel(breakerboard_core::ConfigError::MissingBreakers)
        ));
    }
}
