use std::{fs, path::Path};

use client_core::pad::DEFAULT_POWER;
use serde::Deserialize;
use shared::protocol::WireProtocol;
use tracing::warn;

pub const SETTINGS_FILE: &str = "panel.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub actionizer_url: String,
    pub database_url: String,
    pub wire_protocol: WireProtocol,
    pub default_power: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            actionizer_url: "http://localhost:8080/actions".into(),
            database_url: "sqlite://./data/panel.db".into(),
            wire_protocol: WireProtocol::Devices,
            default_power: DEFAULT_POWER,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    actionizer_url: Option<String>,
    database_url: Option<String>,
    wire_protocol: Option<WireProtocol>,
    default_power: Option<u32>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file if it parses, then environment
/// variables. `APP__*` names win over the bare ones.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.actionizer_url {
                    settings.actionizer_url = v;
                }
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.wire_protocol {
                    settings.wire_protocol = v;
                }
                if let Some(v) = file_cfg.default_power {
                    settings.default_power = v;
                }
            }
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("ACTIONIZER_URL") {
        settings.actionizer_url = v;
    }
    if let Some(v) = env("APP__ACTIONIZER_URL") {
        settings.actionizer_url = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__WIRE_PROTOCOL") {
        match v.parse() {
            Ok(protocol) => settings.wire_protocol = protocol,
            Err(error) => warn!(%error, "ignoring APP__WIRE_PROTOCOL"),
        }
    }

    if let Some(v) = env("APP__DEFAULT_POWER") {
        match v.parse::<u32>() {
            Ok(power) => settings.default_power = power,
            Err(error) => warn!(value = %v, %error, "ignoring APP__DEFAULT_POWER"),
        }
    }

    settings
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
