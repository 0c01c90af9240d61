//! Application-level configuration loading: the participant roster and the gift options set.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SANTA_BACK_CONFIG_PATH";
/// Gift choice token that switches the gift step to free-text entry.
pub const CUSTOM_GIFT_CHOICE: &str = "other";

/// One named entry of the fixed roster eligible to be selected or guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Stable identifier for the participant.
    pub id: u32,
    /// Display name, unique within the roster.
    pub name: String,
    /// Opaque portrait asset reference served to the frontend.
    pub portrait: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    participants: IndexMap<String, Participant>,
    gift_options: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the baked-in roster.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        participants = config.participants.len(),
                        gift_options = config.gift_options.len(),
                        "loaded roster from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration from explicit parts, mainly for tests.
    pub fn new(participants: Vec<Participant>, gift_options: Vec<String>) -> Self {
        Self {
            participants: index_by_name(participants),
            gift_options,
        }
    }

    /// Roster entries in their configured order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Look up a roster entry by exact name.
    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants.get(name)
    }

    /// Whether a name references an existing roster entry.
    pub fn is_participant(&self, name: &str) -> bool {
        self.participants.contains_key(name)
    }

    /// Configured gift labels, excluding the custom marker.
    pub fn gift_options(&self) -> &[String] {
        &self.gift_options
    }

    /// Whether a choice denotes one of the configured gift labels.
    pub fn is_gift_option(&self, choice: &str) -> bool {
        self.gift_options.iter().any(|option| option == choice)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            participants: index_by_name(default_roster()),
            gift_options: default_gift_options(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    participants: Vec<RawParticipant>,
    #[serde(default = "default_gift_options")]
    gift_options: Vec<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let participants = value
            .participants
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>();
        Self {
            participants: index_by_name(participants),
            gift_options: value.gift_options,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a roster entry inside the configuration file.
struct RawParticipant {
    id: u32,
    name: String,
    #[serde(default)]
    portrait: Option<String>,
}

impl From<RawParticipant> for Participant {
    fn from(value: RawParticipant) -> Self {
        let portrait = value
            .portrait
            .unwrap_or_else(|| default_portrait(&value.name));
        Self {
            id: value.id,
            name: value.name,
            portrait,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn index_by_name(participants: Vec<Participant>) -> IndexMap<String, Participant> {
    participants
        .into_iter()
        .map(|participant| (participant.name.clone(), participant))
        .collect()
}

fn default_portrait(name: &str) -> String {
    format!("portraits/{}.png", name.to_lowercase())
}

/// Built-in roster shipped with the binary.
fn default_roster() -> Vec<Participant> {
    [
        "Kornis", "Ignas", "Rokas", "Karke", "Jokubas", "Alanas", "Arunce",
    ]
    .into_iter()
    .enumerate()
    .map(|(index, name)| Participant {
        id: index as u32 + 1,
        name: name.to_owned(),
        portrait: default_portrait(name),
    })
    .collect()
}

/// Built-in gift labels shipped with the binary.
fn default_gift_options() -> Vec<String> {
    ["kepure", "salikas", "pirstines", "kojines", "puodelis"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_keeps_configured_order() {
        let config = AppConfig::default();
        let names: Vec<&str> = config
            .participants()
            .map(|participant| participant.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Kornis", "Ignas", "Rokas", "Karke", "Jokubas", "Alanas", "Arunce"]
        );
    }

    #[test]
    fn participant_lookup_is_exact() {
        let config = AppConfig::default();
        assert!(config.is_participant("Kornis"));
        assert!(!config.is_participant("kornis"));
        assert!(!config.is_participant("Nobody"));
    }

    #[test]
    fn raw_config_fills_missing_portraits() {
        let raw = r#"{ "participants": [{ "id": 1, "name": "Kornis" }] }"#;
        let parsed: RawConfig = serde_json::from_str(raw).unwrap();
        let config: AppConfig = parsed.into();
        assert_eq!(
            config.participant("Kornis").unwrap().portrait,
            "portraits/kornis.png"
        );
        assert!(!config.gift_options().is_empty());
    }
}
