//! TOML-based application configuration.
//!
//! Stores:
//! - The target instant, journey start and screen titles
//! - Phase timing (tick interval, closing dwell, confetti, message rotation)
//! - How days are counted
//! - Celebration messages
//!
//! Configuration is stored at `~/.config/countdown/config.toml`. Runtime
//! state (phase, override date) is never written here.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::countdown::DayCounting;
use crate::error::{ConfigError, Result};
use crate::phase::{default_messages, CountdownSettings, Timing};

/// What we count down to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_target")]
    pub at: NaiveDateTime,
    /// Start of the progress bar.
    #[serde(default = "default_journey_start")]
    pub journey_start: NaiveDateTime,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub day_counting: DayCounting,
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelebrationConfig {
    #[serde(default = "default_messages")]
    pub messages: Vec<String>,
    #[serde(default = "default_headline")]
    pub headline: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/countdown/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub celebration: CelebrationConfig,
}

fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}
fn default_target() -> NaiveDateTime {
    midnight(2025, 10, 17)
}
fn default_journey_start() -> NaiveDateTime {
    midnight(2022, 2, 28)
}
fn default_title() -> String {
    "Countdown".into()
}
fn default_subtitle() -> String {
    "Time Remaining".into()
}
fn default_headline() -> String {
    "The wait is over!".into()
}
fn default_true() -> bool {
    true
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            at: default_target(),
            journey_start: default_journey_start(),
            title: default_title(),
            subtitle: default_subtitle(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            day_counting: DayCounting::default(),
            show_progress: true,
        }
    }
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            messages: default_messages(),
            headline: default_headline(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The result must still
    /// deserialize and validate; on error `self` is unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timing.tick_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.timing.message_rotation_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timing.message_rotation_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.target.journey_start >= self.target.at {
            return Err(ConfigError::InvalidValue {
                key: "target.journey_start".into(),
                message: format!("must be before the target {}", self.target.at),
            });
        }
        if self.celebration.messages.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "celebration.messages".into(),
                message: "needs at least one message".into(),
            });
        }
        Ok(())
    }

    pub fn settings(&self) -> CountdownSettings {
        CountdownSettings {
            target: self.target.at,
            journey_start: self.target.journey_start,
            day_counting: self.display.day_counting,
            timing: self.timing,
            messages: self.celebration.messages.clone(),
        }
    }
}
