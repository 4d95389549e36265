//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work/break lengths and the face-down requirement
//! - Alert windows (cooldown, flash overlay, strobe)
//! - Orientation sensor tuning
//! - Whether onboarding has been completed
//!
//! Configuration is stored at `~/.config/facedown/config.toml`.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::alert::AlertTiming;
use crate::device::{GravityClassifier, DEFAULT_FACE_DOWN_THRESHOLD};
use crate::error::ConfigError;
use crate::timer::{Durations, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

/// Timer preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    #[serde(default = "default_true")]
    pub require_face_down: bool,
}

/// Alert windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_flash_secs")]
    pub flash_secs: u64,
    #[serde(default = "default_flash_interval_ms")]
    pub flash_interval_ms: u64,
    #[serde(default = "default_strobe_secs")]
    pub strobe_secs: u64,
}

/// Orientation sensor tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Sampling period (~5 Hz by default).
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Gravity z above which the screen counts as facing down.
    #[serde(default = "default_face_down_threshold")]
    pub face_down_threshold: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/facedown/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub onboarding_completed: bool,
}

/// Upper bound for the cooldown, flash and strobe windows.
pub const MAX_ALERT_WINDOW_SECS: u64 = 60;
/// Allowed flash frame period.
pub const FLASH_INTERVAL_MS: RangeInclusive<u64> = 20..=1000;
/// Allowed sensor sampling period.
pub const SAMPLE_INTERVAL_MS: RangeInclusive<u64> = 10..=5000;

// Default functions
fn default_work_minutes() -> u32 {
    DEFAULT_WORK_MINUTES
}
fn default_break_minutes() -> u32 {
    DEFAULT_BREAK_MINUTES
}
fn default_true() -> bool {
    true
}
fn default_cooldown_secs() -> u64 {
    3
}
fn default_flash_secs() -> u64 {
    5
}
fn default_flash_interval_ms() -> u64 {
    80
}
fn default_strobe_secs() -> u64 {
    5
}
fn default_sample_interval_ms() -> u64 {
    200
}
fn default_face_down_threshold() -> f64 {
    DEFAULT_FACE_DOWN_THRESHOLD
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            require_face_down: true,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            flash_secs: default_flash_secs(),
            flash_interval_ms: default_flash_interval_ms(),
            strobe_secs: default_strobe_secs(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            face_down_threshold: default_face_down_threshold(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            alert: AlertConfig::default(),
            sensor: SensorConfig::default(),
            onboarding_completed: false,
        }
    }
}

/// Returns `~/.config/facedown[-dev]/` based on FACEDOWN_ENV.
///
/// Set FACEDOWN_ENV=dev to use the development directory, or
/// FACEDOWN_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FACEDOWN_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FACEDOWN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("facedown-dev")
            } else {
                base_dir.join("facedown")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
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
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the existing type.
    /// Does not write to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Configured lengths, clamped into their allowed ranges.
    pub fn durations(&self) -> Durations {
        Durations::new(self.timer.work_minutes, self.timer.break_minutes)
    }

    /// Alert windows, each capped at [`MAX_ALERT_WINDOW_SECS`].
    pub fn alert_timing(&self) -> AlertTiming {
        let window = |secs: u64| Duration::from_secs(secs.min(MAX_ALERT_WINDOW_SECS));
        let (min_ms, max_ms) = (*FLASH_INTERVAL_MS.start(), *FLASH_INTERVAL_MS.end());
        AlertTiming {
            cooldown: window(self.alert.cooldown_secs),
            flash_duration: window(self.alert.flash_secs),
            flash_interval: Duration::from_millis(self.alert.flash_interval_ms.clamp(min_ms, max_ms)),
            strobe_duration: window(self.alert.strobe_secs),
        }
    }

    /// How often the sensor reports, clamped into [`SAMPLE_INTERVAL_MS`].
    pub fn sample_interval(&self) -> Duration {
        let (min_ms, max_ms) = (*SAMPLE_INTERVAL_MS.start(), *SAMPLE_INTERVAL_MS.end());
        Duration::from_millis(self.sensor.sample_interval_ms.clamp(min_ms, max_ms))
    }

    pub fn classifier(&self) -> GravityClassifier {
        GravityClassifier::new(self.sensor.face_down_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timer.work_minutes, 25);
        assert_eq!(parsed.alert.flash_interval_ms, 80);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[timer]\nwork_minutes = 45\n").unwrap();
        assert_eq!(parsed.timer.work_minutes, 45);
        assert_eq!(parsed.timer.break_minutes, 5);
        assert!(parsed.timer.require_face_down);
        assert_eq!(parsed.alert.cooldown_secs, 3);
        assert!(!parsed.onboarding_completed);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.work_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("timer.require_face_down").as_deref(), Some("true"));
        assert_eq!(cfg.get("sensor.face_down_threshold").as_deref(), Some("0.7"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("timer").is_none());
    }

    #[test]
    fn set_keeps_value_types() {
        let mut cfg = Config::default();
        cfg.set("timer.require_face_down", "false").unwrap();
        cfg.set("timer.break_minutes", "12").unwrap();
        cfg.set("sensor.face_down_threshold", "0.8").unwrap();
        assert!(!cfg.timer.require_face_down);
        assert_eq!(cfg.timer.break_minutes, 12);
        assert_eq!(cfg.sensor.face_down_threshold, 0.8);
    }

    #[test]
    fn set_rejects_unknown_and_malformed() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("timer.work_minutes", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn durations_are_clamped() {
        let mut cfg = Config::default();
        cfg.timer.work_minutes = 99;
        cfg.timer.break_minutes = 0;
        let d = cfg.durations();
        assert_eq!(d.work_minutes(), 60);
        assert_eq!(d.break_minutes(), 3);
    }

    #[test]
    fn sensor_settings() {
        let mut cfg = Config::default();
        assert_eq!(cfg.sample_interval(), Duration::from_millis(200));
        assert!(!cfg.classifier().is_face_down(0.7));

        cfg.sensor.face_down_threshold = 0.5;
        assert!(cfg.classifier().is_face_down(0.6));

        cfg.set("sensor.sample_interval_ms", "0").unwrap();
        assert_eq!(cfg.sample_interval(), Duration::from_millis(10));
    }

    #[test]
    fn oversized_alert_windows_are_capped() {
        let mut cfg = Config::default();
        cfg.set("alert.cooldown_secs", &u64::MAX.to_string()).unwrap();
        cfg.set("alert.strobe_secs", "600").unwrap();
        cfg.set("alert.flash_interval_ms", "0").unwrap();

        let timing = cfg.alert_timing();
        assert_eq!(timing.cooldown, Duration::from_secs(MAX_ALERT_WINDOW_SECS));
        assert_eq!(timing.strobe_duration, Duration::from_secs(MAX_ALERT_WINDOW_SECS));
        assert_eq!(timing.flash_duration, Duration::from_secs(5));
        assert_eq!(timing.flash_interval, Duration::from_millis(20));
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.onboarding_completed = true;
        cfg.alert.cooldown_secs = 4;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.alert_timing().cooldown, Duration::from_secs(4));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
