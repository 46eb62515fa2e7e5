//! Configuration Management System for TiltSketch
//!
//! Property-based configuration persisted as JSON. Every key has a built-in default, so a
//! missing or partial file still yields a complete configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "TILTSKETCH_CONFIG";

/// Supported configuration value types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers are accepted where floats are expected, `"speed": 300` is fine
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Boolean(value)
    }
}

/// Application configuration backed by a flat property map
#[derive(Debug, Clone)]
pub struct SketchConfig {
    properties: HashMap<String, ConfigValue>,
    config_resource: String,
}

impl SketchConfig {
    /// Create a configuration populated with defaults
    pub fn new(config_resource: String) -> Self {
        let mut config = Self {
            properties: HashMap::new(),
            config_resource,
        };
        config.set_defaults();
        config
    }

    fn set_defaults(&mut self) {
        // Serial settings; an empty port means "pick the first USB device"
        self.properties.insert("serial.port".to_string(), "".into());
        self.properties.insert("serial.baudRate".to_string(), 115_200i64.into());
        self.properties.insert("serial.autoConnect".to_string(), true.into());

        self.properties.insert("replay.intervalMs".to_string(), 500i64.into());

        self.properties.insert("scrollback.maxMessages".to_string(), 100i64.into());

        self.properties.insert("brush.moveSpeed".to_string(), 300.0f64.into());

        // Absolute on-thresholds in volts
        self.properties.insert("thresholds.xLeft".to_string(), 0.420f64.into());
        self.properties.insert("thresholds.xRight".to_string(), 0.552f64.into());
        self.properties.insert("thresholds.yDown".to_string(), 1.087f64.into());
        self.properties.insert("thresholds.yUp".to_string(), 1.513f64.into());
        self.properties.insert("thresholds.zThin".to_string(), 0.900f64.into());
        self.properties.insert("thresholds.zThick".to_string(), 1.594f64.into());

        self.properties.insert("snapshot.directory".to_string(), "".into());
    }

    pub fn get_string_property(&self, key: &str) -> Option<String> {
        self.properties.get(key).and_then(|v| v.as_string().map(|s| s.to_string()))
    }

    pub fn get_string_property_or(&self, key: &str, default: &str) -> String {
        self.get_string_property(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_int_property(&self, key: &str) -> Option<i64> {
        self.properties.get(key).and_then(|v| v.as_integer())
    }

    pub fn get_int_property_or(&self, key: &str, default: i64) -> i64 {
        self.get_int_property(key).unwrap_or(default)
    }

    pub fn get_float_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(|v| v.as_float())
    }

    pub fn get_float_property_or(&self, key: &str, default: f64) -> f64 {
        self.get_float_property(key).unwrap_or(default)
    }

    pub fn get_boolean_property(&self, key: &str) -> Option<bool> {
        self.properties.get(key).and_then(|v| v.as_boolean())
    }

    pub fn get_boolean_property_or(&self, key: &str, default: bool) -> bool {
        self.get_boolean_property(key).unwrap_or(default)
    }

    pub fn set_property<T: Into<ConfigValue>>(&mut self, key: &str, value: T) {
        self.properties.insert(key.to_string(), value.into());
    }

    pub fn get_config_resource(&self) -> &str {
        &self.config_resource
    }

    /// Configured serial device, `None` when auto-selection is wanted
    pub fn serial_port(&self) -> Option<String> {
        self.get_string_property("serial.port")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
    }

    pub fn baud_rate(&self) -> ConfigResult<u32> {
        let raw = self.get_int_property_or("serial.baudRate", 115_200);
        u32::try_from(raw)
            .ok()
            .filter(|b| *b > 0)
            .ok_or_else(|| ConfigError::InvalidParameter {
                parameter: "serial.baudRate".to_string(),
                value: raw.to_string(),
                reason: "must be a positive 32-bit integer".to_string(),
            })
    }

    pub fn auto_connect(&self) -> bool {
        self.get_boolean_property_or("serial.autoConnect", true)
    }

    pub fn replay_interval(&self) -> Duration {
        let ms = self.get_int_property_or("replay.intervalMs", 500).max(0);
        Duration::from_millis(ms as u64)
    }

    /// Scrollback capacity, never below one entry
    pub fn max_messages(&self) -> usize {
        self.get_int_property_or("scrollback.maxMessages", 100).max(1) as usize
    }

    /// Directory where PNG snapshots are written; current directory when unset
    pub fn snapshot_directory(&self) -> PathBuf {
        let dir = self.get_string_property_or("snapshot.directory", "");
        if dir.trim().is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(dir)
        }
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        // Sorted keys keep the file stable across saves
        let sorted: std::collections::BTreeMap<_, _> = self.properties.iter().collect();
        serde_json::to_string_pretty(&sorted)
    }

    /// Merge properties from JSON over the current values
    pub fn from_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let loaded: HashMap<String, ConfigValue> = serde_json::from_str(json)?;
        self.properties.extend(loaded);
        Ok(())
    }
}

/// Thread-safe configuration wrapper
pub type SharedSketchConfig = Arc<Mutex<SketchConfig>>;

pub fn create_shared_config(config_resource: String) -> SharedSketchConfig {
    Arc::new(Mutex::new(SketchConfig::new(config_resource)))
}

/// Platform-appropriate config file location.
/// Priority:
/// 1) TILTSKETCH_CONFIG env var
/// 2) the platform config dir, e.g. ~/.config/tiltsketch/config.json
/// 3) ./config.json
pub fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(p);
    }

    dirs::config_dir()
        .map(|base| base.join("tiltsketch").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Load configuration from `path`, returning defaults when the file is missing.
pub fn load_config_from(path: &Path) -> ConfigResult<SketchConfig> {
    let mut config = SketchConfig::new(path.to_string_lossy().to_string());
    if !path.exists() {
        return Ok(config);
    }

    let buf = fs::read_to_string(path).map_err(|e| ConfigError::FileError {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    config.from_json(&buf)?;
    Ok(config)
}

/// Load the shared configuration from the default location.
/// Unreadable files are reported and replaced by defaults.
pub fn load_shared_config() -> SharedSketchConfig {
    let path = default_config_path();
    match load_config_from(&path) {
        Ok(config) => Arc::new(Mutex::new(config)),
        Err(e) => {
            log::warn!("Ignoring config file {}: {e}", path.display());
            create_shared_config(path.to_string_lossy().to_string())
        }
    }
}

/// Write configuration to its `config_resource` path
pub fn save_config(config: &SketchConfig) -> ConfigResult<()> {
    let json = config.to_json()?;
    let path = PathBuf::from(config.get_config_resource());
    let file_error = |e: std::io::Error| ConfigError::FileError {
        path: path.display().to_string(),
        error: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(file_error)?;
        }
    }
    fs::write(&path, json).map_err(file_error)
}

pub fn save_shared_config(shared: &SharedSketchConfig) -> ConfigResult<()> {
    let snapshot = shared.lock().map_err(|_| ConfigError::Unavailable)?.clone();
    save_config(&snapshot)
}

/// Write the shared configuration out if its file does not exist yet, so a first run leaves
/// an editable file with every key. Returns whether a file was written.
pub fn ensure_config_file(shared: &SharedSketchConfig) -> ConfigResult<bool> {
    let path = {
        let cfg = shared.lock().map_err(|_| ConfigError::Unavailable)?;
        PathBuf::from(cfg.get_config_resource())
    };
    if path.exists() {
        return Ok(false);
    }
    save_shared_config(shared)?;
    Ok(true)
}
