//! Configuration for ThermoVis-RS
//!
//! Persistent settings are stored as TOML in the platform data
//! directory under `dev.elena-savva.thermovis-rs`:
//!
//! - **Linux**: `~/.local/share/dev.elena-savva.thermovis-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.elena-savva.thermovis-rs/config.toml`
//! - **Windows**: `%APPDATA%\dev.elena-savva.thermovis-rs\config.toml`
//!
//! The instrument defaults mirror the lab's standing 2636A setup: 1 mA
//! DC bias, 20 V / 1 mA measurement ranges, NPLC 5 with a 100 ms
//! measure delay, one sample every 50 ms.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.elena-savva.thermovis-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default sampling period between measurements
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default window (in samples) over which the heating rate is estimated
pub const DEFAULT_HEATING_RATE_WINDOW: usize = 50;

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Instrument settings sent to the source meter before a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// VISA resource string; `None` means "first instrument found"
    #[serde(default)]
    pub resource: Option<String>,

    /// Use the built-in mock instrument instead of real hardware
    #[serde(default)]
    pub use_mock: bool,

    /// Source bias current in amperes
    pub bias_current_a: f64,

    /// Integration time in power-line cycles (1-10)
    pub nplc: f64,

    /// Delay before each measurement in seconds
    pub measure_delay_s: f64,

    /// Fixed voltage measurement range in volts
    pub voltage_range_v: f64,

    /// Fixed current measurement range in amperes
    pub current_range_a: f64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            resource: None,
            use_mock: false,
            bias_current_a: 1e-3,
            nplc: 5.0,
            measure_delay_s: 0.1,
            voltage_range_v: 20.0,
            current_range_a: 1e-3,
        }
    }
}

/// Acquisition loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Sleep between iterations, in milliseconds
    pub poll_interval_ms: u64,

    /// Heating-rate window W: the rate is computed over the last W
    /// samples once more than W exist
    pub heating_rate_window: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            heating_rate_window: DEFAULT_HEATING_RATE_WINDOW,
        }
    }
}

impl AcquisitionConfig {
    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Instrument settings
    #[serde(default)]
    pub instrument: InstrumentConfig,

    /// Acquisition loop settings
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

impl AppConfig {
    /// Load the config from disk, falling back to defaults on any
    /// failure (missing file, unreadable, parse error).
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse {:?}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save the config to disk
    pub fn save(&self) -> Result<()> {
        let path = config_path().ok_or_else(|| {
            MonitorError::Config("Could not determine config directory".to_string())
        })?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| MonitorError::Config(format!("Failed to create {:?}: {}", dir, e)))?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| MonitorError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&path, text)?;
        Ok(())
    }
}
