pub mod env;

pub use env::{KERNEL_DIR_ENV, load_dotenv};

use crate::error::config::ConfigError;
use crate::transport::DEFAULT_CONNECT_TIMEOUT;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
const DEFAULT_KERNEL_DIR: &str = "/usr/local/share/jupyter/kernels/python3";

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

/// What to do with broadcast messages whose signature does not verify.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InboundVerification {
    /// Accept without checking.
    Ignore,

    /// Check, log a warning on mismatch, accept anyway.
    #[default]
    Warn,

    /// Check and drop mismatching messages.
    Reject,
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KernelConfig {
    /// Directory holding the `kernel.json` to launch.
    #[serde(default = "default_kernel_dir")]
    pub kernel_dir: PathBuf,

    /// Interpreter that replaces a bare `python`/`python3` in the kernel argv.
    pub interpreter: Option<PathBuf>,

    /// Where connection files are written.
    pub runtime_dir: Option<PathBuf>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            kernel_dir: default_kernel_dir(),
            interpreter: None,
            runtime_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "default_run_timeout_ms")]
    pub run_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_terminate_timeout_ms")]
    pub terminate_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            run_timeout_ms: default_run_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            terminate_timeout_ms: default_terminate_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl TimingConfig {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn terminate_timeout(&self) -> Duration {
        Duration::from_millis(self.terminate_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityConfig {
    #[serde(default)]
    pub inbound_verification: InboundVerification,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub kernel: KernelConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            kernel: KernelConfig::default(),
            timing: TimingConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_kernel_dir() -> PathBuf {
    PathBuf::from(DEFAULT_KERNEL_DIR)
}
fn default_run_timeout_ms() -> u64 {
    60_000
}
fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}
fn default_terminate_timeout_ms() -> u64 {
    5_000
}
fn default_poll_interval_ms() -> u64 {
    10
}

// ============================================
// IMPLEMENTATION
// ============================================

impl RunnerConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(RunnerConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    #[track_caller]
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: RunnerConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - Validation fails
    /// - Directory creation fails
    /// - Serialization fails
    /// - Write or rename fails
    #[track_caller]
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                    self.version
                ),
            });
        }

        if self.kernel.kernel_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "kernel_dir cannot be empty".to_string(),
            });
        }

        let timing = &self.timing;
        for (name, value) in [
            ("run_timeout_ms", timing.run_timeout_ms),
            ("connect_timeout_ms", timing.connect_timeout_ms),
            ("terminate_timeout_ms", timing.terminate_timeout_ms),
            ("poll_interval_ms", timing.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("{name} must be greater than zero"),
                });
            }
        }

        if timing.poll_interval_ms > timing.run_timeout_ms {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "poll_interval_ms ({}) exceeds run_timeout_ms ({})",
                    timing.poll_interval_ms, timing.run_timeout_ms
                ),
            });
        }

        Ok(())
    }

    /// Apply environment overrides (`KERNEL_DIR`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(kernel_dir) = env::kernel_dir_override() {
            info!("Using kernel directory from {KERNEL_DIR_ENV}: {}", kernel_dir.display());
            self.kernel.kernel_dir = kernel_dir;
        }
        self
    }
}
