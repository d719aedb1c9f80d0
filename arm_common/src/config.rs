//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the TOML configuration
//! file of the arm controller.
//!
//! # Usage
//!
//! ```rust,no_run
//! use arm_common::config::{ArmConfig, ConfigLoader, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ArmConfig::load(Path::new("arm.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::axis::{ArmPositions, AxisId, AXIS_TABLE};
use crate::consts::{BASE_ADDRESS, DEFAULT_DEVICE, MAP_LEN, REGISTER_WIDTH};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "arm-control"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "arm-control".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Register window configuration (`[registers]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistersConfig {
    /// Register driver to load ("devmem" or "simulation").
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Device node backing physical memory access.
    #[serde(default = "default_device")]
    pub device: PathBuf,

    /// Physical base address of the register window.
    #[serde(default = "default_base_address")]
    pub base_address: u64,

    /// Length of the mapped window in bytes.
    #[serde(default = "default_map_len")]
    pub map_len: usize,
}

fn default_driver() -> String {
    "devmem".to_string()
}

fn default_device() -> PathBuf {
    PathBuf::from(DEFAULT_DEVICE)
}

fn default_base_address() -> u64 {
    BASE_ADDRESS
}

fn default_map_len() -> usize {
    MAP_LEN
}

impl Default for RegistersConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            device: default_device(),
            base_address: default_base_address(),
            map_len: default_map_len(),
        }
    }
}

impl RegistersConfig {
    /// Validate the register window.
    ///
    /// # Validation Rules
    /// 1. `driver` is not empty
    /// 2. `map_len` covers every axis register
    /// 3. `base_address` is page aligned
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "registers.driver cannot be empty".to_string(),
            ));
        }

        let required = AXIS_TABLE
            .iter()
            .map(|spec| spec.offset + REGISTER_WIDTH)
            .max()
            .unwrap_or(0);
        if self.map_len < required {
            return Err(ConfigError::ValidationError(format!(
                "registers.map_len {:#x} does not cover register window (need {:#x})",
                self.map_len, required
            )));
        }

        let page = page_size();
        if self.base_address % page != 0 {
            return Err(ConfigError::ValidationError(format!(
                "registers.base_address {:#x} is not aligned to page size {:#x}",
                self.base_address, page
            )));
        }
        Ok(())
    }
}

/// System page size, falling back to 4 KiB when it cannot be queried.
fn page_size() -> u64 {
    use nix::unistd::{sysconf, SysconfVar};
    match sysconf(SysconfVar::PAGE_SIZE) {
        Ok(Some(size)) if size > 0 => size as u64,
        _ => 0x1000,
    }
}

/// Source of controller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// Wii Remote through the Linux evdev interface.
    #[default]
    Wiimote,
    /// Replay of a JSON input script.
    Script,
}

/// Input collaborator configuration (`[input]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Where input comes from.
    #[serde(default)]
    pub source: InputSource,

    /// Explicit evdev node for buttons. Discovered by name when omitted.
    #[serde(default)]
    pub buttons: Option<PathBuf>,

    /// Explicit evdev node for the accelerometer. Discovered by name when omitted.
    #[serde(default)]
    pub accel: Option<PathBuf>,

    /// Script replayed when `source = "script"`.
    #[serde(default)]
    pub script: Option<PathBuf>,
}

impl InputConfig {
    /// Validate the input section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source == InputSource::Script && self.script.is_none() {
            return Err(ConfigError::ValidationError(
                "input.script is required when input.source = \"script\"".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration of the arm controller (`arm.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Common fields.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Register window.
    #[serde(default)]
    pub registers: RegistersConfig,

    /// Input collaborator.
    #[serde(default)]
    pub input: InputConfig,

    /// Start pose overrides.
    #[serde(default)]
    pub start: StartPose,
}

/// Optional per-axis start positions (`[start]`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StartPose {
    pub base: Option<f64>,
    pub bicep: Option<f64>,
    pub elbow: Option<f64>,
    pub wrist: Option<f64>,
    pub gripper: Option<f64>,
}

impl StartPose {
    /// Override for `axis`, if any.
    pub fn get(&self, axis: AxisId) -> Option<f64> {
        match axis {
            AxisId::Base => self.base,
            AxisId::Bicep => self.bicep,
            AxisId::Elbow => self.elbow,
            AxisId::Wrist => self.wrist,
            AxisId::Gripper => self.gripper,
        }
    }

    /// Set the override for `axis`.
    pub fn set(&mut self, axis: AxisId, position: f64) {
        let slot = match axis {
            AxisId::Base => &mut self.base,
            AxisId::Bicep => &mut self.bicep,
            AxisId::Elbow => &mut self.elbow,
            AxisId::Wrist => &mut self.wrist,
            AxisId::Gripper => &mut self.gripper,
        };
        *slot = Some(position);
    }

    /// Iterate the overrides that are set.
    pub fn iter(&self) -> impl Iterator<Item = (AxisId, f64)> + '_ {
        AxisId::ALL
            .into_iter()
            .filter_map(|axis| self.get(axis).map(|position| (axis, position)))
    }
}

impl ArmConfig {
    /// Validate every section.
    ///
    /// Start overrides must be legal positions of their axis.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.registers.validate()?;
        self.input.validate()?;

        for (axis, position) in self.start.iter() {
            if !axis.spec().accepts(position) {
                return Err(ConfigError::ValidationError(format!(
                    "start.{axis} = {position} is not a legal position of the axis"
                )));
            }
        }
        Ok(())
    }

    /// Start pose: the axis table start column with overrides applied.
    pub fn start_positions(&self) -> ArmPositions {
        let mut positions = ArmPositions::start();
        for (axis, position) in self.start.iter() {
            positions.set(axis, position);
        }
        positions
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
