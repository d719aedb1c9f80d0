//! # Arm Control Library
//!
//! Event-driven controller for a five-axis servo arm steered from a
//! handheld controller. Every input cycle reads one accelerometer sample,
//! drains the button events accumulated since the previous cycle and
//! decides which axis to move, by how much, or whether to run the throw
//! script instead of manual control.
//!
//! ## Layers
//!
//! 1. **Input**: [`input`], button/accelerometer collaborators (evdev Wii
//!    Remote, scripted replay) and the held-button state
//! 2. **Motion**: [`motion`], boundary-checked incremental moves and the
//!    absolute accelerometer path, on top of `arm_hal::RegisterInterface`
//! 3. **Throw**: [`throw`], the fixed, blocking throw script
//! 4. **Dispatch**: [`dispatch`], the `Running → Terminated` loop with the
//!    first-match-wins priority chains
//!
//! Everything runs on one thread; the only suspension points are the
//! blocking accelerometer read and the pauses inside the throw script.

pub mod dispatch;
pub mod error;
pub mod input;
pub mod motion;
pub mod throw;

use std::path::Path;

use arm_common::config::{ArmConfig, ConfigError, ConfigLoader, InputConfig, InputSource};
use arm_common::consts::DEFAULT_CONFIG_PATH;
use arm_common::hal::driver::HalError;
use arm_hal::{DriverRegistry, RegisterInterface};
use tracing::info;

use crate::input::evdev::WiimoteInput;
use crate::input::script::ScriptedInput;
use crate::input::{InputDevice, InputError};
use crate::motion::MotionController;

/// Load `arm.toml`.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
/// tried and built-in defaults are used when it is absent. The result is
/// not validated here so callers can apply overrides first.
pub fn load_config(path: Option<&Path>) -> Result<ArmConfig, ConfigError> {
    match path {
        Some(path) => ArmConfig::load(path),
        None => match ArmConfig::load(Path::new(DEFAULT_CONFIG_PATH)) {
            Err(ConfigError::FileNotFound) => Ok(ArmConfig::default()),
            other => other,
        },
    }
}

/// Create the configured input device.
pub fn open_input(config: &InputConfig) -> Result<Box<dyn InputDevice>, InputError> {
    match (config.source, &config.script) {
        (InputSource::Wiimote, _) => Ok(Box::new(WiimoteInput::open(config)?)),
        (InputSource::Script, Some(path)) => Ok(Box::new(ScriptedInput::load(path)?)),
        (InputSource::Script, None) => Err(InputError::Script {
            path: Default::default(),
            reason: "no script configured".to_string(),
        }),
    }
}

/// Open the configured register window and wrap it in a motion controller.
///
/// The start pose (axis table start column plus `[start]` overrides) is
/// settled on the hardware and becomes the controller's position record.
pub fn open_arm(config: &ArmConfig, registry: &DriverRegistry) -> Result<MotionController, HalError> {
    let start = config.start_positions();
    let registers = RegisterInterface::from_config(registry, &config.registers, &start)?;
    info!(
        "Servos initialized through {} driver",
        registers.driver_name()
    );
    Ok(MotionController::new(registers, start))
}
