//! Top-level error type and process exit codes.

use arm_common::config::ConfigError;
use arm_common::hal::driver::HalError;
use std::process::ExitCode;
use thiserror::Error;

use crate::dispatch::LoopError;
use crate::input::InputError;

/// Exit code: controller connection could not be established.
pub const EXIT_INPUT_INIT: u8 = 1;
/// Exit code: register window could not be opened or mapped.
pub const EXIT_HARDWARE_INIT: u8 = 2;
/// Exit code: configuration missing or invalid.
pub const EXIT_CONFIG: u8 = 3;
/// Exit code: the control loop stopped on an error.
pub const EXIT_RUNTIME: u8 = 4;

/// Fatal errors of the arm controller process.
#[derive(Debug, Error)]
pub enum ArmError {
    /// Configuration could not be loaded or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input device initialization failed.
    #[error("Failed to init controller input: {0}")]
    InputInit(#[source] InputError),

    /// Register window initialization failed.
    #[error("Failed to initialize the servos: {0}")]
    HardwareInit(#[source] HalError),

    /// The control loop failed after startup.
    #[error("Control loop failed: {0}")]
    Runtime(#[from] LoopError),
}

impl ArmError {
    /// Raw exit status for this error.
    pub fn code(&self) -> u8 {
        match self {
            ArmError::InputInit(_) => EXIT_INPUT_INIT,
            ArmError::HardwareInit(_) => EXIT_HARDWARE_INIT,
            ArmError::Config(_) => EXIT_CONFIG,
            ArmError::Runtime(_) => EXIT_RUNTIME,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
