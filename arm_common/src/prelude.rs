//! Prelude module for common re-exports.
//!
//! Consumers can do `use arm_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Axes ───────────────────────────────────────────────────────────
pub use crate::axis::{ArmPositions, AxisId, AxisSpec, Direction, Limits, AXIS_TABLE};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ArmConfig, ConfigError, ConfigLoader, InputConfig, InputSource, LogLevel, RegistersConfig,
    SharedConfig, StartPose,
};

// ─── Register interface ─────────────────────────────────────────────
pub use crate::consts::{AXIS_COUNT, SETTLE_SPEED};
pub use crate::hal::driver::{DriverFactory, HalError, RegisterDriver};
pub use crate::hal::register::{encode_word, position_byte, RegisterWord};
