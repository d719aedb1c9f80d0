//! Register window constants.
//!
//! Single source of truth for the physical register layout of the servo
//! controller. Imported by all crates; do not duplicate them elsewhere.

use static_assertions::const_assert;

/// Physical base address of the servo register window.
pub const BASE_ADDRESS: u64 = 0x400D_0000;

/// Length of the mapped window (one page).
///
/// Must cover the highest register offset plus one word.
pub const MAP_LEN: usize = 0x1000;

/// Default device node backing physical memory access.
pub const DEFAULT_DEVICE: &str = "/dev/mem";

/// Register offset of the Base servo.
pub const BASE_OFFSET: usize = 0x100;
/// Register offset of the Bicep servo.
pub const BICEP_OFFSET: usize = 0x104;
/// Register offset of the Elbow servo.
pub const ELBOW_OFFSET: usize = 0x108;
/// Register offset of the Wrist servo.
pub const WRIST_OFFSET: usize = 0x10C;
/// Register offset of the Gripper servo.
pub const GRIPPER_OFFSET: usize = 0x110;

/// Width of one servo register in bytes.
pub const REGISTER_WIDTH: usize = 4;

/// Speed written with the start pose when the window is first opened.
pub const SETTLE_SPEED: u8 = 10;

/// Number of controllable axes.
pub const AXIS_COUNT: usize = 5;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/arm/arm.toml";

const_assert!(GRIPPER_OFFSET + REGISTER_WIDTH <= MAP_LEN);
const_assert!(BASE_OFFSET % REGISTER_WIDTH == 0);
const_assert!(BICEP_OFFSET % REGISTER_WIDTH == 0);
const_assert!(ELBOW_OFFSET % REGISTER_WIDTH == 0);
const_assert!(WRIST_OFFSET % REGISTER_WIDTH == 0);
const_assert!(GRIPPER_OFFSET % REGISTER_WIDTH == 0);
