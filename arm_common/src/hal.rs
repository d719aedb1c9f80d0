//! Register interface types shared by the HAL and the controller.
//!
//! This module contains the driver trait, the error type and the register
//! word encoding used to command the servo controller.

pub mod driver;
pub mod register;
