//! Arm Common Library
//!
//! This crate provides the shared constants, the static axis table, the
//! register word encoding and configuration loading used by every crate
//! in the servo arm workspace.
//!
//! # Module Structure
//!
//! - [`axis`] - Axis identities, the axis table and the boundary checker
//! - [`hal`] - Register driver trait, error types and word encoding
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Register window constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use arm_common::prelude::*;
//!
//! let base = AxisId::Base.spec();
//! assert!(base.check(105.0, Direction::Decrease));
//! ```

pub mod axis;
pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
