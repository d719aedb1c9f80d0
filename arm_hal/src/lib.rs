//! # Arm HAL Library
//!
//! Register interface for the servo controller with a pluggable driver
//! architecture. Drivers implement the `RegisterDriver` trait defined in
//! `arm_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`interface`] - `RegisterInterface`, the single owner of the register window
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Register driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  arm_hal (single crate)                 │
//! │  ┌────────────────────┐       ┌──────────────────────┐  │
//! │  │ RegisterInterface  │◄─────►│   Driver Registry    │  │
//! │  │ (settle, encode)   │       │                      │  │
//! │  └─────────┬──────────┘       └──────────────────────┘  │
//! │            │                                            │
//! │            ▼                                            │
//! │   ┌────────────────┐   ┌──────────┐   ┌────────────┐    │
//! │   │ RegisterDriver │──►│  devmem  │   │ simulation │    │
//! │   │ trait          │   │ /dev/mem │   │ (in-memory)│    │
//! │   └────────────────┘   └──────────┘   └────────────┘    │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;
pub mod interface;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::interface::RegisterInterface;
