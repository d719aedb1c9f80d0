//! Register driver implementations.
//!
//! - [`devmem`] - Physical register window mapped through `/dev/mem`
//! - [`simulation`] - In-memory register bank for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `RegisterDriver` trait from `arm_common::hal::driver`
//! 3. Register the driver in [`register_all_drivers`]

pub mod devmem;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("devmem", devmem::create_driver);
    registry.register("simulation", simulation::create_driver);
}
