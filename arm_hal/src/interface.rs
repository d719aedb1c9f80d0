//! Register interface: the single owner of the servo register window.
//!
//! `RegisterInterface` wraps one `RegisterDriver`, performs the settle
//! writes when the window is opened, encodes motion commands into register
//! words and guarantees the window is released on every exit path.

use arm_common::axis::{ArmPositions, AxisId};
use arm_common::config::RegistersConfig;
use arm_common::consts::SETTLE_SPEED;
use arm_common::hal::driver::{HalError, RegisterDriver};
use arm_common::hal::register::{encode_word, position_byte};
use tracing::{debug, info, trace, warn};

use crate::driver_registry::DriverRegistry;

/// Owner of the register window.
///
/// Dropping the interface closes the driver. [`RegisterInterface::close`]
/// consumes the interface, so the window can be released at most once.
pub struct RegisterInterface {
    /// Active driver instance
    driver: Box<dyn RegisterDriver>,
    /// Number of stores issued through this interface
    writes: u64,
}

impl RegisterInterface {
    /// Open `driver` and write the settle command for every axis.
    ///
    /// Each axis receives its `start` position with [`SETTLE_SPEED`].
    ///
    /// # Errors
    /// Any error from the driver. If a settle write fails the window is
    /// closed again before the error is returned.
    pub fn open(
        mut driver: Box<dyn RegisterDriver>,
        config: &RegistersConfig,
        start: &ArmPositions,
    ) -> Result<Self, HalError> {
        info!(
            "Opening register window with driver {} v{}",
            driver.name(),
            driver.version()
        );
        driver.open(config)?;

        let mut interface = Self { driver, writes: 0 };
        for (axis, position) in start.iter() {
            interface.write(axis, position, SETTLE_SPEED)?;
        }

        info!("Register window open, start pose settled");
        Ok(interface)
    }

    /// Create the configured driver from `registry` and open it.
    pub fn from_config(
        registry: &DriverRegistry,
        config: &RegistersConfig,
        start: &ArmPositions,
    ) -> Result<Self, HalError> {
        let driver = registry.create_driver(&config.driver)?;
        Self::open(driver, config, start)
    }

    /// Write `(axis, position, speed)` to the axis register.
    ///
    /// The position is truncated to whole degrees and both fields to 8 bits;
    /// bits 16..31 of the word are zero.
    pub fn write(&mut self, axis: AxisId, position: f64, speed: u8) -> Result<(), HalError> {
        let word = encode_word(position_byte(position), speed);
        let offset = axis.spec().offset;
        trace!("{axis} <- {word:#06x} (offset {offset:#x})");
        self.driver.write_word(offset, word)?;
        self.writes += 1;
        Ok(())
    }

    /// Write using the legacy servo number (1..=5).
    ///
    /// Numbers outside the table issue no store and return `Ok(false)`.
    pub fn write_servo(&mut self, number: u8, position: f64, speed: u8) -> Result<bool, HalError> {
        match AxisId::from_servo_number(number) {
            Some(axis) => {
                self.write(axis, position, speed)?;
                Ok(true)
            }
            None => {
                warn!("Ignoring write to unknown servo number {number}");
                Ok(false)
            }
        }
    }

    /// Name of the active driver.
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Number of stores issued since the window was opened, settle writes included.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Release the register window.
    pub fn close(mut self) -> Result<(), HalError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), HalError> {
        if self.driver.is_open() {
            self.driver.close()?;
            debug!("Register window released after {} stores", self.writes);
        }
        Ok(())
    }
}

impl Drop for RegisterInterface {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release register window: {e}");
        }
    }
}
