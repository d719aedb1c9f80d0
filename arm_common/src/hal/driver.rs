//! Register driver trait and error types.
//!
//! This module defines:
//! - `RegisterDriver` trait - Interface for pluggable register backends
//! - `HalError` enum - Error types for register operations
//! - `DriverFactory` type alias - Factory function type

use crate::config::RegistersConfig;
use thiserror::Error;

/// Error types for register operations.
#[derive(Debug, Error)]
pub enum HalError {
    /// Backing device could not be opened
    #[error("Failed to open {path}: {source}")]
    DeviceOpen {
        /// Device path
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Physical window could not be mapped
    #[error("Failed to map {len:#x} bytes at {address:#x}: {source}")]
    MapFailed {
        /// Physical base address
        address: u64,
        /// Window length in bytes
        len: usize,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A hardware mapping is already live in this process
    #[error("Register window already mapped in this process")]
    AlreadyMapped,

    /// Operation requires an open driver
    #[error("Register driver not open")]
    NotOpen,

    /// Register access outside the mapped window
    #[error("Register offset {offset:#x} outside window of {len:#x} bytes")]
    OutOfWindow {
        /// Requested offset
        offset: usize,
        /// Window length
        len: usize,
    },

    /// Register access not aligned to a 32-bit word
    #[error("Register offset {offset:#x} not aligned to 4 bytes")]
    Misaligned {
        /// Requested offset
        offset: usize,
    },

    /// Hardware write rejected by the backend
    #[error("Register write failed: {0}")]
    WriteFailed(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn RegisterDriver>;

/// Trait defining the interface for register drivers.
///
/// `RegisterInterface` manages drivers through this trait, so the same
/// controller runs against `/dev/mem` or an in-memory simulation.
///
/// # Lifecycle
///
/// 1. `open()` - Called once before the first write
/// 2. `write_word()` - Called for every motion command
/// 3. `close()` - Called once when the interface is released
pub trait RegisterDriver: Send {
    /// Returns the driver's unique identifier (e.g., "devmem", "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Acquire the register window described by `config`.
    ///
    /// # Errors
    /// `HalError::DeviceOpen` / `HalError::MapFailed` when the backing
    /// device cannot be opened or mapped, `HalError::AlreadyMapped` when a
    /// mapping is already live.
    fn open(&mut self, config: &RegistersConfig) -> Result<(), HalError>;

    /// Store one 32-bit word at `offset` bytes from the window base.
    ///
    /// The store is a single aligned word write.
    fn write_word(&mut self, offset: usize, word: u32) -> Result<(), HalError>;

    /// Release the register window. Calling it on a closed driver is a no-op.
    fn close(&mut self) -> Result<(), HalError>;

    /// Whether the window is currently acquired.
    fn is_open(&self) -> bool;
}

/// Validate a word access against a window of `len` bytes.
pub fn check_word_access(offset: usize, len: usize) -> Result<(), HalError> {
    if offset % 4 != 0 {
        return Err(HalError::Misaligned { offset });
    }
    if offset.checked_add(4).is_none_or(|end| end > len) {
        return Err(HalError::OutOfWindow { offset, len });
    }
    Ok(())
}
