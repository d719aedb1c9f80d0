//! Simulation register driver.
//!
//! Keeps the register window in memory and records every store so that
//! bench runs and tests can inspect exactly what the controller wrote.
//! A [`SimulationProbe`] obtained before the driver is handed to the
//! `RegisterInterface` stays connected to the same bank.

use arm_common::config::RegistersConfig;
use arm_common::hal::driver::{check_word_access, HalError, RegisterDriver};
use arm_common::hal::register::RegisterWord;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// One recorded register store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Byte offset from the window base.
    pub offset: usize,
    /// Stored word.
    pub word: RegisterWord,
}

#[derive(Debug, Default)]
struct Bank {
    open: bool,
    words: Vec<u32>,
    log: Vec<RegisterWrite>,
    open_count: u32,
    close_count: u32,
    fail_writes_after: Option<usize>,
}

/// Simulation driver implementing the `RegisterDriver` trait.
pub struct SimulationDriver {
    bank: Arc<Mutex<Bank>>,
}

/// Read-side handle onto a [`SimulationDriver`]'s register bank.
#[derive(Clone)]
pub struct SimulationProbe {
    bank: Arc<Mutex<Bank>>,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new() -> Self {
        Self {
            bank: Arc::new(Mutex::new(Bank::default())),
        }
    }

    /// Handle for inspecting the bank after the driver has been moved.
    pub fn probe(&self) -> SimulationProbe {
        SimulationProbe {
            bank: Arc::clone(&self.bank),
        }
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationProbe {
    /// Every store since the driver was created, oldest first.
    pub fn writes(&self) -> Vec<RegisterWrite> {
        self.bank.lock().log.clone()
    }

    /// Number of stores recorded.
    pub fn write_count(&self) -> usize {
        self.bank.lock().log.len()
    }

    /// Current word at `offset`, if the bank is allocated and the offset valid.
    pub fn word_at(&self, offset: usize) -> Option<RegisterWord> {
        let bank = self.bank.lock();
        bank.words.get(offset / 4).copied().map(RegisterWord)
    }

    /// Whether the window is currently open.
    pub fn is_open(&self) -> bool {
        self.bank.lock().open
    }

    /// `(opens, closes)` performed on the driver.
    pub fn lifecycle_counts(&self) -> (u32, u32) {
        let bank = self.bank.lock();
        (bank.open_count, bank.close_count)
    }

    /// Make every store after the next `count` successful ones fail.
    pub fn fail_writes_after(&self, count: usize) {
        let mut bank = self.bank.lock();
        let done = bank.log.len();
        bank.fail_writes_after = Some(done + count);
    }
}

impl RegisterDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn open(&mut self, config: &RegistersConfig) -> Result<(), HalError> {
        let mut bank = self.bank.lock();
        if bank.open {
            return Err(HalError::AlreadyMapped);
        }
        bank.words = vec![0; config.map_len / 4];
        bank.open = true;
        bank.open_count += 1;
        info!(
            "Simulation register bank opened ({:#x} bytes, base {:#x})",
            config.map_len, config.base_address
        );
        Ok(())
    }

    fn write_word(&mut self, offset: usize, word: u32) -> Result<(), HalError> {
        let mut bank = self.bank.lock();
        if !bank.open {
            return Err(HalError::NotOpen);
        }
        check_word_access(offset, bank.words.len() * 4)?;
        if bank.fail_writes_after.is_some_and(|limit| bank.log.len() >= limit) {
            return Err(HalError::WriteFailed(format!(
                "simulated fault at offset {offset:#x}"
            )));
        }

        bank.words[offset / 4] = word;
        let write = RegisterWrite {
            offset,
            word: RegisterWord(word),
        };
        debug!("sim store {:#05x} <- {}", offset, write.word);
        bank.log.push(write);
        Ok(())
    }

    fn close(&mut self) -> Result<(), HalError> {
        let mut bank = self.bank.lock();
        if bank.open {
            bank.open = false;
            bank.close_count += 1;
            info!("Simulation register bank closed after {} stores", bank.log.len());
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.bank.lock().open
    }
}

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn RegisterDriver> {
    Box::new(SimulationDriver::new())
}
