//! `/dev/mem` register driver.
//!
//! Maps the physical register window of the servo controller into the
//! process and performs volatile 32-bit stores into it. At most one
//! mapping may be live per process; a second `open()` anywhere in the
//! process fails with `HalError::AlreadyMapped` until the first mapping
//! is closed.

use arm_common::config::RegistersConfig;
use arm_common::hal::driver::{check_word_access, HalError, RegisterDriver};
use memmap2::{MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Set while a mapping is live anywhere in the process.
static MAPPING_LIVE: AtomicBool = AtomicBool::new(false);

/// Process-wide claim on the register window.
struct MappingToken(());

impl MappingToken {
    fn acquire() -> Result<Self, HalError> {
        MAPPING_LIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| MappingToken(()))
            .map_err(|_| HalError::AlreadyMapped)
    }
}

impl Drop for MappingToken {
    fn drop(&mut self) {
        MAPPING_LIVE.store(false, Ordering::SeqCst);
    }
}

/// A live mapping. Fields drop in order: unmap, close the device, release the claim.
struct Mapping {
    mmap: MmapMut,
    _file: File,
    _token: MappingToken,
}

/// Register driver backed by a memory mapping of a device node.
pub struct DevMemDriver {
    mapping: Option<Mapping>,
}

impl DevMemDriver {
    /// Create a closed driver.
    pub fn new() -> Self {
        Self { mapping: None }
    }
}

impl Default for DevMemDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterDriver for DevMemDriver {
    fn name(&self) -> &'static str {
        "devmem"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn open(&mut self, config: &RegistersConfig) -> Result<(), HalError> {
        if self.mapping.is_some() {
            return Err(HalError::AlreadyMapped);
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&config.device)
            .map_err(|source| HalError::DeviceOpen {
                path: config.device.display().to_string(),
                source,
            })?;
        let token = MappingToken::acquire()?;

        // SAFETY: the window is device memory owned by this process for the
        // lifetime of the mapping; nothing else in the process aliases it.
        let mmap = unsafe {
            MmapOptions::new()
                .offset(config.base_address)
                .len(config.map_len)
                .map_mut(&file)
        }
        .map_err(|source| HalError::MapFailed {
            address: config.base_address,
            len: config.map_len,
            source,
        })?;

        info!(
            "Mapped {:#x} bytes at {:#x} from {}",
            config.map_len,
            config.base_address,
            config.device.display()
        );

        self.mapping = Some(Mapping {
            mmap,
            _file: file,
            _token: token,
        });
        Ok(())
    }

    fn write_word(&mut self, offset: usize, word: u32) -> Result<(), HalError> {
        let mapping = self.mapping.as_mut().ok_or(HalError::NotOpen)?;
        check_word_access(offset, mapping.mmap.len())?;

        // SAFETY: offset is word aligned and inside the mapping (checked above),
        // and the mapping base is page aligned.
        unsafe {
            let register = mapping.mmap.as_mut_ptr().add(offset).cast::<u32>();
            register.write_volatile(word);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), HalError> {
        if self.mapping.take().is_some() {
            debug!("Register window unmapped");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.mapping.is_some()
    }
}

/// Factory function to create a devmem driver instance.
pub fn create_driver() -> Box<dyn RegisterDriver> {
    Box::new(DevMemDriver::new())
}
