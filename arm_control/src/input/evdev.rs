//! Wii Remote input over the Linux evdev interface.
//!
//! The `hid-wiimote` kernel driver exposes the remote as several input
//! nodes. Buttons and the accelerometer are separate nodes, found by the
//! device name published in sysfs:
//!
//! ```text
//! /sys/class/input/eventN/device/name  ──►  /dev/input/eventN
//! ```
//!
//! The button node is opened non-blocking and drained once per cycle. The
//! accelerometer node is read blocking and paces the control loop.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr;

use arm_common::config::InputConfig;
use tracing::{debug, info};

use super::{AccelAxis, AccelSample, Button, ButtonBatch, ButtonEvent, InputDevice, InputError};

/// Device name of the button node.
pub const BUTTONS_DEVICE_NAME: &str = "Nintendo Wii Remote";
/// Device name of the accelerometer node.
pub const ACCEL_DEVICE_NAME: &str = "Nintendo Wii Remote Accelerometer";
/// Where input classes are published.
pub const SYSFS_INPUT_CLASS: &str = "/sys/class/input";
/// Where event nodes live.
pub const DEV_INPUT: &str = "/dev/input";

const EV_KEY: u16 = 0x01;
const EV_ABS: u16 = 0x03;

const ABS_RX: u16 = 0x03;
const ABS_RY: u16 = 0x04;
const ABS_RZ: u16 = 0x05;

const KEY_UP: u16 = 103;
const KEY_LEFT: u16 = 105;
const KEY_RIGHT: u16 = 106;
const KEY_DOWN: u16 = 108;
const KEY_NEXT: u16 = 407;
const KEY_PREVIOUS: u16 = 412;
const BTN_1: u16 = 0x101;
const BTN_2: u16 = 0x102;
const BTN_A: u16 = 0x130;
const BTN_B: u16 = 0x131;
const BTN_MODE: u16 = 0x13c;

const EVENT_SIZE: usize = mem::size_of::<libc::input_event>();

/// A decoded evdev record relevant to the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiimoteEvent {
    Button(ButtonEvent),
    Accel(AccelSample),
}

/// Map an evdev key code to a Wii Remote button.
pub fn button_from_code(code: u16) -> Option<Button> {
    let button = match code {
        KEY_UP => Button::Up,
        KEY_DOWN => Button::Down,
        KEY_LEFT => Button::Left,
        KEY_RIGHT => Button::Right,
        BTN_1 => Button::One,
        BTN_2 => Button::Two,
        BTN_A => Button::A,
        BTN_B => Button::B,
        BTN_MODE => Button::Home,
        KEY_NEXT => Button::Plus,
        KEY_PREVIOUS => Button::Minus,
        _ => return None,
    };
    Some(button)
}

/// Decode one `(type, code, value)` record.
///
/// Key records with value 0 are releases; any other value is a press.
/// Sync records and unknown codes decode to `None`.
pub fn decode(kind: u16, code: u16, value: i32) -> Option<WiimoteEvent> {
    match kind {
        EV_KEY => button_from_code(code).map(|button| {
            WiimoteEvent::Button(ButtonEvent {
                button,
                pressed: value != 0,
            })
        }),
        EV_ABS => {
            let axis = match code {
                ABS_RX => AccelAxis::X,
                ABS_RY => AccelAxis::Y,
                ABS_RZ => AccelAxis::Z,
                _ => return None,
            };
            Some(WiimoteEvent::Accel(AccelSample { axis, value }))
        }
        _ => None,
    }
}

/// Read one raw record. `Ok(None)` when a non-blocking reader has nothing queued.
fn read_record<R: Read>(reader: &mut R) -> io::Result<Option<libc::input_event>> {
    let mut buf = [0u8; EVENT_SIZE];
    match reader.read_exact(&mut buf) {
        // SAFETY: `input_event` is plain old data and `buf` holds exactly
        // one record as written by the kernel.
        Ok(()) => Ok(Some(unsafe {
            ptr::read_unaligned(buf.as_ptr().cast::<libc::input_event>())
        })),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}

/// Find the `/dev/input/eventN` node whose sysfs name equals `name`.
///
/// `class_dir` is normally [`SYSFS_INPUT_CLASS`]; candidates are scanned in
/// name order so the result is stable when several remotes are paired.
pub fn find_event_node(class_dir: &Path, name: &str) -> Result<PathBuf, InputError> {
    let entries = fs::read_dir(class_dir).map_err(|source| InputError::Open {
        path: class_dir.to_path_buf(),
        source,
    })?;

    let mut events: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|file| file.starts_with("event"))
        .collect();
    events.sort();

    events
        .into_iter()
        .find(|event| {
            fs::read_to_string(class_dir.join(event).join("device/name"))
                .is_ok_and(|device| device.trim_end() == name)
        })
        .map(|event| Path::new(DEV_INPUT).join(event))
        .ok_or_else(|| InputError::DeviceNotFound(name.to_string()))
}

fn open_node(path: &Path, nonblocking: bool) -> Result<File, InputError> {
    let mut options = OpenOptions::new();
    options.read(true);
    if nonblocking {
        options.custom_flags(libc::O_NONBLOCK);
    }
    options.open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Wii Remote connected through evdev.
pub struct WiimoteInput<R = File> {
    buttons: Option<R>,
    accel: Option<R>,
}

impl WiimoteInput<File> {
    /// Open both nodes. Explicit paths from `config` win over discovery.
    pub fn open(config: &InputConfig) -> Result<Self, InputError> {
        let class_dir = Path::new(SYSFS_INPUT_CLASS);
        let buttons_path = match &config.buttons {
            Some(path) => path.clone(),
            None => find_event_node(class_dir, BUTTONS_DEVICE_NAME)?,
        };
        let accel_path = match &config.accel {
            Some(path) => path.clone(),
            None => find_event_node(class_dir, ACCEL_DEVICE_NAME)?,
        };

        let buttons = open_node(&buttons_path, true)?;
        let accel = open_node(&accel_path, false)?;
        info!(
            "Wii Remote connected (buttons {}, accelerometer {})",
            buttons_path.display(),
            accel_path.display()
        );
        Ok(Self::from_readers(buttons, accel))
    }
}

impl<R: Read> WiimoteInput<R> {
    /// Build from already-open readers. The button reader must not block.
    pub fn from_readers(buttons: R, accel: R) -> Self {
        Self {
            buttons: Some(buttons),
            accel: Some(accel),
        }
    }
}

impl<R: Read> InputDevice for WiimoteInput<R> {
    fn read_accel(&mut self) -> Result<AccelSample, InputError> {
        let reader = self
            .accel
            .as_mut()
            .ok_or_else(|| io::Error::from(ErrorKind::NotConnected))?;
        loop {
            let Some(record) = read_record(reader)? else {
                continue;
            };
            if let Some(WiimoteEvent::Accel(sample)) =
                decode(record.type_, record.code, record.value)
            {
                return Ok(sample);
            }
        }
    }

    fn read_buttons(&mut self) -> Result<ButtonBatch, InputError> {
        let reader = self
            .buttons
            .as_mut()
            .ok_or_else(|| io::Error::from(ErrorKind::NotConnected))?;
        let mut batch = ButtonBatch::new();
        while !batch.is_full() {
            let Some(record) = read_record(reader)? else {
                break;
            };
            if let Some(WiimoteEvent::Button(event)) =
                decode(record.type_, record.code, record.value)
            {
                // Capacity checked by the loop condition.
                let _ = batch.push(event);
            }
        }
        Ok(batch)
    }

    fn close(&mut self) -> Result<(), InputError> {
        let buttons = self.buttons.take();
        let accel = self.accel.take();
        if buttons.is_some() || accel.is_some() {
            debug!("Wii Remote input nodes closed");
        }
        Ok(())
    }
}
