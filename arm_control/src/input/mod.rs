//! Controller input: buttons, accelerometer samples and the held-button set.
//!
//! The dispatcher talks to an [`InputDevice`]. Two implementations exist:
//! the Wii Remote over Linux evdev ([`evdev::WiimoteInput`]) and a replay of
//! a JSON script ([`script::ScriptedInput`]) for bench runs without a
//! controller.

pub mod evdev;
pub mod script;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of button transitions drained in one cycle.
pub const MAX_BUTTON_EVENTS: usize = 32;

/// Button transitions drained from a device in one cycle, oldest first.
pub type ButtonBatch = heapless::Vec<ButtonEvent, MAX_BUTTON_EVENTS>;

// ─── Buttons ────────────────────────────────────────────────────────

/// Wii Remote buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    A,
    B,
    One,
    Two,
    Up,
    Down,
    Left,
    Right,
    Home,
    Plus,
    Minus,
}

impl Button {
    /// Every button, in flag order.
    pub const ALL: [Button; 11] = [
        Button::A,
        Button::B,
        Button::One,
        Button::Two,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Home,
        Button::Plus,
        Button::Minus,
    ];

    /// Flag of this button in [`HeldButtons`].
    pub const fn flag(self) -> HeldButtons {
        match self {
            Button::A => HeldButtons::A,
            Button::B => HeldButtons::B,
            Button::One => HeldButtons::ONE,
            Button::Two => HeldButtons::TWO,
            Button::Up => HeldButtons::UP,
            Button::Down => HeldButtons::DOWN,
            Button::Left => HeldButtons::LEFT,
            Button::Right => HeldButtons::RIGHT,
            Button::Home => HeldButtons::HOME,
            Button::Plus => HeldButtons::PLUS,
            Button::Minus => HeldButtons::MINUS,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::One => "1",
            Button::Two => "2",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Left => "Left",
            Button::Right => "Right",
            Button::Home => "Home",
            Button::Plus => "Plus",
            Button::Minus => "Minus",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Buttons currently held down.
    ///
    /// Updated from every [`ButtonEvent`]; a press sets the flag, a release
    /// clears it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HeldButtons: u16 {
        const A     = 0x0001;
        const B     = 0x0002;
        const ONE   = 0x0004;
        const TWO   = 0x0008;
        const UP    = 0x0010;
        const DOWN  = 0x0020;
        const LEFT  = 0x0040;
        const RIGHT = 0x0080;
        const HOME  = 0x0100;
        const PLUS  = 0x0200;
        const MINUS = 0x0400;
    }
}

impl HeldButtons {
    /// Fold one transition into the held set.
    #[inline]
    pub fn apply(&mut self, event: ButtonEvent) {
        self.set(event.button.flag(), event.pressed);
    }

    /// Whether `button` is currently held.
    #[inline]
    pub const fn is_held(&self, button: Button) -> bool {
        self.contains(button.flag())
    }
}

/// One button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    /// Which button changed.
    pub button: Button,
    /// `true` on press, `false` on release.
    pub pressed: bool,
}

impl ButtonEvent {
    /// Press of `button`.
    pub const fn press(button: Button) -> Self {
        Self {
            button,
            pressed: true,
        }
    }

    /// Release of `button`.
    pub const fn release(button: Button) -> Self {
        Self {
            button,
            pressed: false,
        }
    }
}

// ─── Accelerometer ──────────────────────────────────────────────────

/// Accelerometer axis of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelAxis {
    X,
    Y,
    Z,
}

/// One accelerometer reading.
///
/// Only X-axis samples drive the arm; the others are read and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelSample {
    /// Axis the value belongs to.
    pub axis: AccelAxis,
    /// Raw signed reading.
    pub value: i32,
}

impl AccelSample {
    /// X-axis sample.
    pub const fn x(value: i32) -> Self {
        Self {
            axis: AccelAxis::X,
            value,
        }
    }

    /// The controlling X value, if this is an X-axis sample.
    #[inline]
    pub fn control_value(&self) -> Option<i32> {
        (self.axis == AccelAxis::X).then_some(self.value)
    }
}

// ─── Device ─────────────────────────────────────────────────────────

/// Input errors.
#[derive(Debug, Error)]
pub enum InputError {
    /// No input node with the expected device name.
    #[error("No input device named '{0}'")]
    DeviceNotFound(String),

    /// An input node could not be opened.
    #[error("Failed to open input device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from an input node failed.
    #[error("Input read failed: {0}")]
    Read(#[from] io::Error),

    /// The input script could not be loaded.
    #[error("Invalid input script {path}: {reason}")]
    Script { path: PathBuf, reason: String },

    /// A replayed script has no frames left.
    #[error("Input script exhausted after {0} frames")]
    ScriptExhausted(usize),
}

/// Source of controller input.
///
/// Construction of an implementation is its initialization; a failure
/// there is fatal at startup.
pub trait InputDevice {
    /// Block until the next accelerometer sample and return it.
    fn read_accel(&mut self) -> Result<AccelSample, InputError>;

    /// Drain every button transition accumulated since the last call.
    ///
    /// Never blocks. Transitions beyond [`MAX_BUTTON_EVENTS`] stay queued
    /// for the next call.
    fn read_buttons(&mut self) -> Result<ButtonBatch, InputError>;

    /// Release the device.
    fn close(&mut self) -> Result<(), InputError>;
}

impl<T: InputDevice + ?Sized> InputDevice for Box<T> {
    fn read_accel(&mut self) -> Result<AccelSample, InputError> {
        (**self).read_accel()
    }

    fn read_buttons(&mut self) -> Result<ButtonBatch, InputError> {
        (**self).read_buttons()
    }

    fn close(&mut self) -> Result<(), InputError> {
        (**self).close()
    }
}
