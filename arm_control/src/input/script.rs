//! Replay of a recorded input script.
//!
//! A script is a JSON document listing one frame per control-loop
//! iteration:
//!
//! ```json
//! {
//!   "frames": [
//!     { "accel": 0 },
//!     { "accel": 0, "buttons": [{ "button": "up", "pressed": true }], "repeat": 10 },
//!     { "buttons": [{ "button": "home", "pressed": true }] }
//!   ]
//! }
//! ```
//!
//! `accel` is an X-axis reading. Frames without one yield a Z-axis sample,
//! which moves nothing. `repeat` replays the frame that many times; its
//! button transitions are delivered on the first replay only.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    AccelAxis, AccelSample, ButtonBatch, ButtonEvent, InputDevice, InputError, MAX_BUTTON_EVENTS,
};

/// One scripted iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFrame {
    /// Accelerometer X reading for the iteration.
    #[serde(default)]
    pub accel: Option<i32>,
    /// Button transitions delivered before the reading is acted upon.
    #[serde(default)]
    pub buttons: Vec<ButtonEvent>,
    /// Number of consecutive iterations this frame covers.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

fn default_repeat() -> u32 {
    1
}

impl ScriptFrame {
    /// Frame reading `value` on the X axis with no button activity.
    pub fn accel(value: i32) -> Self {
        Self {
            accel: Some(value),
            repeat: 1,
            ..Default::default()
        }
    }

    /// Frame delivering `buttons` with a neutral reading.
    pub fn buttons(buttons: impl IntoIterator<Item = ButtonEvent>) -> Self {
        Self {
            buttons: buttons.into_iter().collect(),
            repeat: 1,
            ..Default::default()
        }
    }

    /// Same frame replayed `count` times.
    pub fn repeated(mut self, count: u32) -> Self {
        self.repeat = count;
        self
    }

    fn sample(&self) -> AccelSample {
        match self.accel {
            Some(value) => AccelSample::x(value),
            None => AccelSample {
                axis: AccelAxis::Z,
                value: 0,
            },
        }
    }
}

/// On-disk script document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputScript {
    pub frames: Vec<ScriptFrame>,
}

/// [`InputDevice`] replaying an [`InputScript`].
///
/// Each [`read_accel`](InputDevice::read_accel) advances one iteration and
/// queues that iteration's button transitions for the following
/// [`read_buttons`](InputDevice::read_buttons). Reading past the last frame
/// fails with [`InputError::ScriptExhausted`].
#[derive(Debug)]
pub struct ScriptedInput {
    frames: VecDeque<ScriptFrame>,
    pending: VecDeque<ButtonEvent>,
    replayed: usize,
    closed: bool,
}

impl ScriptedInput {
    /// Replay `frames` in order.
    pub fn new(frames: impl IntoIterator<Item = ScriptFrame>) -> Self {
        Self {
            frames: frames.into_iter().filter(|f| f.repeat > 0).collect(),
            pending: VecDeque::new(),
            replayed: 0,
            closed: false,
        }
    }

    /// Load a JSON script from `path`.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = fs::read_to_string(path).map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let script: InputScript =
            serde_json::from_str(&text).map_err(|e| InputError::Script {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let input = Self::new(script.frames);
        info!(
            "Replaying input script {} ({} iterations)",
            path.display(),
            input.remaining()
        );
        Ok(input)
    }

    /// Iterations left to replay.
    pub fn remaining(&self) -> usize {
        self.frames.iter().map(|f| f.repeat as usize).sum()
    }

    /// Iterations replayed so far.
    pub fn replayed(&self) -> usize {
        self.replayed
    }
}

impl InputDevice for ScriptedInput {
    fn read_accel(&mut self) -> Result<AccelSample, InputError> {
        let Some(frame) = self.frames.front_mut() else {
            return Err(InputError::ScriptExhausted(self.replayed));
        };

        self.pending.extend(frame.buttons.drain(..));
        let sample = frame.sample();
        frame.repeat -= 1;
        if frame.repeat == 0 {
            self.frames.pop_front();
        }
        self.replayed += 1;
        Ok(sample)
    }

    fn read_buttons(&mut self) -> Result<ButtonBatch, InputError> {
        let take = self.pending.len().min(MAX_BUTTON_EVENTS);
        let mut batch = ButtonBatch::new();
        for event in self.pending.drain(..take) {
            // `take` never exceeds the batch capacity.
            let _ = batch.push(event);
        }
        Ok(batch)
    }

    fn close(&mut self) -> Result<(), InputError> {
        if !self.closed {
            self.closed = true;
            debug!(
                "Input script closed after {} iterations ({} unplayed)",
                self.replayed,
                self.remaining()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Button;
    use std::io::Write;

    #[test]
    fn frames_replay_in_order() {
        let mut input = ScriptedInput::new([
            ScriptFrame::accel(10).repeated(2),
            ScriptFrame::buttons([ButtonEvent::press(Button::Home)]),
        ]);
        assert_eq!(input.remaining(), 3);

        assert_eq!(input.read_accel().unwrap(), AccelSample::x(10));
        assert!(input.read_buttons().unwrap().is_empty());
        assert_eq!(input.read_accel().unwrap(), AccelSample::x(10));

        let sample = input.read_accel().unwrap();
        assert_eq!(sample.control_value(), None);
        assert_eq!(
            input.read_buttons().unwrap().as_slice(),
            &[ButtonEvent::press(Button::Home)]
        );

        assert!(matches!(
            input.read_accel(),
            Err(InputError::ScriptExhausted(3))
        ));
    }

    #[test]
    fn repeated_frame_delivers_buttons_once() {
        let mut input = ScriptedInput::new([ScriptFrame {
            accel: Some(-20),
            buttons: vec![ButtonEvent::press(Button::A)],
            repeat: 3,
        }]);
        input.read_accel().unwrap();
        assert_eq!(input.read_buttons().unwrap().len(), 1);
        input.read_accel().unwrap();
        assert!(input.read_buttons().unwrap().is_empty());
    }

    #[test]
    fn zero_repeat_frames_are_skipped() {
        let input = ScriptedInput::new([ScriptFrame::accel(1).repeated(0), ScriptFrame::accel(2)]);
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn loads_json_script() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"frames": [
                {{"accel": 5, "repeat": 2}},
                {{"buttons": [{{"button": "two", "pressed": true}}, {{"button": "two", "pressed": false}}]}}
            ]}}"#
        )
        .unwrap();

        let mut input = ScriptedInput::load(file.path()).unwrap();
        assert_eq!(input.remaining(), 3);
        input.read_accel().unwrap();
        input.read_accel().unwrap();
        input.read_accel().unwrap();
        assert_eq!(
            input.read_buttons().unwrap().as_slice(),
            &[
                ButtonEvent::press(Button::Two),
                ButtonEvent::release(Button::Two)
            ]
        );
    }

    #[test]
    fn malformed_script_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"frames": [{{"buttons": [{{"button": "c"}}]}}]}}"#).unwrap();
        assert!(matches!(
            ScriptedInput::load(file.path()),
            Err(InputError::Script { .. })
        ));
    }

    #[test]
    fn missing_script_is_an_open_error() {
        assert!(matches!(
            ScriptedInput::load(Path::new("/nonexistent/throw.json")),
            Err(InputError::Open { .. })
        ));
    }
}
