//! Input dispatch loop.
//!
//! ```text
//!            ┌──────────────── iterate() ────────────────┐
//!            ▼                                           │
//!       ┌─────────┐   Home pressed (end of iteration)  ┌────────────┐
//! ───►  │ Running │ ─────────────────────────────────► │ Terminated │
//!       └─────────┘                                    └────────────┘
//! ```
//!
//! Every iteration:
//!
//! 1. block on one accelerometer sample, then drain pending button events
//!    into the held set;
//! 2. run at most one entry of [`PRIORITY_CHAIN`] (first match wins);
//! 3. route an X-axis sample to exactly one joint via [`ACCEL_ROUTES`].

use arm_common::axis::{ArmPositions, AxisId, Direction};
use arm_common::hal::driver::HalError;
use thiserror::Error;
use tracing::{debug, info};

use crate::input::{Button, HeldButtons, InputDevice, InputError};
use crate::motion::MotionController;
use crate::throw::{Sleeper, ThrowProtocol};

/// Loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Running,
    Terminated,
}

/// Action selected by the priority chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// One incremental step of a bounded axis.
    Step(AxisId, Direction),
    /// The blocking throw protocol.
    Throw,
}

/// Button-driven actions in priority order. A step entry only matches while
/// the step is legal, so a blocked direction falls through to the next.
pub const PRIORITY_CHAIN: [(Button, Action); 5] = [
    (Button::Up, Action::Step(AxisId::Base, Direction::Decrease)),
    (Button::Down, Action::Step(AxisId::Base, Direction::Increase)),
    (Button::Right, Action::Step(AxisId::Gripper, Direction::Decrease)),
    (Button::Left, Action::Step(AxisId::Gripper, Direction::Increase)),
    (Button::Two, Action::Throw),
];

/// Modifier buttons selecting the joint driven by the accelerometer.
pub const ACCEL_ROUTES: [(Button, AxisId); 2] = [
    (Button::A, AxisId::Wrist),
    (Button::B, AxisId::Elbow),
];

/// Joint driven by the accelerometer when no modifier is held.
pub const ACCEL_DEFAULT: AxisId = AxisId::Bicep;

/// First matching entry of [`PRIORITY_CHAIN`] for `held` at `positions`.
pub fn select_action(held: HeldButtons, positions: &ArmPositions) -> Option<Action> {
    PRIORITY_CHAIN
        .iter()
        .filter(|(button, _)| held.is_held(*button))
        .map(|(_, action)| *action)
        .find(|action| match *action {
            Action::Step(axis, direction) => axis.spec().check(positions.get(axis), direction),
            Action::Throw => true,
        })
}

/// Joint an X-axis sample drives for `held`.
pub fn accel_target(held: HeldButtons) -> AxisId {
    ACCEL_ROUTES
        .iter()
        .find(|(button, _)| held.is_held(*button))
        .map_or(ACCEL_DEFAULT, |(_, axis)| *axis)
}

/// Errors that stop the loop.
#[derive(Debug, Error)]
pub enum LoopError {
    /// A register store failed.
    #[error("Register write failed: {0}")]
    Hal(#[from] HalError),

    /// Reading the input device failed.
    #[error("Input failed: {0}")]
    Input(#[from] InputError),
}

/// What one iteration did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Iteration {
    /// Action taken from the priority chain.
    pub action: Option<Action>,
    /// Joint and angle written from the accelerometer.
    pub absolute: Option<(AxisId, f64)>,
    /// State after the iteration.
    pub state: LoopState,
}

/// Counters over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Completed iterations.
    pub iterations: u64,
    /// Incremental steps taken from the priority chain.
    pub steps: u64,
    /// Throw protocols run.
    pub throws: u64,
    /// Accelerometer-driven absolute writes.
    pub absolute_moves: u64,
}

/// The control loop: input device, motion controller and held-button state.
pub struct Dispatcher<I, S> {
    input: I,
    motion: MotionController,
    sleeper: S,
    held: HeldButtons,
    state: LoopState,
    summary: LoopSummary,
}

impl<I: InputDevice, S: Sleeper> Dispatcher<I, S> {
    /// Loop in `Running` with nothing held.
    pub fn new(input: I, motion: MotionController, sleeper: S) -> Self {
        Self {
            input,
            motion,
            sleeper,
            held: HeldButtons::empty(),
            state: LoopState::Running,
            summary: LoopSummary::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Buttons held after the last drained batch.
    pub fn held(&self) -> HeldButtons {
        self.held
    }

    /// The motion controller, for inspecting positions.
    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    /// Counters so far.
    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    /// Run one iteration. A terminated loop does nothing.
    pub fn iterate(&mut self) -> Result<Iteration, LoopError> {
        if self.state == LoopState::Terminated {
            return Ok(Iteration {
                action: None,
                absolute: None,
                state: self.state,
            });
        }

        let sample = self.input.read_accel()?;
        let events = self.input.read_buttons()?;

        let mut terminate = false;
        for event in events.iter().copied() {
            self.held.apply(event);
            debug!(
                "{} {}",
                event.button,
                if event.pressed { "pressed" } else { "released" }
            );
            if event.pressed {
                match event.button {
                    Button::Home => terminate = true,
                    Button::One => info!("Arm positions:\n{}", self.motion.positions()),
                    _ => {}
                }
            }
        }

        let action = select_action(self.held, &self.motion.positions());
        match action {
            Some(Action::Step(axis, direction)) => {
                self.motion.step(axis, direction)?;
                self.summary.steps += 1;
            }
            Some(Action::Throw) => {
                ThrowProtocol::run(&mut self.motion, &mut self.sleeper)?;
                self.summary.throws += 1;
            }
            None => {}
        }

        let absolute = match sample.control_value() {
            Some(value) => {
                let axis = accel_target(self.held);
                let angle = self.motion.set_absolute(axis, value)?;
                self.summary.absolute_moves += 1;
                Some((axis, angle))
            }
            None => None,
        };

        self.summary.iterations += 1;
        if terminate {
            info!("Home pressed, leaving control loop");
            self.state = LoopState::Terminated;
        }

        Ok(Iteration {
            action,
            absolute,
            state: self.state,
        })
    }

    /// Iterate until terminated or an error occurs.
    pub fn run(&mut self) -> Result<LoopSummary, LoopError> {
        info!("Control loop running");
        while self.state == LoopState::Running {
            self.iterate()?;
        }
        Ok(self.summary)
    }

    /// Take the input device and motion controller back for shutdown.
    pub fn into_parts(self) -> (I, MotionController) {
        (self.input, self.motion)
    }
}
