//! Throw protocol: pick an object up at a fixed spot and throw it.
//!
//! The protocol is a fixed table of [`ThrowStep`]s run to completion. It
//! blocks the control loop for its whole duration (about seven seconds);
//! input is not read while it runs.
//!
//! ```text
//! Approach ─► Ready (2 s) ─► Grasp (3 s) ─► Swing ─► Release (4.5 ms) ─► Settle (2 s)
//! ```

use std::time::Duration;

use arm_common::axis::AxisId;
use arm_common::hal::driver::HalError;
use tracing::info;

use crate::motion::{MotionCommand, MotionController};

/// Phases of the throw, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrowStage {
    /// Move over the object with the gripper open.
    Approach,
    /// Let the arm arrive.
    Ready,
    /// Close the gripper on the object.
    Grasp,
    /// Bicep, elbow and wrist together make the throwing motion.
    Swing,
    /// Open the gripper mid-swing.
    Release,
    /// Let the swing complete.
    Settle,
}

/// One entry of the throw table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrowStep {
    /// Log the start of a stage.
    Enter(ThrowStage, &'static str),
    /// Unconditional absolute move.
    Move(MotionCommand),
    /// Block for the given time.
    Pause(Duration),
}

const fn mv(axis: AxisId, position: f64, speed: u8) -> ThrowStep {
    ThrowStep::Move(MotionCommand::new(axis, position, speed))
}

/// The throw, step by step.
pub const THROW_SCRIPT: &[ThrowStep] = &[
    ThrowStep::Enter(ThrowStage::Approach, "Moving to object"),
    mv(AxisId::Base, 145.0, 20),
    mv(AxisId::Bicep, 75.0, 20),
    mv(AxisId::Elbow, 215.0, 20),
    mv(AxisId::Wrist, 130.0, 20),
    mv(AxisId::Gripper, 155.0, 20),
    ThrowStep::Enter(ThrowStage::Ready, "Preparing to move in 2 seconds"),
    ThrowStep::Pause(Duration::from_secs(2)),
    ThrowStep::Enter(ThrowStage::Grasp, "Closing gripper"),
    mv(AxisId::Gripper, 100.0, 20),
    ThrowStep::Pause(Duration::from_secs(3)),
    ThrowStep::Enter(ThrowStage::Swing, "Gripper closed, throwing"),
    mv(AxisId::Bicep, 160.0, 100),
    mv(AxisId::Elbow, 240.0, 40),
    mv(AxisId::Wrist, 160.0, 40),
    ThrowStep::Enter(ThrowStage::Release, "Releasing"),
    ThrowStep::Pause(Duration::from_micros(4500)),
    mv(AxisId::Gripper, 200.0, 20),
    ThrowStep::Enter(ThrowStage::Settle, "Completing swing"),
    ThrowStep::Pause(Duration::from_secs(2)),
];

/// Blocking delay source.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// [`Sleeper`] backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Runs [`THROW_SCRIPT`] against a motion controller.
pub struct ThrowProtocol;

impl ThrowProtocol {
    /// Execute every step in order.
    ///
    /// A failed write aborts the remaining steps and is returned as is.
    pub fn run<S: Sleeper + ?Sized>(
        motion: &mut MotionController,
        sleeper: &mut S,
    ) -> Result<(), HalError> {
        for step in THROW_SCRIPT {
            match *step {
                ThrowStep::Enter(stage, message) => info!("Throw {stage:?}: {message}"),
                ThrowStep::Move(command) => motion.command(command)?,
                ThrowStep::Pause(duration) => sleeper.sleep(duration),
            }
        }
        info!("Throw complete");
        Ok(())
    }

    /// Sum of every pause in the script.
    pub fn total_pause() -> Duration {
        THROW_SCRIPT
            .iter()
            .filter_map(|step| match step {
                ThrowStep::Pause(d) => Some(*d),
                _ => None,
            })
            .sum()
    }
}
