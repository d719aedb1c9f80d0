//! Motion controller: the single writer of axis positions.
//!
//! Two paths reach the hardware:
//!
//! - **Incremental** ([`MotionController::step`]): one step of the axis'
//!   configured size, boundary-checked *before* anything is written.
//! - **Absolute** ([`MotionController::set_absolute`],
//!   [`MotionController::command`]): unconditional writes used by the
//!   accelerometer path and the throw script.
//!
//! The position record always equals the last value written for each axis.

use arm_common::axis::{ArmPositions, AxisId, Direction};
use arm_common::hal::driver::HalError;
use arm_hal::RegisterInterface;
use tracing::debug;

/// Gain from raw accelerometer counts to degrees.
pub const ACCEL_GAIN: f64 = 1.2;
/// Maximum deflection from [`ACCEL_CENTER`] in degrees.
pub const ACCEL_SWING: f64 = 90.0;
/// Angle written for a level controller.
pub const ACCEL_CENTER: f64 = 150.0;

/// Map a raw accelerometer X reading to an absolute joint angle.
///
/// `trunc(clamp(-value * 1.2, -90, 90)) + 150`, so the result is always a
/// whole number in `[60, 240]`. Tilting one way raises the angle, the other
/// lowers it.
pub fn accel_to_angle(value: i32) -> f64 {
    (-f64::from(value) * ACCEL_GAIN)
        .clamp(-ACCEL_SWING, ACCEL_SWING)
        .trunc()
        + ACCEL_CENTER
}

/// Result of an incremental move request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The step was legal; the axis is now at this position.
    Moved(f64),
    /// The step would have left the bounds; nothing was written and the
    /// axis stays at this position.
    Rejected(f64),
}

impl StepOutcome {
    /// Axis position after the request, in both cases.
    #[inline]
    pub fn position(&self) -> f64 {
        match *self {
            StepOutcome::Moved(p) | StepOutcome::Rejected(p) => p,
        }
    }

    /// Whether a register write happened.
    #[inline]
    pub fn moved(&self) -> bool {
        matches!(self, StepOutcome::Moved(_))
    }
}

/// Unconditional absolute motion command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCommand {
    /// Axis to move.
    pub axis: AxisId,
    /// Target position in degrees.
    pub position: f64,
    /// Speed field written with the position.
    pub speed: u8,
}

impl MotionCommand {
    /// Command moving `axis` to `position` at `speed`.
    pub const fn new(axis: AxisId, position: f64, speed: u8) -> Self {
        Self {
            axis,
            position,
            speed,
        }
    }
}

/// Owns the register interface and the position record.
pub struct MotionController {
    registers: RegisterInterface,
    positions: ArmPositions,
}

impl MotionController {
    /// Wrap an open interface. `positions` must be the pose it settled.
    pub fn new(registers: RegisterInterface, positions: ArmPositions) -> Self {
        Self {
            registers,
            positions,
        }
    }

    /// Snapshot of the position record.
    pub fn positions(&self) -> ArmPositions {
        self.positions
    }

    /// Current position of `axis`.
    #[inline]
    pub fn position(&self, axis: AxisId) -> f64 {
        self.positions.get(axis)
    }

    /// Whether one step of `axis` in `direction` is legal right now.
    #[inline]
    pub fn can_step(&self, axis: AxisId, direction: Direction) -> bool {
        axis.spec().check(self.positions.get(axis), direction)
    }

    /// Move `axis` one step in `direction` if the result stays in bounds.
    ///
    /// A rejected step writes nothing and leaves the record unchanged, so
    /// repeating it is idempotent.
    pub fn step(&mut self, axis: AxisId, direction: Direction) -> Result<StepOutcome, HalError> {
        let spec = axis.spec();
        let current = self.positions.get(axis);
        let Some(next) = spec.next_position(current, direction) else {
            debug!("{axis} {direction:?} rejected at {current}");
            return Ok(StepOutcome::Rejected(current));
        };

        self.write(axis, next, spec.speed)?;
        Ok(StepOutcome::Moved(next))
    }

    /// Drive `axis` to the angle derived from an accelerometer reading.
    ///
    /// Bypasses the incremental bounds; the mapping itself keeps the result
    /// in `[60, 240]`. Returns the angle written.
    pub fn set_absolute(&mut self, axis: AxisId, accel_value: i32) -> Result<f64, HalError> {
        let angle = accel_to_angle(accel_value);
        self.write(axis, angle, axis.spec().speed)?;
        Ok(angle)
    }

    /// Execute an absolute command without bounds checking.
    pub fn command(&mut self, command: MotionCommand) -> Result<(), HalError> {
        self.write(command.axis, command.position, command.speed)
    }

    /// Register writes issued so far, settle writes included.
    pub fn write_count(&self) -> u64 {
        self.registers.write_count()
    }

    /// Give back the register interface, e.g. to close it explicitly.
    pub fn into_registers(self) -> RegisterInterface {
        self.registers
    }

    fn write(&mut self, axis: AxisId, position: f64, speed: u8) -> Result<(), HalError> {
        self.registers.write(axis, position, speed)?;
        self.positions.set(axis, position);
        debug!("{axis} -> {position} @ {speed}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arm_common::config::RegistersConfig;
    use arm_hal::drivers::simulation::{SimulationDriver, SimulationProbe};

    fn controller_at(positions: ArmPositions) -> (MotionController, SimulationProbe) {
        let driver = SimulationDriver::new();
        let probe = driver.probe();
        let registers =
            RegisterInterface::open(Box::new(driver), &RegistersConfig::default(), &positions)
                .unwrap();
        (MotionController::new(registers, positions), probe)
    }

    #[test]
    fn accel_mapping_saturates() {
        assert_eq!(accel_to_angle(0), 150.0);
        assert_eq!(accel_to_angle(-125), 240.0);
        assert_eq!(accel_to_angle(125), 60.0);
        assert_eq!(accel_to_angle(-80), 240.0);
        assert_eq!(accel_to_angle(i32::MIN), 240.0);
        assert_eq!(accel_to_angle(i32::MAX), 60.0);
        // -(7 * 1.2) = -8.4 truncates toward zero
        assert_eq!(accel_to_angle(7), 142.0);
        assert_eq!(accel_to_angle(-7), 158.0);
    }

    #[test]
    fn legal_step_writes_once() {
        let (mut motion, probe) = controller_at(ArmPositions::start());
        let before = probe.write_count();

        let outcome = motion.step(AxisId::Gripper, Direction::Increase).unwrap();
        assert_eq!(outcome, StepOutcome::Moved(120.5));
        assert_eq!(motion.position(AxisId::Gripper), 120.5);
        assert_eq!(probe.write_count(), before + 1);

        let last = *probe.writes().last().unwrap();
        assert_eq!(last.offset, 0x110);
        assert_eq!(last.word.position(), 120);
        assert_eq!(last.word.speed(), 20);
    }

    #[test]
    fn rejected_step_is_idempotent() {
        let mut at_min = ArmPositions::start();
        at_min.set(AxisId::Base, 60.0);
        let (mut motion, probe) = controller_at(at_min);
        let before = probe.write_count();

        for _ in 0..3 {
            let outcome = motion.step(AxisId::Base, Direction::Decrease).unwrap();
            assert_eq!(outcome, StepOutcome::Rejected(60.0));
            assert!(!outcome.moved());
        }
        assert_eq!(probe.write_count(), before);
        assert_eq!(motion.positions(), at_min);
    }

    #[test]
    fn unbounded_axes_cannot_step() {
        let (mut motion, probe) = controller_at(ArmPositions::start());
        let before = probe.write_count();
        assert!(!motion.can_step(AxisId::Elbow, Direction::Increase));
        assert_eq!(
            motion.step(AxisId::Elbow, Direction::Increase).unwrap(),
            StepOutcome::Rejected(200.0)
        );
        assert_eq!(probe.write_count(), before);
    }

    #[test]
    fn set_absolute_bypasses_limits() {
        let (mut motion, probe) = controller_at(ArmPositions::start());
        assert_eq!(motion.set_absolute(AxisId::Wrist, -200).unwrap(), 240.0);
        assert_eq!(motion.position(AxisId::Wrist), 240.0);
        assert_eq!(probe.word_at(0x10C).unwrap().position(), 240);
    }

    #[test]
    fn command_updates_record_with_its_speed() {
        let (mut motion, probe) = controller_at(ArmPositions::start());
        motion
            .command(MotionCommand::new(AxisId::Bicep, 160.0, 100))
            .unwrap();
        assert_eq!(motion.position(AxisId::Bicep), 160.0);
        let word = probe.word_at(0x104).unwrap();
        assert_eq!((word.position(), word.speed()), (160, 100));
    }

    #[test]
    fn failed_write_leaves_record_untouched() {
        let (mut motion, probe) = controller_at(ArmPositions::start());
        probe.fail_writes_after(0);
        assert!(motion.step(AxisId::Base, Direction::Increase).is_err());
        assert_eq!(motion.position(AxisId::Base), 105.0);
    }
}
