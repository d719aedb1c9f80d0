//! Incremental motion never leaves the axis bounds.

use arm_common::axis::{ArmPositions, AxisId, Direction};
use arm_control::motion::{accel_to_angle, StepOutcome};
use proptest::prelude::*;

use super::sim_arm;

fn bounded_axis() -> impl Strategy<Value = AxisId> {
    prop_oneof![Just(AxisId::Base), Just(AxisId::Gripper)]
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Decrease), Just(Direction::Increase)]
}

proptest! {
    #[test]
    fn positions_stay_within_limits(
        moves in prop::collection::vec((bounded_axis(), direction()), 0..400)
    ) {
        let (mut motion, probe) = sim_arm(ArmPositions::start());
        let mut moved = 0;

        for (axis, direction) in moves {
            let outcome = motion.step(axis, direction).unwrap();
            if outcome.moved() {
                moved += 1;
            }
            let limits = axis.spec().limits.unwrap();
            prop_assert!(limits.contains(outcome.position()));
            prop_assert_eq!(outcome.position(), motion.position(axis));
        }

        prop_assert_eq!(probe.write_count(), 5 + moved);
    }

    #[test]
    fn accel_angle_is_whole_and_in_range(value in any::<i32>()) {
        let angle = accel_to_angle(value);
        prop_assert!((60.0..=240.0).contains(&angle));
        prop_assert_eq!(angle.fract(), 0.0);
    }
}

#[test]
fn base_walks_to_each_limit_then_stops() {
    let (mut motion, probe) = sim_arm(ArmPositions::start());

    for _ in 0..200 {
        motion.step(AxisId::Base, Direction::Decrease).unwrap();
    }
    assert_eq!(motion.position(AxisId::Base), 60.0);
    // 105 -> 60 is 45 legal steps.
    assert_eq!(probe.write_count(), 5 + 45);

    for _ in 0..400 {
        motion.step(AxisId::Base, Direction::Increase).unwrap();
    }
    assert_eq!(motion.position(AxisId::Base), 240.0);
    assert_eq!(probe.write_count(), 5 + 45 + 180);
}

#[test]
fn gripper_walks_half_degrees() {
    let (mut motion, probe) = sim_arm(ArmPositions::start());

    let outcomes: Vec<StepOutcome> = (0..3)
        .map(|_| motion.step(AxisId::Gripper, Direction::Decrease).unwrap())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            StepOutcome::Moved(119.5),
            StepOutcome::Moved(119.0),
            StepOutcome::Moved(118.5),
        ]
    );
    assert_eq!(probe.word_at(0x110).unwrap().position(), 118);

    for _ in 0..100 {
        motion.step(AxisId::Gripper, Direction::Decrease).unwrap();
    }
    assert_eq!(
        motion.step(AxisId::Gripper, Direction::Decrease).unwrap(),
        StepOutcome::Rejected(100.0)
    );
}

#[test]
fn rejection_at_max_writes_nothing() {
    let mut pose = ArmPositions::start();
    pose.set(AxisId::Gripper, 200.0);
    let (mut motion, probe) = sim_arm(pose);

    for _ in 0..10 {
        assert_eq!(
            motion.step(AxisId::Gripper, Direction::Increase).unwrap(),
            StepOutcome::Rejected(200.0)
        );
    }
    assert_eq!(probe.write_count(), 5);
    assert_eq!(motion.positions(), pose);
}
