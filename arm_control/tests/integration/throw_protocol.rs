//! Throw protocol: write order, speeds and the pauses between them.

use std::time::Duration;

use arm_common::axis::{ArmPositions, AxisId};
use arm_common::hal::driver::HalError;
use arm_control::throw::ThrowProtocol;

use super::{sim_arm, RecordingSleeper};

const SETTLE_WRITES: usize = 5;

#[test]
fn writes_and_pauses_interleave_in_order() {
    let (mut motion, probe) = sim_arm(ArmPositions::start());
    let mut sleeper = RecordingSleeper::new(&probe);

    ThrowProtocol::run(&mut motion, &mut sleeper).unwrap();

    let moves: Vec<(usize, u8, u8)> = probe.writes()[SETTLE_WRITES..]
        .iter()
        .map(|w| (w.offset, w.word.position(), w.word.speed()))
        .collect();
    assert_eq!(
        moves,
        vec![
            (0x100, 145, 20),
            (0x104, 75, 20),
            (0x108, 215, 20),
            (0x10C, 130, 20),
            (0x110, 155, 20),
            (0x110, 100, 20),
            (0x104, 160, 100),
            (0x108, 240, 40),
            (0x10C, 160, 40),
            (0x110, 200, 20),
        ]
    );

    assert_eq!(
        sleeper.pauses,
        vec![
            (Duration::from_secs(2), SETTLE_WRITES + 5),
            (Duration::from_secs(3), SETTLE_WRITES + 6),
            (Duration::from_micros(4500), SETTLE_WRITES + 9),
            (Duration::from_secs(2), SETTLE_WRITES + 10),
        ]
    );
}

#[test]
fn position_record_follows_the_script() {
    let (mut motion, probe) = sim_arm(ArmPositions::start());
    let mut sleeper = RecordingSleeper::new(&probe);
    ThrowProtocol::run(&mut motion, &mut sleeper).unwrap();

    let after: Vec<(AxisId, f64)> = motion.positions().iter().collect();
    assert_eq!(
        after,
        vec![
            (AxisId::Base, 145.0),
            (AxisId::Bicep, 160.0),
            (AxisId::Elbow, 240.0),
            (AxisId::Wrist, 160.0),
            (AxisId::Gripper, 200.0),
        ]
    );
}

#[test]
fn runs_identically_from_any_pose() {
    let mut pose = ArmPositions::start();
    pose.set(AxisId::Base, 60.0);
    pose.set(AxisId::Gripper, 199.5);
    let (mut from_edge, edge_probe) = sim_arm(pose);
    let (mut from_start, start_probe) = sim_arm(ArmPositions::start());

    ThrowProtocol::run(&mut from_edge, &mut RecordingSleeper::new(&edge_probe)).unwrap();
    ThrowProtocol::run(&mut from_start, &mut RecordingSleeper::new(&start_probe)).unwrap();

    assert_eq!(
        edge_probe.writes()[SETTLE_WRITES..],
        start_probe.writes()[SETTLE_WRITES..]
    );
}

#[test]
fn driver_fault_aborts_remaining_steps() {
    let (mut motion, probe) = sim_arm(ArmPositions::start());
    let mut sleeper = RecordingSleeper::new(&probe);
    probe.fail_writes_after(6);

    let result = ThrowProtocol::run(&mut motion, &mut sleeper);

    assert!(matches!(result, Err(HalError::WriteFailed(_))));
    assert_eq!(probe.write_count(), SETTLE_WRITES + 6);
    // Only the pause after the approach ran before the swing failed.
    assert_eq!(sleeper.pauses.len(), 2);
    assert_eq!(motion.position(AxisId::Gripper), 100.0);
    assert_eq!(motion.position(AxisId::Bicep), 75.0);
}
