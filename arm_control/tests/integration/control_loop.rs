//! Dispatch loop driven by scripted input against simulated registers.

use arm_common::axis::{ArmPositions, AxisId, Direction};
use arm_common::hal::driver::HalError;
use arm_control::dispatch::{Action, Dispatcher, LoopError, LoopState};
use arm_control::error::{ArmError, EXIT_RUNTIME};
use arm_control::input::script::{ScriptFrame, ScriptedInput};
use arm_control::input::{Button, ButtonEvent, InputDevice, InputError};
use arm_control::throw::ThreadSleeper;
use arm_hal::drivers::simulation::SimulationProbe;

use super::{sim_arm, RecordingSleeper};

fn press(button: Button) -> ButtonEvent {
    ButtonEvent::press(button)
}

fn release(button: Button) -> ButtonEvent {
    ButtonEvent::release(button)
}

fn frame(accel: Option<i32>, buttons: &[ButtonEvent]) -> ScriptFrame {
    ScriptFrame {
        accel,
        buttons: buttons.to_vec(),
        repeat: 1,
    }
}

fn dispatcher(
    frames: Vec<ScriptFrame>,
) -> (Dispatcher<ScriptedInput, ThreadSleeper>, SimulationProbe) {
    let (motion, probe) = sim_arm(ArmPositions::start());
    (Dispatcher::new(ScriptedInput::new(frames), motion, ThreadSleeper), probe)
}

// ── Termination ─────────────────────────────────────────────────────

#[test]
fn home_press_terminates_after_the_iteration() {
    let (mut loop_, _probe) = dispatcher(vec![
        ScriptFrame::accel(0).repeated(2),
        frame(Some(0), &[press(Button::Home)]),
    ]);

    let summary = loop_.run().unwrap();
    assert_eq!(summary.iterations, 3);
    assert_eq!(loop_.state(), LoopState::Terminated);

    // A terminated loop no longer reads input.
    let idle = loop_.iterate().unwrap();
    assert_eq!(idle.state, LoopState::Terminated);
    assert_eq!(idle.action, None);
    assert_eq!(loop_.summary().iterations, 3);
}

#[test]
fn home_release_does_not_terminate() {
    let (mut loop_, _probe) = dispatcher(vec![
        frame(Some(0), &[release(Button::Home)]),
        frame(None, &[press(Button::Plus), press(Button::Minus)]),
    ]);

    let result = loop_.run();
    assert!(matches!(
        result,
        Err(LoopError::Input(InputError::ScriptExhausted(2)))
    ));
    assert_eq!(loop_.state(), LoopState::Running);
}

#[test]
fn terminating_iteration_still_acts() {
    let (mut loop_, probe) = dispatcher(vec![frame(
        Some(0),
        &[press(Button::Up), press(Button::Home)],
    )]);

    let iteration = loop_.iterate().unwrap();
    assert_eq!(
        iteration.action,
        Some(Action::Step(AxisId::Base, Direction::Decrease))
    );
    assert_eq!(iteration.absolute, Some((AxisId::Bicep, 150.0)));
    assert_eq!(iteration.state, LoopState::Terminated);
    assert_eq!(probe.write_count(), 5 + 2);
}

// ── Priority chain ──────────────────────────────────────────────────

#[test]
fn held_buttons_repeat_every_iteration() {
    let (mut loop_, _probe) = dispatcher(vec![
        frame(None, &[press(Button::Up), press(Button::Down)]),
        frame(None, &[]).repeated(4),
        frame(None, &[release(Button::Up)]),
        frame(None, &[press(Button::Home)]),
    ]);

    loop_.run().unwrap();
    // Five decreases while Up was held, then Down takes over for two.
    assert_eq!(loop_.motion().position(AxisId::Base), 105.0 - 5.0 + 2.0);
    assert_eq!(loop_.summary().steps, 7);
}

#[test]
fn same_input_same_action() {
    let events = [press(Button::Right), press(Button::Left), press(Button::A)];
    let (mut first, _) = dispatcher(vec![frame(Some(-30), &events)]);
    let (mut second, _) = dispatcher(vec![frame(Some(-30), &events)]);

    let a = first.iterate().unwrap();
    let b = second.iterate().unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.action,
        Some(Action::Step(AxisId::Gripper, Direction::Decrease))
    );
    assert_eq!(a.absolute, Some((AxisId::Wrist, 186.0)));
}

#[test]
fn blocked_direction_falls_through_to_next_entry() {
    let mut pose = ArmPositions::start();
    pose.set(AxisId::Base, 60.0);
    let (motion, probe) = sim_arm(pose);
    let mut loop_ = Dispatcher::new(
        ScriptedInput::new([frame(None, &[press(Button::Up), press(Button::Left)])]),
        motion,
        ThreadSleeper,
    );

    let iteration = loop_.iterate().unwrap();
    assert_eq!(
        iteration.action,
        Some(Action::Step(AxisId::Gripper, Direction::Increase))
    );
    assert_eq!(loop_.motion().position(AxisId::Base), 60.0);
    assert_eq!(probe.write_count(), 5 + 1);
}

// ── Accelerometer routing ───────────────────────────────────────────

#[test]
fn accel_follows_modifier_buttons() {
    let (mut loop_, probe) = dispatcher(vec![
        frame(Some(10), &[press(Button::B), press(Button::A)]),
        frame(Some(-10), &[release(Button::A)]),
        frame(Some(125), &[release(Button::B)]),
        frame(None, &[]),
    ]);

    let targets: Vec<_> = (0..4).map(|_| loop_.iterate().unwrap().absolute).collect();
    assert_eq!(
        targets,
        vec![
            Some((AxisId::Wrist, 138.0)),
            Some((AxisId::Elbow, 162.0)),
            Some((AxisId::Bicep, 60.0)),
            None,
        ]
    );
    assert_eq!(probe.write_count(), 5 + 3);
}

#[test]
fn one_press_dumps_without_writing() {
    let (mut loop_, probe) = dispatcher(vec![frame(None, &[press(Button::One)])]);
    let iteration = loop_.iterate().unwrap();
    assert_eq!(iteration.action, None);
    assert_eq!(probe.write_count(), 5);
}

// ── Throw ───────────────────────────────────────────────────────────

#[test]
fn two_runs_the_throw_while_held() {
    let (motion, probe) = sim_arm(ArmPositions::start());
    let mut sleeper = RecordingSleeper::new(&probe);
    let input = ScriptedInput::new([
        frame(None, &[press(Button::Two)]),
        frame(None, &[release(Button::Two)]),
        frame(None, &[press(Button::Home)]),
    ]);
    let mut loop_ = Dispatcher::new(input, motion, &mut sleeper);

    let summary = loop_.run().unwrap();
    drop(loop_);

    assert_eq!(summary.throws, 1);
    assert_eq!(sleeper.pauses.len(), 4);
    assert_eq!(probe.write_count(), 5 + 10);
}

// ── Faults ──────────────────────────────────────────────────────────

#[test]
fn write_fault_stops_the_loop_with_runtime_code() {
    let (mut loop_, probe) = dispatcher(vec![
        ScriptFrame::accel(0),
        frame(Some(0), &[press(Button::Home)]),
    ]);
    probe.fail_writes_after(0);

    let err = loop_.run().unwrap_err();
    assert!(matches!(err, LoopError::Hal(HalError::WriteFailed(_))));
    assert_eq!(ArmError::from(err).code(), EXIT_RUNTIME);
    assert_eq!(loop_.summary().iterations, 0);
}

#[test]
fn shutdown_releases_the_window_once() {
    let (mut loop_, probe) = dispatcher(vec![frame(None, &[press(Button::Home)])]);
    loop_.run().unwrap();

    let (mut input, motion) = loop_.into_parts();
    input.close().unwrap();
    motion.into_registers().close().unwrap();
    assert!(!probe.is_open());
    assert_eq!(probe.lifecycle_counts(), (1, 1));
}
