use std::time::Duration;

use arm_common::axis::ArmPositions;
use arm_common::config::RegistersConfig;
use arm_control::motion::MotionController;
use arm_control::throw::Sleeper;
use arm_hal::drivers::simulation::{SimulationDriver, SimulationProbe};
use arm_hal::RegisterInterface;

mod control_loop;
mod motion_bounds;
mod throw_protocol;

// ── Helpers ─────────────────────────────────────────────────────────

/// Motion controller on a fresh simulation bank, settled at `start`.
pub fn sim_arm(start: ArmPositions) -> (MotionController, SimulationProbe) {
    let driver = SimulationDriver::new();
    let probe = driver.probe();
    let registers = RegisterInterface::open(Box::new(driver), &RegistersConfig::default(), &start)
        .expect("simulation bank opens");
    (MotionController::new(registers, start), probe)
}

/// Records every pause together with the number of stores made before it.
pub struct RecordingSleeper {
    pub pauses: Vec<(Duration, usize)>,
    probe: SimulationProbe,
}

impl RecordingSleeper {
    pub fn new(probe: &SimulationProbe) -> Self {
        Self {
            pauses: Vec::new(),
            probe: probe.clone(),
        }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.pauses.push((duration, self.probe.write_count()));
    }
}
