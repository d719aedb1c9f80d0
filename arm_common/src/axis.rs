//! Axis identities, the static axis table and the boundary checker.
//!
//! Every controllable joint is named by the closed [`AxisId`] enumeration.
//! [`AXIS_TABLE`] maps each identity to its register offset, start position,
//! optional incremental limits and speed constant. The table is built at
//! compile time and never changes while the process runs.
//!
//! | Axis | Servo # | Offset | Start | Bounds | Step | Speed |
//! |---|---|---|---|---|---|---|
//! | Base | 1 | 0x100 | 105 | [60,240] | 1 | 20 |
//! | Bicep | 2 | 0x104 | 80 | - | - | 20 |
//! | Elbow | 3 | 0x108 | 200 | - | - | 20 |
//! | Wrist | 4 | 0x10C | 150 | - | - | 20 |
//! | Gripper | 5 | 0x110 | 120.0 | [100,200] | 0.5 | 20 |

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::consts::{
    AXIS_COUNT, BASE_OFFSET, BICEP_OFFSET, ELBOW_OFFSET, GRIPPER_OFFSET, WRIST_OFFSET,
};

// ─── AxisId ─────────────────────────────────────────────────────────

/// One of the five controllable joints.
///
/// The discriminant is the legacy servo number used by the register
/// controller firmware (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AxisId {
    Base = 1,
    Bicep = 2,
    Elbow = 3,
    Wrist = 4,
    Gripper = 5,
}

impl AxisId {
    /// All axes in servo-number order.
    pub const ALL: [AxisId; AXIS_COUNT] = [
        AxisId::Base,
        AxisId::Bicep,
        AxisId::Elbow,
        AxisId::Wrist,
        AxisId::Gripper,
    ];

    /// Legacy servo number (1..=5).
    #[inline]
    pub const fn servo_number(self) -> u8 {
        self as u8
    }

    /// Resolve a legacy servo number. Returns `None` outside 1..=5.
    pub const fn from_servo_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(AxisId::Base),
            2 => Some(AxisId::Bicep),
            3 => Some(AxisId::Elbow),
            4 => Some(AxisId::Wrist),
            5 => Some(AxisId::Gripper),
            _ => None,
        }
    }

    /// Zero-based index into [`AXIS_TABLE`] and position records.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Static configuration of this axis.
    #[inline]
    pub fn spec(self) -> &'static AxisSpec {
        &AXIS_TABLE[self.index()]
    }

    /// Lowercase name used in configuration files and logs.
    pub const fn name(self) -> &'static str {
        match self {
            AxisId::Base => "base",
            AxisId::Bicep => "bicep",
            AxisId::Elbow => "elbow",
            AxisId::Wrist => "wrist",
            AxisId::Gripper => "gripper",
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AxisId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AxisId::ALL
            .into_iter()
            .find(|axis| axis.name() == s)
            .ok_or_else(|| format!("unknown axis: {s:?}"))
    }
}

// ─── Direction ──────────────────────────────────────────────────────

/// Direction of an incremental move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Subtract one step from the current position.
    Decrease,
    /// Add one step to the current position.
    Increase,
}

// ─── Limits ─────────────────────────────────────────────────────────

/// Incremental motion limits of an axis (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Lowest legal position (inclusive).
    pub min: f64,
    /// Highest legal position (inclusive).
    pub max: f64,
    /// Distance covered by one incremental command.
    pub step: f64,
}

impl Limits {
    /// Whether `position` lies inside `[min, max]`.
    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.min && position <= self.max
    }

    /// Position one step away from `position` in `direction`.
    #[inline]
    pub fn candidate(&self, position: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Decrease => position - self.step,
            Direction::Increase => position + self.step,
        }
    }
}

// ─── AxisSpec ───────────────────────────────────────────────────────

/// Static per-axis configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpec {
    /// Axis identity.
    pub id: AxisId,
    /// Byte offset of the axis register from the window base.
    pub offset: usize,
    /// Start position written when the register window is opened.
    pub start: f64,
    /// Incremental limits. `None` for axes driven only by absolute
    /// positioning (Bicep, Elbow, Wrist).
    pub limits: Option<Limits>,
    /// Speed field written with every motion command.
    pub speed: u8,
}

impl AxisSpec {
    /// Boundary check: is one step from `position` in `direction` legal?
    ///
    /// Pure predicate. Axes without incremental limits are never steppable.
    pub fn check(&self, position: f64, direction: Direction) -> bool {
        self.next_position(position, direction).is_some()
    }

    /// The position one step away, or `None` if it would leave the bounds.
    pub fn next_position(&self, position: f64, direction: Direction) -> Option<f64> {
        let limits = self.limits?;
        let candidate = limits.candidate(position, direction);
        limits.contains(candidate).then_some(candidate)
    }

    /// Whether `position` is legal for this axis.
    ///
    /// Bounded axes accept positions inside their limits that lie on the
    /// step grid `min + k * step`. Axes without incremental limits accept
    /// whole degrees the register can encode (0..=255).
    pub fn accepts(&self, position: f64) -> bool {
        match self.limits {
            Some(limits) => {
                let steps = (position - limits.min) / limits.step;
                limits.contains(position) && steps.fract() == 0.0
            }
            None => (0.0..=255.0).contains(&position) && position.fract() == 0.0,
        }
    }
}

/// Speed constant shared by every axis during manual control.
const MANUAL_SPEED: u8 = 20;

/// The axis table, indexed by [`AxisId::index`].
pub static AXIS_TABLE: [AxisSpec; AXIS_COUNT] = [
    AxisSpec {
        id: AxisId::Base,
        offset: BASE_OFFSET,
        start: 105.0,
        limits: Some(Limits {
            min: 60.0,
            max: 240.0,
            step: 1.0,
        }),
        speed: MANUAL_SPEED,
    },
    AxisSpec {
        id: AxisId::Bicep,
        offset: BICEP_OFFSET,
        start: 80.0,
        limits: None,
        speed: MANUAL_SPEED,
    },
    AxisSpec {
        id: AxisId::Elbow,
        offset: ELBOW_OFFSET,
        start: 200.0,
        limits: None,
        speed: MANUAL_SPEED,
    },
    AxisSpec {
        id: AxisId::Wrist,
        offset: WRIST_OFFSET,
        start: 150.0,
        limits: None,
        speed: MANUAL_SPEED,
    },
    AxisSpec {
        id: AxisId::Gripper,
        offset: GRIPPER_OFFSET,
        start: 120.0,
        limits: Some(Limits {
            min: 100.0,
            max: 200.0,
            step: 0.5,
        }),
        speed: MANUAL_SPEED,
    },
];

// ─── ArmPositions ───────────────────────────────────────────────────

/// Current position of every axis, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPositions {
    positions: [f64; AXIS_COUNT],
}

impl ArmPositions {
    /// Positions taken from the axis table start column.
    pub fn start() -> Self {
        let mut positions = [0.0; AXIS_COUNT];
        for spec in &AXIS_TABLE {
            positions[spec.id.index()] = spec.start;
        }
        Self { positions }
    }

    /// Position of `axis`.
    #[inline]
    pub fn get(&self, axis: AxisId) -> f64 {
        self.positions[axis.index()]
    }

    /// Overwrite the position of `axis`.
    #[inline]
    pub fn set(&mut self, axis: AxisId, position: f64) {
        self.positions[axis.index()] = position;
    }

    /// Iterate `(axis, position)` pairs in servo-number order.
    pub fn iter(&self) -> impl Iterator<Item = (AxisId, f64)> + '_ {
        AxisId::ALL.into_iter().map(|axis| (axis, self.get(axis)))
    }
}

impl Default for ArmPositions {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for ArmPositions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (axis, position) in self.iter() {
            match axis {
                AxisId::Gripper => writeln!(f, "{:<8} {:>6.1}", axis.name(), position)?,
                _ => writeln!(f, "{:<8} {:>6}", axis.name(), position as i64)?,
            }
        }
        Ok(())
    }
}
