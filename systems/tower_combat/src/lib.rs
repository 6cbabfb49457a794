#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims an engaged tower and gates its discrete attacks.

use std::time::Duration;

use glam::Vec2;
use tower_defence_system_tower_targeting::Engagement;
use tracing::trace;

/// Offset applied so that the sprite's "up" axis faces the target.
pub const FACING_OFFSET_DEGREES: f32 = 90.0;

/// Computes the facing rotation, in degrees, for a tower at `from` aiming at `to`.
///
/// The angle of the aim vector is measured counter-clockwise from the positive
/// x axis (y pointing up) and normalised into `[0, 360)` before the facing
/// offset is added, so results lie in `[90, 450)`.
#[must_use]
pub fn aim_rotation(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    let mut angle = delta.y.atan2(delta.x).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    angle + FACING_OFFSET_DEGREES
}

/// Outcome of a single aim and fire step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireDecision {
    /// Facing rotation toward the engaged target, in degrees.
    pub rotation: f32,
    /// Whether the cadence elapsed and a discrete attack must be launched.
    pub discrete: bool,
}

/// Aim and cadence state of a single tower.
#[derive(Debug, Default)]
pub struct FireController {
    rotation: f32,
    accumulated: Duration,
}

impl FireController {
    /// Creates a controller facing zero degrees with an empty cadence accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last computed facing rotation in degrees.
    ///
    /// The rotation is kept while the tower is idle.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Time accumulated since the last discrete attack.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Aims at the engaged target and advances the cadence accumulator by `dt`.
    ///
    /// Once the accumulator reaches `period` it resets to zero and the decision
    /// requests one discrete attack. Overshoot is discarded, so a single call
    /// never requests more than one attack however large `dt` is.
    pub fn handle(
        &mut self,
        center: Vec2,
        engagement: &Engagement,
        dt: Duration,
        period: Duration,
    ) -> FireDecision {
        self.rotation = aim_rotation(center, engagement.target_center());

        self.accumulated = self.accumulated.saturating_add(dt);
        let discrete = self.accumulated >= period;
        if discrete {
            trace!(enemy = ?engagement.target(), "cadence elapsed");
            self.accumulated = Duration::ZERO;
        }

        FireDecision {
            rotation: self.rotation,
            discrete,
        }
    }
}
