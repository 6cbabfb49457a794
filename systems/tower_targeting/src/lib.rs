#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that acquires, re-validates and releases a tower's target.
//!
//! The selector favours stability: once a target is held it is kept for as
//! long as it stays alive and within range, even if a closer enemy shows up.
//! Every change between holding a target and holding none is reported exactly
//! once through [`TargetTransition`] values.

use glam::Vec2;
use tower_defence_core::{EnemyId, EnemyView};
use tower_defence_system_proximity::{ProximityEntry, ProximityIndex};
use tracing::debug;

/// Targeting state of a single tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetState {
    /// The tower is idle and scans for candidates every tick.
    #[default]
    NoTarget,
    /// The tower is locked onto the enemy.
    HasTarget(EnemyId),
}

/// Why a held target was released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LossReason {
    /// The target ran out of health.
    Died,
    /// The target moved farther away than the tower's range.
    OutOfRange,
    /// The target no longer exists in the roster.
    Removed,
    /// The surrounding game replaced or cleared the target explicitly.
    Overridden,
}

/// Lifecycle notification emitted whenever the targeting state changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetTransition {
    /// The tower locked onto a new target.
    Found(EnemyId),
    /// The tower released its target.
    Lost {
        /// Enemy that was being targeted.
        enemy: EnemyId,
        /// Reason the target was released.
        reason: LossReason,
    },
}

/// Proof that the tower holds a target that is alive and in range this tick.
///
/// Only [`TargetSelector::handle`] can produce an engagement, so attack logic
/// that requires one cannot run without a validated target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Engagement {
    target: EnemyId,
    target_center: Vec2,
    distance: f32,
}

impl Engagement {
    /// Enemy the tower is engaging.
    #[must_use]
    pub const fn target(&self) -> EnemyId {
        self.target
    }

    /// Center of the target's bounding box this tick.
    #[must_use]
    pub const fn target_center(&self) -> Vec2 {
        self.target_center
    }

    /// Distance from the tower center to the target's position.
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }
}

/// Target selector holding at most one non-owning enemy handle.
#[derive(Debug, Default)]
pub struct TargetSelector {
    state: TargetState,
}

impl TargetSelector {
    /// Creates a selector that starts without a target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current targeting state.
    #[must_use]
    pub const fn state(&self) -> TargetState {
        self.state
    }

    /// Enemy currently held as target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        match self.state {
            TargetState::NoTarget => None,
            TargetState::HasTarget(enemy) => Some(enemy),
        }
    }

    /// Re-validates the held target and acquires a new one when idle.
    ///
    /// A held target is released when it is missing from `index`, meaning it
    /// died, left range, or was removed from the roster. An idle selector then
    /// picks the nearest candidate; among equally near candidates the last one
    /// in index order (the highest [`EnemyId`]) wins. Transitions are appended
    /// to `out` in the order they happened.
    ///
    /// Returns the engagement for this tick when a target is held afterwards.
    pub fn handle(
        &mut self,
        center: Vec2,
        index: &ProximityIndex,
        enemies: &EnemyView,
        out: &mut Vec<TargetTransition>,
    ) -> Option<Engagement> {
        if let TargetState::HasTarget(held) = self.state {
            if index.distance_to(held).is_none() {
                let reason = loss_reason(held, enemies);
                self.release(held, reason, out);
            }
        }

        if self.state == TargetState::NoTarget {
            if let Some(best) = nearest(index) {
                self.acquire(best.enemy, out);
            }
        }

        let TargetState::HasTarget(target) = self.state else {
            return None;
        };
        let snapshot = enemies.get(target)?;
        Some(Engagement {
            target,
            target_center: snapshot.center(),
            distance: center.distance(snapshot.position),
        })
    }

    /// Overrides the held target on behalf of the surrounding game.
    ///
    /// Replacing one target with another reports the loss before the new
    /// acquisition. Requesting the state the selector is already in is a no-op.
    /// The new target is validated on the next [`handle`](Self::handle) call.
    pub fn set(&mut self, target: Option<EnemyId>, out: &mut Vec<TargetTransition>) {
        if self.target() == target {
            return;
        }

        if let TargetState::HasTarget(held) = self.state {
            self.release(held, LossReason::Overridden, out);
        }
        if let Some(next) = target {
            self.acquire(next, out);
        }
    }

    fn acquire(&mut self, enemy: EnemyId, out: &mut Vec<TargetTransition>) {
        self.state = TargetState::HasTarget(enemy);
        debug!(?enemy, "target found");
        out.push(TargetTransition::Found(enemy));
    }

    fn release(&mut self, enemy: EnemyId, reason: LossReason, out: &mut Vec<TargetTransition>) {
        self.state = TargetState::NoTarget;
        debug!(?enemy, ?reason, "target lost");
        out.push(TargetTransition::Lost { enemy, reason });
    }
}

fn nearest(index: &ProximityIndex) -> Option<ProximityEntry> {
    let mut best: Option<ProximityEntry> = None;
    for candidate in index.iter() {
        match &mut best {
            Some(existing) => {
                if candidate.distance <= existing.distance {
                    *existing = *candidate;
                }
            }
            None => best = Some(*candidate),
        }
    }
    best
}

fn loss_reason(enemy: EnemyId, enemies: &EnemyView) -> LossReason {
    match enemies.get(enemy) {
        None => LossReason::Removed,
        Some(snapshot) if !snapshot.alive => LossReason::Died,
        Some(_) => LossReason::OutOfRange,
    }
}
