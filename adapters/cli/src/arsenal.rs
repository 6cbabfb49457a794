//! Attack behaviour of each tower kind.

use std::time::Duration;

use tower_defence_core::{EnemyId, TowerKind};
use tower_defence_tower::{LossReason, Shot, TowerHooks};
use tower_defence_world::{Arena, Bullet, BulletConfig};
use tracing::debug;

/// Fraction of the tower damage an electric arc deals per second.
const ARC_DAMAGE_PER_SECOND: f32 = 0.5;

/// Damage queued by a continuous attack, applied after every tower has updated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ArcStrike {
    pub(crate) enemy: EnemyId,
    pub(crate) amount: f32,
}

/// Hooks shared by every tower kind, dispatching on the kind for behaviour.
#[derive(Debug)]
pub(crate) struct Arsenal {
    kind: TowerKind,
    arena: Arena,
    arc: Option<EnemyId>,
    strikes: Vec<ArcStrike>,
}

impl Arsenal {
    pub(crate) fn new(kind: TowerKind, arena: Arena) -> Self {
        Self {
            kind,
            arena,
            arc: None,
            strikes: Vec::new(),
        }
    }

    /// Enemy an electric tower is currently arcing into.
    pub(crate) fn arc(&self) -> Option<EnemyId> {
        self.arc
    }

    /// Hands over the continuous damage queued since the last drain.
    pub(crate) fn drain_strikes(&mut self) -> impl Iterator<Item = ArcStrike> + '_ {
        self.strikes.drain(..)
    }

    fn bullet_config(&self) -> BulletConfig {
        match self.kind {
            TowerKind::Electric => BulletConfig {
                speed: 500.0,
                radius: 3.0,
                lifetime: Duration::from_secs(1),
            },
            TowerKind::Fire => BulletConfig::default(),
            TowerKind::Ice => BulletConfig {
                speed: 250.0,
                radius: 6.0,
                lifetime: Duration::from_secs(3),
            },
        }
    }
}

impl TowerHooks for Arsenal {
    type Projectile = Bullet;

    fn discrete_fire(&mut self, shot: &Shot) -> Bullet {
        Bullet::aimed(
            shot.tower,
            shot.origin,
            shot.target_center,
            shot.damage,
            self.bullet_config(),
            self.arena,
        )
    }

    fn continuous_fire(&mut self, shot: &Shot, dt: Duration) {
        if self.kind != TowerKind::Electric {
            return;
        }

        self.strikes.push(ArcStrike {
            enemy: shot.target,
            amount: shot.damage * ARC_DAMAGE_PER_SECOND * dt.as_secs_f32(),
        });
    }

    fn target_found(&mut self, target: EnemyId) {
        if self.kind == TowerKind::Electric {
            self.arc = Some(target);
        }
        debug!(kind = ?self.kind, enemy = ?target, "tower engaged");
    }

    fn target_lost(&mut self, target: EnemyId, reason: LossReason) {
        self.arc = None;
        debug!(kind = ?self.kind, enemy = ?target, ?reason, "tower disengaged");
    }
}
