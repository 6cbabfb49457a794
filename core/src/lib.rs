#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower defence combat engine.
//!
//! This crate defines the vocabulary that connects the enemy world, the pure
//! tower systems, and the adapters driving the frame loop. The world publishes
//! immutable [`EnemyView`] snapshots once per frame, towers read those
//! snapshots to acquire and engage targets, and projectiles spawned by towers
//! implement the [`Projectile`] contract so towers can advance and reclaim
//! them without knowing how they travel or collide.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod stats;

pub use stats::{StatsError, TowerStats, UpgradePrices, ATTACK_RATE_GROWTH};

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Generation-checked handle into the enemy roster.
///
/// A slot index alone is not enough to identify an enemy because roster slots
/// are recycled. Pairing the slot with its generation guarantees that a handle
/// held across frames never resolves to a different enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId {
    index: u32,
    generation: u32,
}

impl EnemyId {
    /// Creates a new enemy handle from a slot index and its generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot occupied by the enemy within the roster.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time the enemy was spawned.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Tower that fries enemies with a continuous arc once engaged.
    Electric,
    /// Tower that lobs fireballs at its target.
    Fire,
    /// Tower that fires ice shards at its target.
    Ice,
}

impl TowerKind {
    /// Every constructible tower kind in display order.
    pub const ALL: [TowerKind; 3] = [Self::Electric, Self::Fire, Self::Ice];

    /// Returns the statistics and prices a freshly built tower starts with.
    ///
    /// All kinds currently share the same baseline; what distinguishes them is
    /// the attack behaviour wired in by the adapter.
    #[must_use]
    pub const fn profile(self) -> TowerProfile {
        match self {
            Self::Electric | Self::Fire | Self::Ice => TowerProfile {
                range: 150.0,
                damage: 1.0,
                attack_rate: 2.0,
                prices: UpgradePrices::new(50, 10, 10, 10),
            },
        }
    }
}

/// Baseline configuration applied to newly constructed towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerProfile {
    /// Targeting radius measured in world units.
    pub range: f32,
    /// Damage dealt by a single projectile.
    pub damage: f32,
    /// Number of discrete attacks per second.
    pub attack_rate: f32,
    /// Initial prices for the tower and each upgrade category.
    pub prices: UpgradePrices,
}

/// Multiplier applied to elapsed time before the tower consumes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationSpeed {
    /// Elapsed time is consumed as provided.
    #[default]
    Normal,
    /// Elapsed time is doubled, making the tower act twice as fast.
    Double,
}

impl SimulationSpeed {
    /// Scales the elapsed frame time according to the active speed.
    #[must_use]
    pub fn scale(self, dt: Duration) -> Duration {
        match self {
            Self::Normal => dt,
            Self::Double => dt.saturating_mul(2),
        }
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle identifying the enemy within the roster.
    pub id: EnemyId,
    /// Lower-left corner of the enemy's bounding box.
    pub position: Vec2,
    /// Extent of the enemy's bounding box.
    pub size: Vec2,
    /// Whether the enemy still has health remaining.
    pub alive: bool,
}

impl EnemySnapshot {
    /// Midpoint of the enemy's bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

/// Read-only snapshot describing every enemy on the field for a single frame.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided enemy.
    ///
    /// Returns `None` when the enemy was removed from the roster or its slot
    /// was recycled for a different enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Contract every projectile owned by a tower must satisfy.
///
/// Travel and collision are the projectile's own business. Towers only
/// advance projectiles once per tick and reclaim them once they report that
/// they are no longer visible.
pub trait Projectile {
    /// Integrates the projectile forward by the provided elapsed time.
    fn advance(&mut self, dt: Duration);

    /// Reports whether the projectile is still live and should be kept.
    fn is_visible(&self) -> bool;
}
