#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that indexes the living enemies within a tower's range.
//!
//! The index is rebuilt from scratch on every tick. Enemies move and die
//! continuously and the world publishes no change notifications, so nothing
//! from a previous tick survives a rebuild.

use glam::Vec2;
use tower_defence_core::{EnemyId, EnemyView};
use tracing::trace;

/// Living enemy within range, paired with its distance to the tower center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityEntry {
    /// Enemy that satisfied the range and liveness checks.
    pub enemy: EnemyId,
    /// Distance from the tower center to the enemy's position.
    pub distance: f32,
}

/// Distance-keyed candidate set recomputed every tick.
///
/// Entries are kept in ascending [`EnemyId`] order, mirroring the order of the
/// [`EnemyView`] they were built from.
#[derive(Debug, Default)]
pub struct ProximityIndex {
    entries: Vec<ProximityEntry>,
}

impl ProximityIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the index contents with the enemies that are alive and within
    /// `range` of `center`.
    ///
    /// An enemy exactly `range` away is included; one whose distance is not a
    /// number never is.
    pub fn rebuild(&mut self, center: Vec2, range: f32, enemies: &EnemyView) {
        self.entries.clear();
        self.entries.reserve(enemies.len());

        for enemy in enemies.iter() {
            if !enemy.alive {
                continue;
            }

            let distance = center.distance(enemy.position);
            if distance <= range {
                self.entries.push(ProximityEntry {
                    enemy: enemy.id,
                    distance,
                });
            }
        }

        trace!(candidates = self.entries.len(), "proximity index rebuilt");
    }

    /// Iterator over the indexed candidates in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ProximityEntry> {
        self.entries.iter()
    }

    /// Distance recorded for the enemy, or `None` if it is not a candidate.
    #[must_use]
    pub fn distance_to(&self, enemy: EnemyId) -> Option<f32> {
        self.entries
            .binary_search_by_key(&enemy, |entry| entry.enemy)
            .ok()
            .map(|index| self.entries[index].distance)
    }

    /// Number of candidates in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no enemy qualified during the last rebuild.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::EnemySnapshot;

    fn enemy(index: u32, position: (f32, f32), alive: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(index, 0),
            position: Vec2::new(position.0, position.1),
            size: Vec2::splat(2.0),
            alive,
        }
    }

    fn ids(index: &ProximityIndex) -> Vec<u32> {
        index.iter().map(|entry| entry.enemy.index()).collect()
    }

    #[test]
    fn includes_only_living_enemies_within_range() {
        let view = EnemyView::from_snapshots(vec![
            enemy(1, (3.0, 4.0), true),
            enemy(2, (30.0, 0.0), true),
            enemy(3, (1.0, 1.0), false),
            enemy(4, (0.0, -9.0), true),
        ]);

        let mut index = ProximityIndex::new();
        index.rebuild(Vec2::ZERO, 10.0, &view);

        assert_eq!(ids(&index), vec![1, 4]);
        assert_eq!(index.distance_to(EnemyId::new(1, 0)), Some(5.0));
        assert_eq!(index.distance_to(EnemyId::new(3, 0)), None);
    }

    #[test]
    fn enemy_exactly_at_range_is_included() {
        let view = EnemyView::from_snapshots(vec![
            enemy(1, (6.0, 8.0), true),
            enemy(2, (6.0, 8.000_1), true),
        ]);

        let mut index = ProximityIndex::new();
        index.rebuild(Vec2::ZERO, 10.0, &view);

        assert_eq!(ids(&index), vec![1]);
    }

    #[test]
    fn non_finite_positions_are_never_indexed() {
        let view = EnemyView::from_snapshots(vec![
            enemy(1, (f32::NAN, 0.0), true),
            enemy(2, (f32::INFINITY, 0.0), true),
            enemy(3, (2.0, 0.0), true),
        ]);

        let mut index = ProximityIndex::new();
        index.rebuild(Vec2::ZERO, 10.0, &view);

        assert_eq!(ids(&index), vec![3]);

        index.rebuild(Vec2::ZERO, f32::INFINITY, &view);
        assert_eq!(ids(&index), vec![2, 3]);
    }

    #[test]
    fn rebuild_discards_previous_entries() {
        let mut index = ProximityIndex::new();
        index.rebuild(
            Vec2::ZERO,
            10.0,
            &EnemyView::from_snapshots(vec![enemy(1, (1.0, 0.0), true)]),
        );
        assert_eq!(index.len(), 1);

        index.rebuild(
            Vec2::ZERO,
            10.0,
            &EnemyView::from_snapshots(vec![enemy(1, (1.0, 0.0), false)]),
        );
        assert!(index.is_empty(), "dead enemy must not linger");
    }

    #[test]
    fn empty_roster_yields_empty_index() {
        let mut index = ProximityIndex::new();
        index.rebuild(Vec2::new(5.0, 5.0), 100.0, &EnemyView::default());
        assert!(index.is_empty());
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn distance_is_measured_from_enemy_position() {
        let view = EnemyView::from_snapshots(vec![enemy(7, (0.0, 10.0), true)]);

        let mut index = ProximityIndex::new();
        index.rebuild(Vec2::ZERO, 10.0, &view);

        assert_eq!(index.distance_to(EnemyId::new(7, 0)), Some(10.0));
    }
}
