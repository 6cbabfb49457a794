//! Generational arena that owns every enemy on the field.

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{EnemyId, EnemySnapshot, EnemyView};
use tracing::debug;

/// Parameters describing an enemy that should enter the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpawn {
    /// Lower-left corner of the enemy's bounding box.
    pub position: Vec2,
    /// Extent of the enemy's bounding box.
    pub size: Vec2,
    /// Distance travelled per second.
    pub velocity: Vec2,
    /// Health the enemy starts with.
    pub health: f32,
}

/// Mutable state of a single enemy stored inside the roster.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    position: Vec2,
    size: Vec2,
    velocity: Vec2,
    health: f32,
}

impl Enemy {
    /// Lower-left corner of the enemy's bounding box.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Distance travelled per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Health remaining before the enemy dies.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Reports whether the enemy still has health remaining.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Reports whether the point lies within the enemy's bounding box grown by `margin`.
    #[must_use]
    pub fn overlaps(&self, point: Vec2, margin: f32) -> bool {
        let min = self.position - Vec2::splat(margin);
        let max = self.position + self.size + Vec2::splat(margin);
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    enemy: Option<Enemy>,
}

/// Registry that stores enemies and hands out generation-checked handles.
#[derive(Debug, Default)]
pub struct EnemyRoster {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl EnemyRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new enemy on the field and returns its handle.
    pub fn spawn(&mut self, spawn: EnemySpawn) -> EnemyId {
        let enemy = Enemy {
            position: spawn.position,
            size: spawn.size,
            velocity: spawn.velocity,
            health: spawn.health,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.enemy = Some(enemy);
                EnemyId::new(index, slot.generation)
            }
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    enemy: Some(enemy),
                });
                EnemyId::new(index, 0)
            }
        };

        debug!(enemy = ?id, "enemy spawned");
        id
    }

    /// Resolves a handle to the enemy it was issued for.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.enemy.as_ref())
    }

    fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.enemy.as_mut())
    }

    /// Subtracts `amount` health from a living enemy.
    ///
    /// Returns `true` when this hit killed the enemy. Hits on dead or missing
    /// enemies are ignored.
    pub fn apply_damage(&mut self, id: EnemyId, amount: f32) -> bool {
        let Some(enemy) = self.get_mut(id) else {
            return false;
        };
        if !enemy.is_alive() {
            return false;
        }

        enemy.health -= amount;
        let killed = !enemy.is_alive();
        if killed {
            debug!(enemy = ?id, "enemy killed");
        }
        killed
    }

    /// Moves every living enemy along its velocity.
    pub fn advance(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        for enemy in self.iter_enemies_mut().filter(|enemy| enemy.is_alive()) {
            enemy.position += enemy.velocity * seconds;
        }
    }

    /// Removes the enemy and retires its handle.
    pub fn despawn(&mut self, id: EnemyId) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation() && slot.enemy.is_some())
        else {
            return false;
        };

        slot.enemy = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        true
    }

    /// Removes every dead enemy, appending their retired handles to `out`.
    pub fn reap_dead(&mut self, out: &mut Vec<EnemyId>) {
        let dead: Vec<EnemyId> = self
            .iter()
            .filter(|(_, enemy)| !enemy.is_alive())
            .map(|(id, _)| id)
            .collect();

        for id in dead {
            if self.despawn(id) {
                out.push(id);
            }
        }
    }

    /// Iterator over every enemy currently stored, dead or alive.
    pub fn iter(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let index = u32::try_from(index).ok()?;
            slot.enemy
                .as_ref()
                .map(|enemy| (EnemyId::new(index, slot.generation), enemy))
        })
    }

    fn iter_enemies_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.slots.iter_mut().filter_map(|slot| slot.enemy.as_mut())
    }

    /// Number of enemies currently stored, dead or alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Reports whether the roster holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captures an immutable snapshot of every stored enemy.
    #[must_use]
    pub fn view(&self) -> EnemyView {
        EnemyView::from_snapshots(
            self.iter()
                .map(|(id, enemy)| EnemySnapshot {
                    id,
                    position: enemy.position,
                    size: enemy.size,
                    alive: enemy.is_alive(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_at(x: f32, y: f32) -> EnemySpawn {
        EnemySpawn {
            position: Vec2::new(x, y),
            size: Vec2::splat(10.0),
            velocity: Vec2::new(1.0, 0.0),
            health: 3.0,
        }
    }

    #[test]
    fn recycled_slots_bump_generation() {
        let mut roster = EnemyRoster::new();
        let first = roster.spawn(spawn_at(0.0, 0.0));
        assert!(roster.despawn(first));

        let second = roster.spawn(spawn_at(5.0, 5.0));
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert!(roster.get(first).is_none());
        assert!(roster.get(second).is_some());
    }

    #[test]
    fn damage_kills_once_and_reaping_removes_corpse() {
        let mut roster = EnemyRoster::new();
        let id = roster.spawn(spawn_at(0.0, 0.0));

        assert!(!roster.apply_damage(id, 1.0));
        assert!(roster.apply_damage(id, 2.0));
        assert!(!roster.apply_damage(id, 2.0), "corpse cannot die twice");

        let view = roster.view();
        assert_eq!(view.get(id).map(|enemy| enemy.alive), Some(false));

        let mut reaped = Vec::new();
        roster.reap_dead(&mut reaped);
        assert_eq!(reaped, vec![id]);
        assert!(roster.is_empty());
        assert!(roster.view().is_empty());
    }

    #[test]
    fn advance_moves_only_living_enemies() {
        let mut roster = EnemyRoster::new();
        let walker = roster.spawn(spawn_at(0.0, 0.0));
        let corpse = roster.spawn(spawn_at(0.0, 0.0));
        let _ = roster.apply_damage(corpse, 10.0);

        roster.advance(Duration::from_secs(2));

        assert_eq!(
            roster.get(walker).map(Enemy::position),
            Some(Vec2::new(2.0, 0.0))
        );
        assert_eq!(roster.get(corpse).map(Enemy::position), Some(Vec2::ZERO));
    }

    #[test]
    fn despawning_stale_handle_is_rejected() {
        let mut roster = EnemyRoster::new();
        let id = roster.spawn(spawn_at(0.0, 0.0));
        assert!(roster.despawn(id));
        assert!(!roster.despawn(id));
        assert_eq!(roster.len(), 0);
    }

    #[test]
    fn overlap_accounts_for_margin() {
        let mut roster = EnemyRoster::new();
        let id = roster.spawn(spawn_at(0.0, 0.0));
        let enemy = roster.get(id).expect("enemy exists");

        assert!(enemy.overlaps(Vec2::new(5.0, 5.0), 0.0));
        assert!(!enemy.overlaps(Vec2::new(12.0, 5.0), 0.0));
        assert!(enemy.overlaps(Vec2::new(12.0, 5.0), 2.0));
    }
}
