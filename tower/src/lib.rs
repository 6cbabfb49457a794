#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stationary tower that acquires, tracks and attacks enemies every frame.
//!
//! A [`Tower`] runs four pure systems in a fixed order on every
//! [`update`](Tower::update): the proximity index is rebuilt from the frame's
//! [`EnemyView`], the target selector re-validates or acquires a target, the
//! fire controller aims and gates discrete attacks, and finally the owned
//! projectiles are advanced and reclaimed. Variant specific behaviour is
//! supplied through [`TowerHooks`].

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{
    EnemyId, EnemyView, SimulationSpeed, StatsError, TowerId, TowerKind, TowerStats,
    UpgradePrices,
};
use tower_defence_system_projectiles::ProjectileLifecycle;
use tower_defence_system_proximity::ProximityIndex;
use tower_defence_system_tower_combat::FireController;
use tower_defence_system_tower_targeting::{Engagement, TargetSelector, TargetTransition};
use tracing::debug;

mod hooks;

pub use hooks::{Shot, TowerHooks};
pub use tower_defence_system_tower_targeting::{LossReason, TargetState};

/// Axis-aligned area a tower occupies on the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    /// Lower-left corner of the tower.
    pub position: Vec2,
    /// Width and height of the tower.
    pub size: Vec2,
}

impl Footprint {
    /// Creates a footprint from its lower-left corner and size.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Midpoint of the footprint.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

/// Range circle a renderer draws around a selected tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionRing {
    /// Center of the circle.
    pub center: Vec2,
    /// Radius of the circle, equal to the tower's range.
    pub radius: f32,
}

/// What happened during a single tower update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickSummary {
    /// Enemy engaged at the end of the tick, if any.
    pub engaged: Option<EnemyId>,
    /// Whether a projectile was launched.
    pub fired: bool,
    /// Number of projectiles reclaimed.
    pub reclaimed: usize,
}

/// Tower entity combining targeting, aiming, firing and projectile upkeep.
pub struct Tower<H: TowerHooks> {
    id: TowerId,
    kind: TowerKind,
    footprint: Footprint,
    stats: TowerStats,
    prices: UpgradePrices,
    selected: bool,
    speed: SimulationSpeed,
    proximity: ProximityIndex,
    selector: TargetSelector,
    fire: FireController,
    projectiles: ProjectileLifecycle<H::Projectile>,
    transitions: Vec<TargetTransition>,
    hooks: H,
}

impl<H: TowerHooks> Tower<H> {
    /// Builds a tower of the given kind with the kind's baseline profile.
    pub fn new(
        id: TowerId,
        kind: TowerKind,
        footprint: Footprint,
        hooks: H,
    ) -> Result<Self, StatsError> {
        let profile = kind.profile();
        let stats = TowerStats::new(profile.range, profile.damage, profile.attack_rate)?;
        Ok(Self::with_stats(id, kind, footprint, stats, profile.prices, hooks))
    }

    /// Builds a tower with explicit statistics and prices.
    #[must_use]
    pub fn with_stats(
        id: TowerId,
        kind: TowerKind,
        footprint: Footprint,
        stats: TowerStats,
        prices: UpgradePrices,
        hooks: H,
    ) -> Self {
        Self {
            id,
            kind,
            footprint,
            stats,
            prices,
            selected: false,
            speed: SimulationSpeed::Normal,
            proximity: ProximityIndex::new(),
            selector: TargetSelector::new(),
            fire: FireController::new(),
            projectiles: ProjectileLifecycle::new(),
            transitions: Vec::new(),
            hooks,
        }
    }

    /// Runs one full simulation tick against the frame's enemy snapshot.
    ///
    /// The snapshot is the tower's only view of enemies, so damage dealt later
    /// in the same frame only becomes visible on the next update.
    pub fn update(&mut self, dt: Duration, enemies: &EnemyView) -> TickSummary {
        let dt = self.speed.scale(dt);
        let center = self.center();

        self.proximity.rebuild(center, self.stats.range(), enemies);

        self.transitions.clear();
        let engagement = self.selector.handle(
            center,
            &self.proximity,
            enemies,
            &mut self.transitions,
        );
        dispatch(&mut self.hooks, &mut self.transitions);

        let fired = match engagement {
            Some(engagement) => self.engage(center, &engagement, dt),
            None => false,
        };

        let reclaimed = self.projectiles.handle(dt);

        TickSummary {
            engaged: engagement.map(|engagement| engagement.target()),
            fired,
            reclaimed,
        }
    }

    fn engage(&mut self, center: Vec2, engagement: &Engagement, dt: Duration) -> bool {
        let decision = self
            .fire
            .handle(center, engagement, dt, self.stats.fire_period());

        let shot = Shot {
            tower: self.id,
            kind: self.kind,
            origin: center,
            target: engagement.target(),
            target_center: engagement.target_center(),
            damage: self.stats.damage(),
        };

        self.hooks.continuous_fire(&shot, dt);

        if decision.discrete {
            debug!(tower = self.id.get(), enemy = ?shot.target, "projectile launched");
            let projectile = self.hooks.discrete_fire(&shot);
            self.projectiles.launch(projectile);
        }

        decision.discrete
    }

    /// Replaces the held target on behalf of the surrounding game.
    ///
    /// The found and lost hooks fire for every real change; repeating the
    /// current state does nothing. The new target is validated on the next
    /// update and released if it is dead or out of range.
    pub fn set_target(&mut self, target: Option<EnemyId>) {
        self.transitions.clear();
        self.selector.set(target, &mut self.transitions);
        dispatch(&mut self.hooks, &mut self.transitions);
    }

    /// Enemy currently targeted, if any.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.selector.target()
    }

    /// Current targeting state.
    #[must_use]
    pub const fn target_state(&self) -> TargetState {
        self.selector.state()
    }

    /// Identifier allocated to the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Kind of tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Midpoint of the tower, used for every distance and aim computation.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.footprint.center()
    }

    /// Facing rotation in degrees; kept from the last engagement while idle.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.fire.rotation()
    }

    /// Targeting radius.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.stats.range()
    }

    /// Damage per discrete attack.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.stats.damage()
    }

    /// Discrete attacks per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.stats.attack_rate()
    }

    /// Adds one point of damage and raises the damage upgrade price.
    pub fn increase_damage(&mut self) {
        self.stats.increase_damage();
        self.prices.bump_damage();
    }

    /// Widens the range by `delta` and raises the range upgrade price.
    ///
    /// Neither the range nor the price change when the delta is rejected.
    pub fn increase_range(&mut self, delta: f32) -> Result<(), StatsError> {
        self.stats.increase_range(delta)?;
        self.prices.bump_range();
        Ok(())
    }

    /// Compounds the attack rate by 10% and raises the speed upgrade price.
    ///
    /// Neither the rate nor the price change once the rate can grow no further.
    pub fn increase_speed(&mut self) -> Result<(), StatsError> {
        self.stats.increase_attack_rate()?;
        self.prices.bump_speed();
        Ok(())
    }

    /// Price of the tower and of its next upgrades.
    #[must_use]
    pub const fn prices(&self) -> UpgradePrices {
        self.prices
    }

    /// Price paid to build this tower.
    #[must_use]
    pub const fn tower_price(&self) -> u32 {
        self.prices.tower()
    }

    /// Price of the next range upgrade.
    #[must_use]
    pub const fn range_price(&self) -> u32 {
        self.prices.range()
    }

    /// Price of the next damage upgrade.
    #[must_use]
    pub const fn damage_price(&self) -> u32 {
        self.prices.damage()
    }

    /// Price of the next speed upgrade.
    #[must_use]
    pub const fn speed_price(&self) -> u32 {
        self.prices.speed()
    }

    /// Reports whether the player selected this tower.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Marks the tower as selected or deselected.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Range circle to draw while the tower is selected.
    #[must_use]
    pub fn selection_ring(&self) -> Option<SelectionRing> {
        self.selected.then(|| SelectionRing {
            center: self.center(),
            radius: self.stats.range(),
        })
    }

    /// Makes the tower consume elapsed time twice as fast.
    pub fn double_speed_clicked(&mut self) {
        self.speed = SimulationSpeed::Double;
    }

    /// Restores normal time consumption.
    pub fn normal_speed_clicked(&mut self) {
        self.speed = SimulationSpeed::Normal;
    }

    /// Active time multiplier.
    #[must_use]
    pub const fn simulation_speed(&self) -> SimulationSpeed {
        self.speed
    }

    /// Candidates found during the last update.
    #[must_use]
    pub const fn proximity(&self) -> &ProximityIndex {
        &self.proximity
    }

    /// Projectiles in flight, in launch order, for external drawing.
    pub fn projectiles(&self) -> impl Iterator<Item = &H::Projectile> {
        self.projectiles.iter()
    }

    /// Mutable access to projectiles in flight for external collision passes.
    pub fn projectiles_mut(&mut self) -> impl Iterator<Item = &mut H::Projectile> {
        self.projectiles.iter_mut()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Variant hooks driving this tower.
    #[must_use]
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable access to the variant hooks.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}

fn dispatch<H: TowerHooks>(hooks: &mut H, transitions: &mut Vec<TargetTransition>) {
    for transition in transitions.drain(..) {
        match transition {
            TargetTransition::Found(enemy) => hooks.target_found(enemy),
            TargetTransition::Lost { enemy, reason } => hooks.target_lost(enemy, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{EnemySnapshot, Projectile};

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum HookCall {
        Found(EnemyId),
        Lost(EnemyId, LossReason),
        Continuous(EnemyId),
        Discrete(EnemyId),
    }

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<HookCall>,
        dart_lifetime: u32,
    }

    impl Recorder {
        fn discrete_count(&self) -> usize {
            self.calls
                .iter()
                .filter(|call| matches!(call, HookCall::Discrete(_)))
                .count()
        }

        fn lifecycle(&self) -> Vec<HookCall> {
            self.calls
                .iter()
                .copied()
                .filter(|call| matches!(call, HookCall::Found(_) | HookCall::Lost(..)))
                .collect()
        }
    }

    #[derive(Debug)]
    struct Dart {
        advances: u32,
        lifetime: u32,
    }

    impl Projectile for Dart {
        fn advance(&mut self, _dt: Duration) {
            self.advances += 1;
        }

        fn is_visible(&self) -> bool {
            self.advances < self.lifetime
        }
    }

    impl TowerHooks for Recorder {
        type Projectile = Dart;

        fn discrete_fire(&mut self, shot: &Shot) -> Dart {
            self.calls.push(HookCall::Discrete(shot.target));
            Dart {
                advances: 0,
                lifetime: self.dart_lifetime,
            }
        }

        fn continuous_fire(&mut self, shot: &Shot, _dt: Duration) {
            self.calls.push(HookCall::Continuous(shot.target));
        }

        fn target_found(&mut self, target: EnemyId) {
            self.calls.push(HookCall::Found(target));
        }

        fn target_lost(&mut self, target: EnemyId, reason: LossReason) {
            self.calls.push(HookCall::Lost(target, reason));
        }
    }

    const TICK: Duration = Duration::from_millis(100);

    fn tower(range: f32, dart_lifetime: u32) -> Tower<Recorder> {
        let stats = TowerStats::new(range, 1.0, 2.0).expect("valid stats");
        Tower::with_stats(
            TowerId::new(1),
            TowerKind::Fire,
            Footprint::new(Vec2::splat(-1.0), Vec2::splat(2.0)),
            stats,
            UpgradePrices::new(50, 10, 10, 10),
            Recorder {
                calls: Vec::new(),
                dart_lifetime,
            },
        )
    }

    fn enemy(index: u32, position: (f32, f32), alive: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(index, 0),
            position: Vec2::new(position.0, position.1),
            size: Vec2::ZERO,
            alive,
        }
    }

    fn view(snapshots: Vec<EnemySnapshot>) -> EnemyView {
        EnemyView::from_snapshots(snapshots)
    }

    #[test]
    fn nearest_enemy_is_engaged_and_replaced_after_death() {
        let mut tower = tower(10.0, 100);
        let a = EnemyId::new(1, 0);
        let b = EnemyId::new(2, 0);

        let summary = tower.update(
            TICK,
            &view(vec![enemy(1, (5.0, 0.0), true), enemy(2, (0.0, 3.0), true)]),
        );
        assert_eq!(summary.engaged, Some(b));
        assert_eq!(tower.target(), Some(b));
        assert_eq!(tower.proximity().len(), 2);

        let summary = tower.update(
            TICK,
            &view(vec![enemy(1, (5.0, 0.0), true), enemy(2, (0.0, 3.0), false)]),
        );
        assert_eq!(summary.engaged, Some(a));
        assert_eq!(tower.proximity().distance_to(b), None);
        assert_eq!(
            tower.hooks().lifecycle(),
            vec![
                HookCall::Found(b),
                HookCall::Lost(b, LossReason::Died),
                HookCall::Found(a),
            ]
        );
    }

    #[test]
    fn discrete_fire_happens_every_fifth_tick() {
        let mut tower = tower(10.0, 100);
        let enemies = view(vec![enemy(1, (0.0, 5.0), true)]);

        let fired: Vec<bool> = (0..10).map(|_| tower.update(TICK, &enemies).fired).collect();

        assert_eq!(
            fired,
            vec![false, false, false, false, true, false, false, false, false, true]
        );
        assert_eq!(tower.hooks().discrete_count(), 2);
        assert_eq!(tower.projectile_count(), 2);
    }

    #[test]
    fn continuous_fire_runs_every_engaged_tick() {
        let mut tower = tower(10.0, 100);
        let target = EnemyId::new(1, 0);

        for _ in 0..3 {
            let _ = tower.update(TICK, &view(vec![enemy(1, (0.0, 5.0), true)]));
        }
        let _ = tower.update(TICK, &view(Vec::new()));

        let continuous = tower
            .hooks()
            .calls
            .iter()
            .filter(|call| **call == HookCall::Continuous(target))
            .count();
        assert_eq!(continuous, 3);
    }

    #[test]
    fn spent_projectile_is_reclaimed_in_the_tick_it_expires() {
        let mut tower = tower(10.0, 1);
        let enemies = view(vec![enemy(1, (0.0, 5.0), true)]);

        for _ in 0..4 {
            let summary = tower.update(TICK, &enemies);
            assert_eq!(summary.reclaimed, 0);
        }
        let summary = tower.update(TICK, &enemies);
        assert!(summary.fired);
        assert_eq!(summary.reclaimed, 1);
        assert_eq!(tower.projectile_count(), 0);
    }

    #[test]
    fn projectiles_keep_flying_after_target_is_lost() {
        let mut tower = tower(10.0, 3);
        for _ in 0..5 {
            let _ = tower.update(TICK, &view(vec![enemy(1, (0.0, 5.0), true)]));
        }
        assert_eq!(tower.projectile_count(), 1);

        let _ = tower.update(TICK, &view(Vec::new()));
        assert_eq!(tower.projectile_count(), 1);
        let summary = tower.update(TICK, &view(Vec::new()));
        assert_eq!(summary.reclaimed, 1);
        assert_eq!(tower.projectile_count(), 0);
    }

    #[test]
    fn target_above_center_sets_rotation_to_one_eighty() {
        let mut tower = tower(10.0, 100);
        let _ = tower.update(TICK, &view(vec![enemy(1, (0.0, 4.0), true)]));

        assert_eq!(tower.rotation(), 180.0);

        let _ = tower.update(TICK, &view(Vec::new()));
        assert_eq!(tower.rotation(), 180.0, "idle tower keeps its facing");
    }

    #[test]
    fn target_leaving_range_fires_lost_exactly_once() {
        let mut tower = tower(10.0, 100);
        let target = EnemyId::new(1, 0);

        let _ = tower.update(TICK, &view(vec![enemy(1, (0.0, 9.0), true)]));
        let _ = tower.update(TICK, &view(vec![enemy(1, (0.0, 12.0), true)]));
        let _ = tower.update(TICK, &view(vec![enemy(1, (0.0, 14.0), true)]));

        assert_eq!(tower.target(), None);
        assert_eq!(
            tower.hooks().lifecycle(),
            vec![
                HookCall::Found(target),
                HookCall::Lost(target, LossReason::OutOfRange),
            ]
        );
    }

    #[test]
    fn empty_roster_behaves_like_no_candidates() {
        let mut tower = tower(10.0, 100);
        let summary = tower.update(TICK, &EnemyView::default());

        assert_eq!(summary, TickSummary::default());
        assert!(tower.hooks().calls.is_empty());
        assert_eq!(tower.target_state(), TargetState::NoTarget);
    }

    #[test]
    fn double_speed_halves_time_between_shots() {
        let mut tower = tower(10.0, 100);
        tower.double_speed_clicked();
        let enemies = view(vec![enemy(1, (0.0, 5.0), true)]);

        let shots = (0..10)
            .filter(|_| tower.update(Duration::from_millis(50), &enemies).fired)
            .count();
        assert_eq!(shots, 2);

        tower.normal_speed_clicked();
        assert_eq!(tower.simulation_speed(), SimulationSpeed::Normal);
    }

    #[test]
    fn external_override_notifies_hooks() {
        let mut tower = tower(10.0, 100);
        let first = EnemyId::new(1, 0);
        let second = EnemyId::new(2, 0);

        tower.set_target(Some(first));
        tower.set_target(Some(first));
        tower.set_target(Some(second));
        tower.set_target(None);

        assert_eq!(
            tower.hooks().lifecycle(),
            vec![
                HookCall::Found(first),
                HookCall::Lost(first, LossReason::Overridden),
                HookCall::Found(second),
                HookCall::Lost(second, LossReason::Overridden),
            ]
        );
    }

    #[test]
    fn upgrades_adjust_stats_and_prices() {
        let mut tower = tower(10.0, 100);

        tower.increase_speed().expect("rate grows");
        assert!((tower.speed() - 2.2).abs() < 1e-6);
        tower.increase_speed().expect("rate grows");
        assert!((tower.speed() - 2.42).abs() < 1e-6);
        assert_eq!(tower.speed_price(), 12);

        tower.increase_damage();
        assert!((tower.damage() - 2.0).abs() < f32::EPSILON);
        assert_eq!(tower.damage_price(), 11);

        tower.increase_range(5.0).expect("range grows");
        assert!((tower.range() - 15.0).abs() < f32::EPSILON);
        assert_eq!(tower.range_price(), 11);

        assert!(tower.increase_range(-100.0).is_err());
        assert_eq!(tower.range_price(), 11, "rejected upgrade is free");
        assert_eq!(tower.tower_price(), 50);
    }

    #[test]
    fn saturated_speed_upgrade_is_free() {
        let mut tower = Tower::with_stats(
            TowerId::new(2),
            TowerKind::Electric,
            Footprint::new(Vec2::ZERO, Vec2::splat(2.0)),
            TowerStats::new(10.0, 1.0, f32::MAX).expect("valid stats"),
            UpgradePrices::new(50, 10, 10, 10),
            Recorder::default(),
        );

        assert!(tower.increase_speed().is_err());
        assert_eq!(tower.speed(), f32::MAX);
        assert_eq!(tower.speed_price(), 10);
    }

    #[test]
    fn selection_exposes_range_ring() {
        let mut tower = tower(10.0, 100);
        assert_eq!(tower.selection_ring(), None);

        tower.set_selected(true);
        assert!(tower.is_selected());
        assert_eq!(
            tower.selection_ring(),
            Some(SelectionRing {
                center: Vec2::ZERO,
                radius: 10.0,
            })
        );
    }

    #[test]
    fn baseline_profile_builds_valid_tower() {
        let tower = Tower::new(
            TowerId::new(3),
            TowerKind::Ice,
            Footprint::new(Vec2::ZERO, Vec2::splat(32.0)),
            Recorder::default(),
        )
        .expect("baseline profile is valid");

        assert_eq!(tower.kind(), TowerKind::Ice);
        assert_eq!(tower.center(), Vec2::splat(16.0));
        assert!((tower.range() - 150.0).abs() < f32::EPSILON);
        assert_eq!(tower.prices(), UpgradePrices::new(50, 10, 10, 10));
    }
}
