//! Encounter: the per-tick driver for one arena fight.
//!
//! This module provides:
//! - The live enemy list and its formation coordinator
//! - The fixed tick order (formations, then enemies, then reaping)
//! - The damage entry point for player attacks
//! - Combat event publishing and running statistics

use arena_common::{heading, EntityId, Vec2, WorldBounds};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collab::{emit_impact_effect, CombatTarget, EffectSink, ImpactKind, Viewport};
use crate::enemy::{Enemy, TickReport};
use crate::events::{CombatEvent, EventBus};
use crate::formation::{FormationConfig, FormationCoordinator, FormationUpdate};
use crate::render::RenderFrame;

/// Knockback speed a reference hit imparts.
pub const STRIKE_KNOCKBACK: f32 = 150.0;

/// Damage at which a strike imparts exactly [`STRIKE_KNOCKBACK`].
pub const STRIKE_REFERENCE_DAMAGE: f32 = 25.0;

/// Distance below which a strike's knockback grows.
pub const STRIKE_REFERENCE_REACH: f32 = 60.0;

/// Running totals for an encounter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterStats {
    /// Ticks simulated
    pub ticks: u64,
    /// Simulated seconds
    pub elapsed: f32,
    /// Enemies added
    pub spawned: u32,
    /// Enemies killed
    pub killed: u32,
    /// Enemies removed after fading out
    pub removed: u32,
    /// Experience from kills
    pub experience: u32,
    /// Formations created
    pub formations: u32,
    /// Combined enemy report
    pub enemy_totals: TickReport,
}

/// Result of a player area strike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeOutcome {
    /// Enemies damaged
    pub hits: u32,
    /// Enemies killed
    pub kills: u32,
    /// Experience from kills
    pub experience: u32,
}

/// One arena fight.
#[derive(Debug)]
pub struct Encounter {
    bounds: WorldBounds,
    enemies: Vec<Enemy>,
    formations: FormationCoordinator,
    events: EventBus,
    stats: EncounterStats,
}

impl Encounter {
    /// Creates an empty encounter.
    #[must_use]
    pub fn new(bounds: WorldBounds, formation: FormationConfig) -> Self {
        Self::with_parts(bounds, FormationCoordinator::new(formation), EventBus::default())
    }

    /// Creates an encounter from pre-built parts (seeded coordinator, sized bus).
    #[must_use]
    pub fn with_parts(bounds: WorldBounds, formations: FormationCoordinator, events: EventBus) -> Self {
        Self {
            bounds,
            enemies: Vec::new(),
            formations,
            events,
            stats: EncounterStats::default(),
        }
    }

    /// Playfield.
    #[must_use]
    pub const fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    /// All enemies, including dying ones.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Looks up an enemy.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id() == id)
    }

    /// Enemies that are not fading out.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Formation coordinator.
    #[must_use]
    pub const fn formations(&self) -> &FormationCoordinator {
        &self.formations
    }

    /// Event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Running statistics.
    #[must_use]
    pub const fn stats(&self) -> &EncounterStats {
        &self.stats
    }

    /// Adds an enemy.
    pub fn spawn(&mut self, enemy: Enemy) -> EntityId {
        let id = enemy.id();
        self.events.publish(CombatEvent::EnemySpawned {
            enemy: id,
            category: enemy.category(),
            position: enemy.position(),
        });
        trace!("Spawned {} {} at {:?}", enemy.category(), id, enemy.position());
        self.enemies.push(enemy);
        self.stats.spawned += 1;
        id
    }

    /// Runs one simulation tick.
    ///
    /// The coordinator updates first so any slot it assigns is seen by every
    /// enemy this tick. Enemies whose death fade completed are removed last.
    pub fn tick(&mut self, dt: f32, player: &mut dyn CombatTarget, effects: &mut dyn EffectSink) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let formation = self.formations.update(dt, &mut self.enemies, player.position());
        self.publish_formation(&formation);

        let mut total = TickReport::default();
        for enemy in &mut self.enemies {
            let report = enemy.update(dt, player, &self.bounds, effects);
            publish_report(&self.events, enemy.id(), &report);
            total.merge(&report);
        }

        let events = &self.events;
        let mut removed = 0;
        self.enemies.retain(|enemy| {
            if enemy.should_be_removed() {
                events.publish(CombatEvent::EnemyRemoved { enemy: enemy.id() });
                removed += 1;
                false
            } else {
                true
            }
        });

        self.stats.ticks += 1;
        self.stats.elapsed += dt;
        self.stats.removed += removed;
        self.stats.enemy_totals.merge(&total);
        total
    }

    fn publish_formation(&mut self, update: &FormationUpdate) {
        if let Some(formed) = update.formed {
            self.stats.formations += 1;
            self.events.publish(CombatEvent::FormationFormed {
                group: formed.id,
                pattern: formed.pattern,
                members: formed.members,
            });
        }
        for group in &update.disbanded {
            self.events.publish(CombatEvent::FormationDisbanded { group: *group });
        }
    }

    /// Applies player damage to one enemy, with optional knockback.
    ///
    /// Returns `Some(true)` if the hit killed it, `Some(false)` if it survived,
    /// and `None` if no live enemy has that ID.
    pub fn damage_enemy(
        &mut self,
        id: EntityId,
        amount: f32,
        knockback: Option<Vec2>,
        effects: &mut dyn EffectSink,
    ) -> Option<bool> {
        let enemy = self.enemies.iter_mut().find(|e| e.id() == id && !e.is_dying())?;

        let killed = enemy.take_damage(amount, effects);
        self.events.publish(CombatEvent::EnemyDamaged {
            enemy: id,
            amount,
            remaining: enemy.health(),
        });

        if killed {
            let experience = enemy.stats().experience;
            self.stats.killed += 1;
            self.stats.experience += experience;
            self.events.publish(CombatEvent::EnemyDied {
                enemy: id,
                category: enemy.category(),
                experience,
            });
            debug!("{} {} killed (+{} xp)", enemy.category(), id, experience);
        } else if let Some(impulse) = knockback {
            enemy.apply_knockback(impulse);
        }
        Some(killed)
    }

    /// Hits every live enemy within `reach` of `origin` for `damage`.
    ///
    /// Survivors are knocked away from `origin`; closer enemies fly farther.
    pub fn strike_area(
        &mut self,
        origin: Vec2,
        reach: f32,
        damage: f32,
        effects: &mut dyn EffectSink,
    ) -> StrikeOutcome {
        let targets: Vec<(EntityId, Vec2)> = self
            .enemies
            .iter()
            .filter(|e| !e.is_dying() && e.position().distance(origin) <= reach)
            .map(|e| (e.id(), e.position()))
            .collect();

        let mut outcome = StrikeOutcome::default();
        for (id, position) in targets {
            emit_impact_effect(effects, position, ImpactKind::Melee);
            let knockback = strike_knockback(origin, position, damage);
            let experience = self.enemy(id).map_or(0, |e| e.stats().experience);
            match self.damage_enemy(id, damage, knockback, effects) {
                Some(true) => {
                    outcome.hits += 1;
                    outcome.kills += 1;
                    outcome.experience += experience;
                },
                Some(false) => outcome.hits += 1,
                None => {},
            }
        }
        outcome
    }

    /// Render snapshot of every enemy and its attacks.
    #[must_use]
    pub fn render(&self, viewport: &dyn Viewport) -> RenderFrame {
        RenderFrame::capture(&self.enemies, viewport)
    }
}

/// Knockback impulse for a strike from `origin` landing at `target`.
#[must_use]
pub fn strike_knockback(origin: Vec2, target: Vec2, damage: f32) -> Option<Vec2> {
    let dir = heading(origin, target)?;
    let distance = origin.distance(target);
    let proximity = (STRIKE_REFERENCE_REACH / distance).max(0.5);
    Some(dir * STRIKE_KNOCKBACK * (damage / STRIKE_REFERENCE_DAMAGE) * proximity)
}

fn publish_report(events: &EventBus, enemy: EntityId, report: &TickReport) {
    if report.telegraphs > 0 {
        events.publish(CombatEvent::TelegraphStarted {
            enemy,
            shots: report.telegraphs,
        });
    }
    if report.shots_fired > 0 {
        events.publish(CombatEvent::ProjectileFired {
            enemy,
            count: report.shots_fired,
        });
    }
    if report.damage_dealt > 0.0 {
        events.publish(CombatEvent::PlayerHit {
            enemy,
            damage: report.damage_dealt,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::EnemyCategory;
    use crate::collab::testing::DummyTarget;
    use crate::collab::NoEffects;
    use crate::enemy::DEATH_FADE_SECONDS;

    const DT: f32 = 1.0 / 60.0;

    fn encounter() -> Encounter {
        Encounter::with_parts(
            WorldBounds::default(),
            FormationCoordinator::with_seed(FormationConfig::default(), 11),
            EventBus::new(4096),
        )
    }

    fn active(category: EnemyCategory, x: f32, y: f32) -> Enemy {
        Enemy::new(category, Vec2::new(x, y)).with_spawn_complete()
    }

    #[test]
    fn test_formation_assigned_before_enemies_move() {
        let mut arena = encounter();
        let mut player = DummyTarget::at(800.0, 600.0);
        arena.spawn(active(EnemyCategory::Tank, 500.0, 600.0));
        arena.spawn(active(EnemyCategory::Tank, 520.0, 600.0));

        arena.tick(DT, &mut player, &mut NoEffects);

        // Same tick: slots exist and the enemies already stepped toward them.
        for enemy in arena.enemies() {
            let slot = enemy.formation().expect("in formation");
            assert!(enemy.velocity().dot(slot.target - enemy.position()) > 0.0);
        }
        assert_eq!(arena.stats().formations, 1);
        assert!(arena
            .events()
            .drain()
            .iter()
            .any(|e| matches!(e, CombatEvent::FormationFormed { members: 2, .. })));
    }

    #[test]
    fn test_dead_enemy_removed_only_after_fade() {
        let mut arena = encounter();
        let mut player = DummyTarget::at(800.0, 600.0);
        let id = arena.spawn(active(EnemyCategory::Rusher, 100.0, 100.0).with_max_health(10.0));

        assert_eq!(arena.damage_enemy(id, 15.0, None, &mut NoEffects), Some(true));
        assert_eq!(arena.enemies().len(), 1);
        assert_eq!(arena.living_count(), 0);

        arena.tick(DT, &mut player, &mut NoEffects);
        assert_eq!(arena.enemies().len(), 1);

        let ticks = (DEATH_FADE_SECONDS / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            arena.tick(DT, &mut player, &mut NoEffects);
        }
        assert!(arena.enemies().is_empty());
        assert_eq!(arena.stats().removed, 1);

        let events = arena.events().drain();
        assert!(events.iter().any(|e| matches!(e, CombatEvent::EnemyDied { .. })));
        assert!(events.iter().any(|e| *e == CombatEvent::EnemyRemoved { enemy: id }));
    }

    #[test]
    fn test_dying_enemy_cannot_be_damaged_again() {
        let mut arena = encounter();
        let id = arena.spawn(active(EnemyCategory::Rusher, 100.0, 100.0));
        assert_eq!(arena.damage_enemy(id, 1000.0, None, &mut NoEffects), Some(true));
        assert_eq!(arena.damage_enemy(id, 1000.0, None, &mut NoEffects), None);
        assert_eq!(arena.stats().killed, 1);
        assert_eq!(arena.damage_enemy(EntityId::from_raw(u64::MAX), 1.0, None, &mut NoEffects), None);
    }

    #[test]
    fn test_survivor_takes_knockback() {
        let mut arena = encounter();
        let id = arena.spawn(active(EnemyCategory::Tank, 400.0, 400.0));
        let killed = arena.damage_enemy(id, 5.0, Some(Vec2::new(120.0, 0.0)), &mut NoEffects);
        assert_eq!(killed, Some(false));
        assert_eq!(arena.enemy(id).map(Enemy::knockback), Some(Vec2::new(120.0, 0.0)));
    }

    #[test]
    fn test_strike_area_hits_only_in_reach() {
        let mut arena = encounter();
        let near = arena.spawn(active(EnemyCategory::Tank, 430.0, 400.0));
        let weak = arena.spawn(active(EnemyCategory::Rusher, 370.0, 400.0).with_max_health(5.0));
        let far = arena.spawn(active(EnemyCategory::Tank, 600.0, 400.0));

        let outcome = arena.strike_area(Vec2::new(400.0, 400.0), 60.0, 25.0, &mut NoEffects);
        assert_eq!(outcome.hits, 2);
        assert_eq!(outcome.kills, 1);
        assert_eq!(outcome.experience, EnemyCategory::Rusher.stats().experience);

        let near = arena.enemy(near).expect("near enemy");
        assert!(near.knockback().x > 0.0);
        assert!(arena.enemy(weak).is_some_and(Enemy::is_dying));
        assert_eq!(arena.enemy(far).map(Enemy::health), Some(EnemyCategory::Tank.stats().max_health));
    }

    #[test]
    fn test_strike_knockback_scales() {
        let origin = Vec2::ZERO;
        let close = strike_knockback(origin, Vec2::new(30.0, 0.0), 25.0).expect("direction");
        let far = strike_knockback(origin, Vec2::new(240.0, 0.0), 25.0).expect("direction");
        assert!((close.x - 300.0).abs() < 1e-3);
        assert!((far.x - 75.0).abs() < 1e-3);
        assert!(strike_knockback(origin, origin, 25.0).is_none());
    }

    #[test]
    fn test_player_hits_are_published() {
        let mut arena = encounter();
        let mut player = DummyTarget::at(110.0, 100.0);
        arena.spawn(active(EnemyCategory::Rusher, 100.0, 100.0));

        let report = arena.tick(DT, &mut player, &mut NoEffects);
        assert_eq!(report.melee_hits, 1);
        assert!(arena
            .events()
            .drain()
            .iter()
            .any(|e| matches!(e, CombatEvent::PlayerHit { .. })));
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut arena = encounter();
        let mut player = DummyTarget::at(800.0, 600.0);
        arena.spawn(active(EnemyCategory::Rusher, 100.0, 100.0));
        arena.tick(f32::NAN, &mut player, &mut NoEffects);
        arena.tick(-1.0, &mut player, &mut NoEffects);
        assert_eq!(arena.enemies()[0].position(), Vec2::new(100.0, 100.0));
        assert_eq!(arena.stats().elapsed, 0.0);
    }
}
