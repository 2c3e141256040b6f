//! Wave director.
//!
//! This module provides:
//! - Per-wave enemy composition
//! - Adaptive spawn pacing (slower while many enemies are alive)
//! - Health and damage scaling by wave number
//! - Spawn points off the playfield edge, by category
//! - Wave completion detection

use arena_common::{EntityId, Vec2, WorldBounds};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::category::EnemyCategory;
use crate::encounter::Encounter;
use crate::enemy::Enemy;
use crate::events::CombatEvent;

/// Wave pacing and scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Seconds between spawns with no pressure.
    pub base_spawn_delay: f32,
    /// How strongly live enemies stretch the spawn delay.
    pub pressure_weight: f32,
    /// Random spread applied to each delay (0.2 = +/-20%).
    pub delay_jitter: f32,
    /// Health gained per wave after the first (0.15 = +15%).
    pub health_per_wave: f32,
    /// Damage gained per wave after the first.
    pub damage_per_wave: f32,
    /// Distance outside the edge melee enemies appear at.
    pub edge_offset: f32,
    /// Distance outside the corners ranged enemies appear at.
    pub corner_offset: f32,
    /// Distance outside the edge midpoints ranged enemies appear at.
    pub far_edge_offset: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_spawn_delay: 1.2,
            pressure_weight: 0.5,
            delay_jitter: 0.2,
            health_per_wave: 0.15,
            damage_per_wave: 0.1,
            edge_offset: 20.0,
            corner_offset: 30.0,
            far_edge_offset: 40.0,
        }
    }
}

impl WaveConfig {
    /// Clamps values into usable ranges.
    pub fn validate(&mut self) {
        self.base_spawn_delay = self.base_spawn_delay.clamp(0.05, 30.0);
        self.pressure_weight = self.pressure_weight.clamp(0.0, 10.0);
        self.delay_jitter = self.delay_jitter.clamp(0.0, 0.9);
        self.health_per_wave = self.health_per_wave.clamp(0.0, 5.0);
        self.damage_per_wave = self.damage_per_wave.clamp(0.0, 5.0);
        self.edge_offset = self.edge_offset.clamp(0.0, 500.0);
        self.corner_offset = self.corner_offset.clamp(0.0, 500.0);
        self.far_edge_offset = self.far_edge_offset.clamp(0.0, 500.0);
    }

    /// Health and damage multipliers for `wave` (1-based).
    #[must_use]
    pub fn scaling(&self, wave: u32) -> (f32, f32) {
        let steps = wave.saturating_sub(1) as f32;
        (1.0 + steps * self.health_per_wave, 1.0 + steps * self.damage_per_wave)
    }
}

/// Unshuffled enemy list for `wave` (1-based).
///
/// Rushers every wave, tanks from wave 2, snipers from wave 3, casters from
/// wave 4. Every fifth wave adds two extra snipers and two extra tanks.
#[must_use]
pub fn wave_composition(wave: u32) -> Vec<EnemyCategory> {
    let mut roster = Vec::new();
    let mut add = |category: EnemyCategory, count: u32| {
        roster.extend(std::iter::repeat(category).take(count as usize));
    };

    add(EnemyCategory::Rusher, wave.saturating_add(2));
    if wave >= 2 {
        add(EnemyCategory::Tank, (wave / 3).max(1));
    }
    if wave >= 3 {
        add(EnemyCategory::Sniper, (wave / 4).max(1));
    }
    if wave >= 4 {
        add(EnemyCategory::Caster, (wave / 3).max(1));
    }
    if wave > 0 && wave % 5 == 0 {
        add(EnemyCategory::Sniper, 2);
        add(EnemyCategory::Tank, 2);
    }
    roster
}

/// Highest wave number the director will queue.
pub const MAX_WAVE: u32 = 10_000;

/// What one director update did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaveProgress {
    /// Enemy spawned this update, if any.
    pub spawned: Option<EntityId>,
    /// True on the single update where the wave was cleared.
    pub completed: bool,
}

/// Feeds waves of enemies into an encounter.
#[derive(Debug)]
pub struct WaveDirector {
    config: WaveConfig,
    wave: u32,
    queue: Vec<EnemyCategory>,
    spawn_timer: f32,
    complete: bool,
    rng: fastrand::Rng,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl WaveDirector {
    /// Creates a director with an entropy-seeded RNG.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self::with_seed(config, fastrand::u64(..))
    }

    /// Creates a director with a fixed RNG seed.
    #[must_use]
    pub fn with_seed(config: WaveConfig, seed: u64) -> Self {
        Self {
            config,
            wave: 0,
            queue: Vec::new(),
            spawn_timer: 0.0,
            complete: true,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Current wave number (0 before the first wave).
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Enemies still waiting to spawn.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether the current wave has been cleared.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Queues wave `wave` (1-based, capped at [`MAX_WAVE`]) in shuffled order.
    /// Returns its size.
    pub fn start_wave(&mut self, wave: u32, encounter: &Encounter) -> usize {
        self.wave = wave.clamp(1, MAX_WAVE);
        self.queue = wave_composition(self.wave);
        self.rng.shuffle(&mut self.queue);
        self.spawn_timer = 0.0;
        self.complete = false;

        info!("Wave {} started with {} enemies", self.wave, self.queue.len());
        encounter.events().publish(CombatEvent::WaveStarted {
            wave: self.wave,
            enemies: self.queue.len(),
        });
        self.queue.len()
    }

    /// Queues the wave after the current one.
    pub fn start_next_wave(&mut self, encounter: &Encounter) -> usize {
        self.start_wave(self.wave.saturating_add(1), encounter)
    }

    /// Seconds to wait between spawns with `active` enemies on the field.
    #[must_use]
    pub fn spawn_delay(&self, active: usize) -> f32 {
        let capacity = self.wave.saturating_mul(2).max(1) as f32;
        let pressure = active as f32 / capacity;
        self.config.base_spawn_delay * (1.0 + pressure * self.config.pressure_weight)
    }

    /// Spawns queued enemies on schedule and checks for completion.
    pub fn update(&mut self, dt: f32, encounter: &mut Encounter) -> WaveProgress {
        let mut progress = WaveProgress::default();

        if !self.queue.is_empty() {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 {
                let delay = self.spawn_delay(encounter.enemies().len());
                if let Some(category) = self.queue.pop() {
                    progress.spawned = Some(self.spawn(category, encounter));
                }
                let jitter = self.config.delay_jitter;
                self.spawn_timer = delay * (1.0 - jitter + self.rng.f32() * 2.0 * jitter);
            }
        }

        if !self.complete && self.queue.is_empty() && encounter.living_count() == 0 {
            self.complete = true;
            progress.completed = true;
            info!("Wave {} complete", self.wave);
            encounter
                .events()
                .publish(CombatEvent::WaveCompleted { wave: self.wave });
        }

        progress
    }

    fn spawn(&mut self, category: EnemyCategory, encounter: &mut Encounter) -> EntityId {
        let position = self.spawn_point(category, encounter.bounds());
        let (health, damage) = self.config.scaling(self.wave);
        let stats = category.stats();
        let enemy = Enemy::new(category, position)
            .with_max_health(stats.max_health * health)
            .with_damage(stats.damage * damage);
        debug!(
            "Wave {} spawning {} at ({:.0}, {:.0})",
            self.wave, category, position.x, position.y
        );
        encounter.spawn(enemy)
    }

    /// Off-screen spawn point: a random edge for melee, a corner or edge
    /// midpoint for ranged.
    pub fn spawn_point(&mut self, category: EnemyCategory, bounds: &WorldBounds) -> Vec2 {
        let (w, h) = (bounds.width, bounds.height);

        if category.is_ranged() {
            let c = self.config.corner_offset;
            let f = self.config.far_edge_offset;
            let options = [
                Vec2::new(-c, -c),
                Vec2::new(w + c, -c),
                Vec2::new(-c, h + c),
                Vec2::new(w + c, h + c),
                Vec2::new(w / 2.0, -f),
                Vec2::new(-f, h / 2.0),
                Vec2::new(w + f, h / 2.0),
                Vec2::new(w / 2.0, h + f),
            ];
            return options[self.rng.usize(..options.len())];
        }

        let e = self.config.edge_offset;
        match self.rng.u8(..4) {
            0 => Vec2::new(self.rng.f32() * w, -e),
            1 => Vec2::new(w + e, self.rng.f32() * h),
            2 => Vec2::new(self.rng.f32() * w, h + e),
            _ => Vec2::new(-e, self.rng.f32() * h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::DummyTarget;
    use crate::collab::NoEffects;
    use crate::events::EventBus;
    use crate::formation::{FormationConfig, FormationCoordinator};

    fn count(roster: &[EnemyCategory], category: EnemyCategory) -> usize {
        roster.iter().filter(|c| **c == category).count()
    }

    fn encounter() -> Encounter {
        Encounter::with_parts(
            WorldBounds::default(),
            FormationCoordinator::with_seed(FormationConfig::default(), 3),
            EventBus::new(4096),
        )
    }

    #[test]
    fn test_early_waves_are_rushers_only() {
        let roster = wave_composition(1);
        assert_eq!(roster.len(), 3);
        assert_eq!(count(&roster, EnemyCategory::Rusher), 3);
    }

    #[test]
    fn test_categories_unlock_by_wave() {
        let w2 = wave_composition(2);
        assert_eq!(count(&w2, EnemyCategory::Tank), 1);
        assert_eq!(count(&w2, EnemyCategory::Sniper), 0);

        let w3 = wave_composition(3);
        assert_eq!(count(&w3, EnemyCategory::Sniper), 1);
        assert_eq!(count(&w3, EnemyCategory::Caster), 0);

        let w4 = wave_composition(4);
        assert_eq!(count(&w4, EnemyCategory::Rusher), 6);
        assert_eq!(count(&w4, EnemyCategory::Caster), 1);
    }

    #[test]
    fn test_fifth_wave_adds_reinforcements() {
        let roster = wave_composition(5);
        assert_eq!(count(&roster, EnemyCategory::Rusher), 7);
        assert_eq!(count(&roster, EnemyCategory::Tank), 3);
        assert_eq!(count(&roster, EnemyCategory::Sniper), 3);
        assert_eq!(count(&roster, EnemyCategory::Caster), 1);
        assert_eq!(roster.len(), 14);
    }

    #[test]
    fn test_scaling_grows_with_wave() {
        let config = WaveConfig::default();
        assert_eq!(config.scaling(1), (1.0, 1.0));
        let (health, damage) = config.scaling(3);
        assert!((health - 1.3).abs() < 1e-6);
        assert!((damage - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_delay_stretches_under_pressure() {
        let arena = encounter();
        let mut director = WaveDirector::with_seed(WaveConfig::default(), 1);
        director.start_wave(2, &arena);
        assert!((director.spawn_delay(0) - 1.2).abs() < 1e-6);
        assert!((director.spawn_delay(4) - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_wave_number_is_capped() {
        let arena = encounter();
        let mut director = WaveDirector::with_seed(WaveConfig::default(), 1);
        director.start_wave(u32::MAX, &arena);
        assert_eq!(director.wave(), MAX_WAVE);

        director.start_next_wave(&arena);
        assert_eq!(director.wave(), MAX_WAVE);
        assert!(director.queued() > 0);
        assert!(director.spawn_delay(usize::MAX).is_finite());
    }

    #[test]
    fn test_spawn_points_are_off_screen() {
        let bounds = WorldBounds::default();
        let mut director = WaveDirector::with_seed(WaveConfig::default(), 99);
        for category in EnemyCategory::all() {
            for _ in 0..50 {
                let p = director.spawn_point(category, &bounds);
                let inside = p.x > 0.0 && p.x < bounds.width && p.y > 0.0 && p.y < bounds.height;
                assert!(!inside, "{category} spawned on screen at {p:?}");
                assert!(bounds.contains_with_margin(p, 40.0));
            }
        }
    }

    #[test]
    fn test_wave_spawns_scaled_enemies_then_completes() {
        let mut arena = encounter();
        let mut player = DummyTarget::at(800.0, 600.0);
        let mut director = WaveDirector::with_seed(WaveConfig::default(), 5);
        let size = director.start_wave(3, &arena);

        let mut spawned = Vec::new();
        for _ in 0..2000 {
            if let Some(id) = director.update(0.05, &mut arena).spawned {
                spawned.push(id);
            }
            if director.queued() == 0 {
                break;
            }
        }
        assert_eq!(spawned.len(), size);
        assert!(!director.is_complete());

        let (health, _) = director.config().scaling(3);
        for enemy in arena.enemies() {
            let expected = enemy.category().stats().max_health * health;
            assert!((enemy.max_health() - expected).abs() < 1e-3);
        }

        let ids: Vec<_> = arena.enemies().iter().map(Enemy::id).collect();
        for id in ids {
            arena.damage_enemy(id, 10_000.0, None, &mut NoEffects);
        }
        // Dying enemies do not hold the wave open.
        let progress = director.update(0.05, &mut arena);
        assert!(progress.completed);
        assert!(director.is_complete());
        assert!(!director.update(0.05, &mut arena).completed);

        arena.tick(0.05, &mut player, &mut NoEffects);
        let events = arena.events().drain();
        assert!(events.iter().any(|e| *e == CombatEvent::WaveStarted { wave: 3, enemies: size }));
        assert!(events.iter().any(|e| *e == CombatEvent::WaveCompleted { wave: 3 }));
    }
}
