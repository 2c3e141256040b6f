//! Scripted player for headless runs.
//!
//! Hunts the nearest living enemy and strikes everything in reach on a
//! cooldown. Stands in for the real player controller, which lives outside
//! the core.

use arena_combat::{CombatTarget, EffectSink, Encounter, Enemy, StrikeOutcome};
use arena_common::{heading, EntityId, Vec2, WorldBounds};
use tracing::{debug, info};

use crate::config::PlayerConfig;

/// Player double driven by a fixed script.
#[derive(Debug)]
pub struct ScriptedPlayer {
    config: PlayerConfig,
    position: Vec2,
    health: f32,
    attack_timer: f32,
    damage_taken: f32,
    hits_taken: u32,
    last_attacker: Option<EntityId>,
    rng: fastrand::Rng,
}

impl ScriptedPlayer {
    /// Creates a player at the arena centre.
    #[must_use]
    pub fn new(config: PlayerConfig, bounds: &WorldBounds, seed: u64) -> Self {
        Self {
            health: config.health,
            position: bounds.center(),
            config,
            attack_timer: 0.0,
            damage_taken: 0.0,
            hits_taken: 0,
            last_attacker: None,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Total damage received.
    #[must_use]
    pub fn damage_taken(&self) -> f32 {
        self.damage_taken
    }

    /// Number of hits received.
    #[must_use]
    pub fn hits_taken(&self) -> u32 {
        self.hits_taken
    }

    /// Enemy that landed the most recent hit.
    #[must_use]
    pub fn last_attacker(&self) -> Option<EntityId> {
        self.last_attacker
    }

    /// Walks toward the nearest living enemy, or back to the centre when
    /// the field is empty. Stops at the configured engage distance.
    pub fn advance(&mut self, dt: f32, bounds: &WorldBounds, enemies: &[Enemy]) {
        if !self.is_alive() {
            return;
        }
        let inset = self.config.radius;
        let goal = enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| bounds.clamp_inset(e.position(), inset).point)
            .min_by(|a, b| self.position.distance_squared(*a).total_cmp(&self.position.distance_squared(*b)))
            .unwrap_or_else(|| bounds.center());

        let gap = self.position.distance(goal) - self.config.engage_distance;
        if gap <= 0.0 {
            return;
        }
        if let Some(dir) = heading(self.position, goal) {
            let step = (self.config.speed * dt).min(gap);
            self.position = bounds.clamp_inset(self.position + dir * step, inset).point;
        }
    }

    /// Strikes every enemy in reach if the cooldown allows.
    pub fn attack(&mut self, dt: f32, encounter: &mut Encounter, effects: &mut dyn EffectSink) -> StrikeOutcome {
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        if self.attack_timer > 0.0 || !self.is_alive() {
            return StrikeOutcome::default();
        }

        let variance = self.config.attack_variance;
        let damage = (self.config.attack_damage + (self.rng.f32() * 2.0 - 1.0) * variance).max(0.0);
        let outcome = encounter.strike_area(self.position, self.config.attack_reach, damage, effects);
        if outcome.hits > 0 {
            self.attack_timer = self.config.attack_cooldown;
            debug!("Player strike hit {} ({} killed)", outcome.hits, outcome.kills);
        }
        outcome
    }
}

impl CombatTarget for ScriptedPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.config.radius
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    fn take_damage(&mut self, amount: f32, source: EntityId) {
        if !self.is_alive() {
            return;
        }
        self.health -= amount;
        self.damage_taken += amount;
        self.hits_taken += 1;
        self.last_attacker = Some(source);
        if !self.is_alive() {
            info!("Player killed by enemy {source}");
        }
    }
}
