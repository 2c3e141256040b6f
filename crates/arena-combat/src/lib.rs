//! # Arena Combat
//!
//! Tactical combat core for the arena.
//!
//! This crate provides the enemy-side simulation:
//! - Enemy categories and stat tables
//! - Enemy actors (life cycle, knockback, standalone AI)
//! - Formation coordination around the player
//! - Telegraphed ranged attacks and projectiles
//! - Encounter tick driver and wave director
//! - Render snapshots and a combat event bus
//!
//! The player, visual effects, and camera live outside this crate and are
//! reached through the traits in [`collab`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod category;
pub mod collab;
pub mod encounter;
pub mod enemy;
pub mod events;
pub mod formation;
pub mod indicator;
pub mod projectile;
pub mod render;
pub mod waves;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::category::*;
    pub use crate::collab::{CombatTarget, EffectError, EffectSink, IdentityViewport, ImpactKind, NoEffects, Viewport};
    pub use crate::encounter::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::formation::*;
    pub use crate::indicator::*;
    pub use crate::projectile::*;
    pub use crate::render::*;
    pub use crate::waves::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::DummyTarget;
    use arena_common::{Vec2, WorldBounds};

    #[test]
    fn test_mixed_encounter_runs_clean() {
        let mut arena = Encounter::with_parts(
            WorldBounds::default(),
            FormationCoordinator::with_seed(FormationConfig::default(), 21),
            EventBus::new(8192),
        );
        let mut player = DummyTarget::at(800.0, 600.0);
        player.health = f32::MAX;
        let mut waves = WaveDirector::with_seed(WaveConfig::default(), 21);
        waves.start_wave(5, &arena);

        for _ in 0..(60 * 60) {
            waves.update(1.0 / 60.0, &mut arena);
            arena.tick(1.0 / 60.0, &mut player, &mut NoEffects);
        }

        assert_eq!(waves.queued(), 0);
        assert!(arena.stats().spawned >= 14);
        assert!(!player.hits.is_empty());
        for enemy in arena.enemies() {
            assert!(enemy.position().is_finite());
            assert!((0.0..=1.0).contains(&enemy.opacity()));
        }
        assert!(arena.events().pending_count() > 0);
    }

    #[test]
    fn test_enemy_creation() {
        let enemy = Enemy::new(EnemyCategory::Sniper, Vec2::new(10.0, 20.0));
        assert!(enemy.id().is_valid());
        assert_eq!(enemy.category(), EnemyCategory::Sniper);
        assert!(enemy.is_spawning());
    }
}
