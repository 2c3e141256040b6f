//! Interfaces the combat core consumes from the rest of the game.
//!
//! The core never owns the player, the particle system, or the camera. It talks
//! to them through these traits so a headless harness or a test can stand in.

use arena_common::{EntityId, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::category::EnemyCategory;

/// The entity enemies fight against.
///
/// Read by every enemy and projectile each tick; written only through
/// [`CombatTarget::take_damage`].
pub trait CombatTarget {
    /// Current world position.
    fn position(&self) -> Vec2;

    /// Collision radius.
    fn radius(&self) -> f32;

    /// Whether the target can still be hurt.
    fn is_alive(&self) -> bool;

    /// Whether a melee strike from `from` with the given reach connects.
    fn is_within_reach(&self, from: Vec2, reach: f32) -> bool {
        from.distance(self.position()) <= reach
    }

    /// Applies damage dealt by `source`.
    fn take_damage(&mut self, amount: f32, source: EntityId);
}

/// Kind of impact effect requested when an attack lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactKind {
    /// A melee strike connected.
    Melee,
    /// A projectile connected.
    Projectile,
}

/// Failure reported by a visual-effect hook.
#[derive(Debug, Clone, Error)]
pub enum EffectError {
    /// The effect pool has no free slots.
    #[error("effect pool exhausted")]
    PoolExhausted,
    /// The effect backend is not available.
    #[error("effect backend unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget visual hooks.
///
/// Failures are cosmetic: the core logs and drops them, they never block
/// damage application or entity removal.
pub trait EffectSink {
    /// An enemy of `category` took `amount` damage at `position`.
    fn spawn_damage_effect(
        &mut self,
        position: Vec2,
        category: EnemyCategory,
        amount: f32,
    ) -> Result<(), EffectError>;

    /// An attack of `kind` landed at `position`.
    fn spawn_attack_impact(&mut self, position: Vec2, kind: ImpactKind) -> Result<(), EffectError>;
}

/// Effect sink that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl EffectSink for NoEffects {
    fn spawn_damage_effect(&mut self, _: Vec2, _: EnemyCategory, _: f32) -> Result<(), EffectError> {
        Ok(())
    }

    fn spawn_attack_impact(&mut self, _: Vec2, _: ImpactKind) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Camera transform used by the render views.
pub trait Viewport {
    /// Maps a world point to screen pixels.
    fn world_to_screen(&self, world: Vec2) -> Vec2;

    /// Current zoom factor (1.0 = one world pixel per screen pixel).
    fn zoom(&self) -> f32;
}

/// Viewport that maps world space to screen space unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityViewport;

impl Viewport for IdentityViewport {
    fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world
    }

    fn zoom(&self) -> f32 {
        1.0
    }
}

/// Requests a damage effect, swallowing failures.
pub(crate) fn emit_damage_effect(
    effects: &mut dyn EffectSink,
    position: Vec2,
    category: EnemyCategory,
    amount: f32,
) {
    if let Err(e) = effects.spawn_damage_effect(position, category, amount) {
        debug!("Damage effect dropped: {e}");
    }
}

/// Requests an impact effect, swallowing failures.
pub(crate) fn emit_impact_effect(effects: &mut dyn EffectSink, position: Vec2, kind: ImpactKind) {
    if let Err(e) = effects.spawn_attack_impact(position, kind) {
        debug!("Impact effect dropped: {e}");
    }
}
