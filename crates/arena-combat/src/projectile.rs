//! Enemy projectiles in flight.
//!
//! A projectile is spawned once an attack indicator fires. Its velocity is
//! fixed at spawn; it either hits the player or drifts out of the world.

use arena_common::{heading, EntityId, Vec2, WorldBounds};
use serde::{Deserialize, Serialize};

use crate::collab::CombatTarget;

/// How far past the playfield edge a projectile may travel before it is dropped.
pub const OFF_WORLD_MARGIN: f32 = 500.0;

/// Targets farther than this from the shooter produce no projectile.
pub const MAX_TARGET_DISTANCE: f32 = 2000.0;

/// Result of advancing a projectile by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileStep {
    /// Still travelling.
    Flying,
    /// Touched the target this tick.
    Hit,
    /// Left the world (or became non-finite) and should be discarded.
    OffWorld,
}

/// A moving damage payload fired by an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Enemy that fired it
    pub owner: EntityId,
    /// Current position
    pub position: Vec2,
    /// Velocity in pixels per second
    pub velocity: Vec2,
    /// Damage dealt on hit
    pub damage: f32,
    /// Collision radius
    pub radius: f32,
}

impl Projectile {
    /// Creates a projectile with an explicit velocity.
    #[must_use]
    pub fn new(owner: EntityId, position: Vec2, velocity: Vec2, damage: f32, radius: f32) -> Self {
        Self {
            owner,
            position,
            velocity,
            damage,
            radius,
        }
    }

    /// Creates a projectile flying from `origin` toward `target` at `speed`.
    ///
    /// Returns `None` when the target coincides with the origin, lies beyond
    /// [`MAX_TARGET_DISTANCE`], or any input is not finite.
    #[must_use]
    pub fn aimed(
        owner: EntityId,
        origin: Vec2,
        target: Vec2,
        speed: f32,
        damage: f32,
        radius: f32,
    ) -> Option<Self> {
        if !origin.is_finite() || !target.is_finite() || !speed.is_finite() {
            return None;
        }
        if origin.distance(target) >= MAX_TARGET_DISTANCE {
            return None;
        }
        let direction = heading(origin, target)?;
        Some(Self::new(owner, origin, direction * speed, damage, radius))
    }

    /// Moves the projectile along its velocity.
    pub fn tick(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Checks for overlap with the target's collision circle.
    #[must_use]
    pub fn hits(&self, target: &dyn CombatTarget) -> bool {
        self.position.distance(target.position()) < target.radius() + self.radius
    }

    /// Whether the projectile is outside the bounds plus `margin`.
    #[must_use]
    pub fn is_off_world(&self, bounds: &WorldBounds, margin: f32) -> bool {
        !self.position.is_finite() || !bounds.contains_with_margin(self.position, margin)
    }

    /// Advances one tick and classifies the result.
    ///
    /// A live target takes precedence over the off-world check so a hit on the
    /// very edge still counts.
    pub fn step(&mut self, dt: f32, target: &dyn CombatTarget, bounds: &WorldBounds) -> ProjectileStep {
        self.tick(dt);
        if !self.position.is_finite() {
            return ProjectileStep::OffWorld;
        }
        if target.is_alive() && self.hits(target) {
            ProjectileStep::Hit
        } else if self.is_off_world(bounds, OFF_WORLD_MARGIN) {
            ProjectileStep::OffWorld
        } else {
            ProjectileStep::Flying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::DummyTarget;

    fn owner() -> EntityId {
        EntityId::from_raw(1)
    }

    #[test]
    fn test_aimed_velocity_points_at_target() {
        let p = Projectile::aimed(owner(), Vec2::ZERO, Vec2::new(0.0, 50.0), 200.0, 5.0, 3.0)
            .expect("valid shot");
        assert!((p.velocity - Vec2::new(0.0, 200.0)).length() < 1e-4);
    }

    #[test]
    fn test_aimed_rejects_degenerate_and_far_targets() {
        assert!(Projectile::aimed(owner(), Vec2::ONE, Vec2::ONE, 200.0, 5.0, 3.0).is_none());
        assert!(Projectile::aimed(owner(), Vec2::ZERO, Vec2::new(2500.0, 0.0), 200.0, 5.0, 3.0).is_none());
        assert!(Projectile::aimed(owner(), Vec2::ZERO, Vec2::new(f32::NAN, 0.0), 200.0, 5.0, 3.0).is_none());
    }

    #[test]
    fn test_projectile_leaves_world_past_tolerance() {
        // Width 1500 plus the 500 margin puts the far edge at x = 2000.
        let bounds = WorldBounds::try_new(1500.0, 1000.0).expect("valid bounds");
        let far_away = DummyTarget::at(-5000.0, -5000.0);
        let mut p = Projectile::new(owner(), Vec2::ZERO, Vec2::new(100.0, 0.0), 5.0, 3.0);

        let mut steps = 0;
        while p.step(1.0, &far_away, &bounds) == ProjectileStep::Flying {
            steps += 1;
            assert!(p.position.x <= 2000.0);
        }
        assert_eq!(steps, 20);
        assert!(p.position.x > 2000.0);
        assert!(p.is_off_world(&bounds, OFF_WORLD_MARGIN));
    }

    #[test]
    fn test_projectile_hits_target() {
        let bounds = WorldBounds::default();
        let target = DummyTarget::at(30.0, 0.0);
        let mut p = Projectile::new(owner(), Vec2::ZERO, Vec2::new(100.0, 0.0), 5.0, 3.0);
        assert_eq!(p.step(0.1, &target, &bounds), ProjectileStep::Flying);
        assert_eq!(p.step(0.1, &target, &bounds), ProjectileStep::Hit);
    }

    #[test]
    fn test_dead_target_is_not_hit() {
        let bounds = WorldBounds::default();
        let mut target = DummyTarget::at(10.0, 0.0);
        target.health = 0.0;
        let mut p = Projectile::new(owner(), Vec2::ZERO, Vec2::new(100.0, 0.0), 5.0, 3.0);
        assert_eq!(p.step(0.1, &target, &bounds), ProjectileStep::Flying);
    }
}
