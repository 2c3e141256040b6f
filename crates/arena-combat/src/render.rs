//! Read-only render snapshots.
//!
//! Views are computed from simulation state through a [`Viewport`] and never
//! written back. A renderer draws them however it likes.

use arena_common::{EntityId, Vec2};
use serde::{Deserialize, Serialize};

use crate::category::EnemyCategory;
use crate::collab::Viewport;
use crate::enemy::{Enemy, LifePhase};
use crate::indicator::AttackIndicator;
use crate::projectile::Projectile;

/// Screen-space snapshot of one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    /// Enemy ID
    pub id: EntityId,
    /// Category (selects sprite/colour)
    pub category: EnemyCategory,
    /// Centre in screen pixels
    pub position: Vec2,
    /// World velocity, for facing and motion blur
    pub velocity: Vec2,
    /// Radius in screen pixels
    pub radius: f32,
    /// Opacity (0.0-1.0)
    pub opacity: f32,
    /// Health bar fill (0.0-1.0)
    pub health_fraction: f32,
    /// Hit flash active
    pub flashing: bool,
    /// Following a formation slot
    pub in_formation: bool,
    /// Life phase
    pub phase: LifePhase,
}

impl EnemyView {
    /// Captures an enemy.
    #[must_use]
    pub fn capture(enemy: &Enemy, viewport: &dyn Viewport) -> Self {
        Self {
            id: enemy.id(),
            category: enemy.category(),
            position: viewport.world_to_screen(enemy.position()),
            velocity: enemy.velocity(),
            radius: enemy.stats().radius * viewport.zoom(),
            opacity: enemy.opacity(),
            health_fraction: enemy.health_fraction(),
            flashing: enemy.damage_flash() > 0.0,
            in_formation: enemy.is_in_formation(),
            phase: enemy.phase(),
        }
    }
}

/// Screen-space snapshot of a telegraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorView {
    /// Owning enemy
    pub owner: EntityId,
    /// Line start (the owner) in screen pixels
    pub origin: Vec2,
    /// Aim point in screen pixels
    pub target: Vec2,
    /// Charge toward firing (0.0-1.0)
    pub charge: f32,
    /// Shot already released
    pub fired: bool,
}

impl IndicatorView {
    /// Captures an indicator owned by an enemy at `origin`.
    #[must_use]
    pub fn capture(indicator: &AttackIndicator, origin: Vec2, viewport: &dyn Viewport) -> Self {
        Self {
            owner: indicator.owner(),
            origin: viewport.world_to_screen(origin),
            target: viewport.world_to_screen(indicator.target()),
            charge: indicator.charge(),
            fired: indicator.is_fired(),
        }
    }
}

/// Screen-space snapshot of a projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    /// Firing enemy
    pub owner: EntityId,
    /// Centre in screen pixels
    pub position: Vec2,
    /// Radius in screen pixels
    pub radius: f32,
}

impl ProjectileView {
    /// Captures a projectile.
    #[must_use]
    pub fn capture(projectile: &Projectile, viewport: &dyn Viewport) -> Self {
        Self {
            owner: projectile.owner,
            position: viewport.world_to_screen(projectile.position),
            radius: projectile.radius * viewport.zoom(),
        }
    }
}

/// Everything the combat core draws in one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Enemies
    pub enemies: Vec<EnemyView>,
    /// Telegraphs
    pub indicators: Vec<IndicatorView>,
    /// Projectiles
    pub projectiles: Vec<ProjectileView>,
}

impl RenderFrame {
    /// Captures every enemy and the attacks it owns.
    #[must_use]
    pub fn capture(enemies: &[Enemy], viewport: &dyn Viewport) -> Self {
        let mut frame = Self {
            enemies: Vec::with_capacity(enemies.len()),
            ..Self::default()
        };
        for enemy in enemies {
            frame.enemies.push(EnemyView::capture(enemy, viewport));
            frame.indicators.extend(
                enemy
                    .indicators()
                    .iter()
                    .map(|indicator| IndicatorView::capture(indicator, enemy.position(), viewport)),
            );
            frame.projectiles.extend(
                enemy
                    .projectiles()
                    .iter()
                    .map(|projectile| ProjectileView::capture(projectile, viewport)),
            );
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::DummyTarget;
    use crate::collab::{IdentityViewport, NoEffects};
    use arena_common::WorldBounds;

    struct Zoomed;

    impl Viewport for Zoomed {
        fn world_to_screen(&self, world: Vec2) -> Vec2 {
            (world - Vec2::new(100.0, 100.0)) * 2.0
        }

        fn zoom(&self) -> f32 {
            2.0
        }
    }

    #[test]
    fn test_enemy_view_goes_through_viewport() {
        let enemy = Enemy::new(EnemyCategory::Tank, Vec2::new(150.0, 120.0));
        let view = EnemyView::capture(&enemy, &Zoomed);
        assert_eq!(view.position, Vec2::new(100.0, 40.0));
        assert_eq!(view.radius, enemy.stats().radius * 2.0);
        assert_eq!(view.opacity, 0.0);
        assert!(!view.flashing);
    }

    #[test]
    fn test_frame_collects_telegraphs() {
        let bounds = WorldBounds::default();
        let mut player = DummyTarget::at(600.0, 400.0);
        let mut caster = Enemy::new(EnemyCategory::Caster, Vec2::new(400.0, 400.0)).with_spawn_complete();
        caster.update(1.0 / 60.0, &mut player, &bounds, &mut NoEffects);

        let frame = RenderFrame::capture(std::slice::from_ref(&caster), &IdentityViewport);
        assert_eq!(frame.enemies.len(), 1);
        assert_eq!(frame.indicators.len(), 3);
        assert!(frame.indicators.iter().all(|i| !i.fired && i.charge < 1.0));
        assert!(frame.projectiles.is_empty());
    }
}
