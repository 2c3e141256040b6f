//! Effect sink for headless runs.
//!
//! Counts effect requests instead of drawing them. A per-tick budget mimics a
//! fixed-size particle pool so the simulation sees real pool exhaustion.

use arena_combat::{EffectError, EffectSink, EnemyCategory, ImpactKind};
use arena_common::Vec2;
use serde::Serialize;
use tracing::trace;

/// Effect request totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EffectCounts {
    /// Damage numbers/bursts shown
    pub damage: u32,
    /// Melee impacts shown
    pub melee_impacts: u32,
    /// Projectile impacts shown
    pub projectile_impacts: u32,
    /// Requests refused because the pool was full
    pub dropped: u32,
}

/// Counting effect sink with a per-tick budget.
#[derive(Debug)]
pub struct CountingEffects {
    budget: u32,
    used: u32,
    counts: EffectCounts,
}

impl CountingEffects {
    /// Creates a sink accepting `budget` requests per tick.
    #[must_use]
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            used: 0,
            counts: EffectCounts::default(),
        }
    }

    /// Frees the pool for a new tick.
    pub fn begin_tick(&mut self) {
        self.used = 0;
    }

    /// Totals so far.
    #[must_use]
    pub fn counts(&self) -> EffectCounts {
        self.counts
    }

    fn reserve(&mut self) -> Result<(), EffectError> {
        if self.used >= self.budget {
            self.counts.dropped += 1;
            return Err(EffectError::PoolExhausted);
        }
        self.used += 1;
        Ok(())
    }
}

impl EffectSink for CountingEffects {
    fn spawn_damage_effect(&mut self, position: Vec2, category: EnemyCategory, amount: f32) -> Result<(), EffectError> {
        self.reserve()?;
        self.counts.damage += 1;
        trace!("Damage effect: {category} took {amount:.1} at {position}");
        Ok(())
    }

    fn spawn_attack_impact(&mut self, position: Vec2, kind: ImpactKind) -> Result<(), EffectError> {
        self.reserve()?;
        match kind {
            ImpactKind::Melee => self.counts.melee_impacts += 1,
            ImpactKind::Projectile => self.counts.projectile_impacts += 1,
        }
        trace!("Impact effect: {kind:?} at {position}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_resets_each_tick() {
        let mut effects = CountingEffects::new(2);
        assert!(effects.spawn_damage_effect(Vec2::ZERO, EnemyCategory::Tank, 5.0).is_ok());
        assert!(effects.spawn_attack_impact(Vec2::ZERO, ImpactKind::Melee).is_ok());
        assert!(matches!(
            effects.spawn_attack_impact(Vec2::ZERO, ImpactKind::Projectile),
            Err(EffectError::PoolExhausted)
        ));

        effects.begin_tick();
        assert!(effects.spawn_attack_impact(Vec2::ZERO, ImpactKind::Projectile).is_ok());

        let counts = effects.counts();
        assert_eq!(counts.damage, 1);
        assert_eq!(counts.melee_impacts, 1);
        assert_eq!(counts.projectile_impacts, 1);
        assert_eq!(counts.dropped, 1);
    }
}
