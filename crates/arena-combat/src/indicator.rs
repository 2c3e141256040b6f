//! Telegraphed attack indicators.
//!
//! An indicator is the visible warning shown before a ranged shot. While
//! armed it follows the player every tick, which is what lets the player
//! dodge: the shot goes wherever the marker sits when the delay runs out.
//! After firing the marker freezes and lingers until its total duration.

use arena_common::{EntityId, Vec2, WorldBounds};
use serde::{Deserialize, Serialize};

/// Indicator targets are clamped to the bounds grown by this margin.
pub const TARGET_MARGIN: f32 = 200.0;

/// A pending or spent telegraph owned by one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackIndicator {
    owner: EntityId,
    angle_offset: f32,
    target_offset: f32,
    elapsed: f32,
    fire_delay: f32,
    duration: f32,
    target: Vec2,
    fired: bool,
}

impl AttackIndicator {
    /// Creates an armed indicator.
    ///
    /// `duration` is raised to `fire_delay` if shorter so the indicator always
    /// gets to fire before it expires.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: EntityId,
        origin: Vec2,
        player: Vec2,
        angle_offset: f32,
        target_offset: f32,
        fire_delay: f32,
        duration: f32,
        bounds: &WorldBounds,
    ) -> Self {
        let mut indicator = Self {
            owner,
            angle_offset,
            target_offset,
            elapsed: 0.0,
            fire_delay: fire_delay.max(0.0),
            duration: duration.max(fire_delay).max(0.0),
            target: player,
            fired: false,
        };
        indicator.track(origin, player, bounds);
        indicator
    }

    /// Enemy that owns this indicator.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Angular offset from the aim line (radians).
    #[must_use]
    pub const fn angle_offset(&self) -> f32 {
        self.angle_offset
    }

    /// Current target point (frozen once fired).
    #[must_use]
    pub const fn target(&self) -> Vec2 {
        self.target
    }

    /// Time since the indicator was created.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether the shot has been released.
    #[must_use]
    pub const fn is_fired(&self) -> bool {
        self.fired
    }

    /// Whether the indicator should be discarded.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Telegraph progress toward firing (0.0-1.0).
    #[must_use]
    pub fn charge(&self) -> f32 {
        if self.fire_delay <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.fire_delay).clamp(0.0, 1.0)
        }
    }

    /// Advances the timer.
    ///
    /// Returns the frozen target exactly once, on the tick the fire delay is
    /// crossed. Until then the target re-tracks the player.
    pub fn update(&mut self, dt: f32, origin: Vec2, player: Vec2, bounds: &WorldBounds) -> Option<Vec2> {
        self.elapsed += dt;
        if self.fired {
            return None;
        }
        self.track(origin, player, bounds);
        if self.elapsed >= self.fire_delay {
            self.fired = true;
            return Some(self.target);
        }
        None
    }

    fn track(&mut self, origin: Vec2, player: Vec2, bounds: &WorldBounds) {
        let aim = if self.target_offset == 0.0 {
            player
        } else {
            let to_player = player - origin;
            let base = to_player.y.atan2(to_player.x);
            player + Vec2::from_angle(base + self.angle_offset) * self.target_offset
        };
        self.target = bounds.clamp_inset(aim, -TARGET_MARGIN).point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(delay: f32, duration: f32) -> AttackIndicator {
        AttackIndicator::new(
            EntityId::from_raw(1),
            Vec2::new(100.0, 100.0),
            Vec2::new(300.0, 100.0),
            0.0,
            0.0,
            delay,
            duration,
            &WorldBounds::default(),
        )
    }

    #[test]
    fn test_fires_once_then_expires() {
        let bounds = WorldBounds::default();
        let origin = Vec2::new(100.0, 100.0);
        let player = Vec2::new(300.0, 100.0);
        let mut ind = indicator(0.5, 1.0);

        let mut fired_at = Vec::new();
        let mut expired_at = None;
        for step in 1..=12 {
            if ind.update(0.1, origin, player, &bounds).is_some() {
                fired_at.push(step);
            }
            if expired_at.is_none() && ind.is_expired() {
                expired_at = Some(step);
            }
        }

        assert_eq!(fired_at.len(), 1);
        assert!(ind.elapsed() >= 0.5);
        // 0.1 steps accumulate float error; fire lands on step 5 or 6.
        assert!((5..=6).contains(&fired_at[0]));
        let expired = expired_at.expect("indicator expired");
        assert!(expired >= fired_at[0]);
        assert!((10..=11).contains(&expired));
    }

    #[test]
    fn test_target_tracks_until_fired_then_freezes() {
        let bounds = WorldBounds::default();
        let origin = Vec2::new(100.0, 100.0);
        let mut ind = indicator(0.3, 0.6);

        assert!(ind.update(0.1, origin, Vec2::new(400.0, 100.0), &bounds).is_none());
        assert_eq!(ind.target(), Vec2::new(400.0, 100.0));

        let frozen = ind.update(0.25, origin, Vec2::new(500.0, 150.0), &bounds);
        assert_eq!(frozen, Some(Vec2::new(500.0, 150.0)));

        assert!(ind.update(0.1, origin, Vec2::new(900.0, 900.0), &bounds).is_none());
        assert_eq!(ind.target(), Vec2::new(500.0, 150.0));
        assert!(ind.is_fired());
    }

    #[test]
    fn test_spread_offsets_target_around_player() {
        let bounds = WorldBounds::default();
        let origin = Vec2::new(100.0, 100.0);
        let player = Vec2::new(300.0, 100.0);
        let left = AttackIndicator::new(EntityId::from_raw(1), origin, player, -0.25, 25.0, 0.6, 0.8, &bounds);
        let right = AttackIndicator::new(EntityId::from_raw(1), origin, player, 0.25, 25.0, 0.6, 0.8, &bounds);

        assert!((left.target().distance(player) - 25.0).abs() < 1e-3);
        assert!((right.target().distance(player) - 25.0).abs() < 1e-3);
        assert!(left.target().y < player.y);
        assert!(right.target().y > player.y);
    }

    #[test]
    fn test_target_clamped_near_world() {
        let bounds = WorldBounds::default();
        let ind = AttackIndicator::new(
            EntityId::from_raw(1),
            Vec2::ZERO,
            Vec2::new(-1000.0, 50.0),
            0.0,
            0.0,
            0.5,
            1.0,
            &bounds,
        );
        assert_eq!(ind.target().x, -TARGET_MARGIN);
    }

    #[test]
    fn test_duration_never_shorter_than_delay() {
        let bounds = WorldBounds::default();
        let mut ind = indicator(0.5, 0.2);
        assert!(ind.update(0.3, Vec2::ZERO, Vec2::X, &bounds).is_none());
        assert!(!ind.is_expired());
        assert!(ind.update(0.3, Vec2::ZERO, Vec2::X, &bounds).is_some());
        assert!(ind.is_expired());
    }
}
