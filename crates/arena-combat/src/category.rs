//! Enemy categories and their fixed stat tables.
//!
//! This module provides:
//! - The closed set of enemy categories
//! - Per-category base stats, resolved once when an enemy is built
//! - Ranged attack profiles for categories that shoot

use std::fmt;
use std::str::FromStr;

use arena_common::ArenaError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Categories
// ============================================================================

/// Kind of hostile actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyCategory {
    /// Fast, fragile melee attacker that rushes the player.
    Rusher,
    /// Slow, heavily armoured melee attacker.
    Tank,
    /// Long-range single-shot attacker.
    Sniper,
    /// Mid-range caster firing spread volleys.
    Caster,
}

impl EnemyCategory {
    /// Get all categories.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Rusher, Self::Tank, Self::Sniper, Self::Caster]
    }

    /// Stable name used in configuration and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rusher => "rusher",
            Self::Tank => "tank",
            Self::Sniper => "sniper",
            Self::Caster => "caster",
        }
    }

    /// Check if this category attacks with projectiles.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Sniper | Self::Caster)
    }

    /// Base stats for this category.
    #[must_use]
    pub const fn stats(self) -> CategoryStats {
        match self {
            Self::Rusher => CategoryStats {
                max_health: 30.0,
                damage: 8.0,
                speed: 110.0,
                radius: 10.0,
                attack_range: 28.0,
                preferred_distance: 0.0,
                melee_cooldown: 1.0,
                experience: 10,
                ranged: None,
            },
            Self::Tank => CategoryStats {
                max_health: 90.0,
                damage: 18.0,
                speed: 55.0,
                radius: 16.0,
                attack_range: 34.0,
                preferred_distance: 0.0,
                melee_cooldown: 1.0,
                experience: 25,
                ranged: None,
            },
            Self::Sniper => CategoryStats {
                max_health: 25.0,
                damage: 20.0,
                speed: 70.0,
                radius: 10.0,
                attack_range: 320.0,
                preferred_distance: 250.0,
                melee_cooldown: 1.0,
                experience: 30,
                ranged: Some(RangedProfile::SNIPER),
            },
            Self::Caster => CategoryStats {
                max_health: 40.0,
                damage: 10.0,
                speed: 60.0,
                radius: 12.0,
                attack_range: 200.0,
                preferred_distance: 120.0,
                melee_cooldown: 1.0,
                experience: 20,
                ranged: Some(RangedProfile::CASTER),
            },
        }
    }
}

impl fmt::Display for EnemyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnemyCategory {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ArenaError::UnknownCategory(s.to_owned()))
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Constant stat block for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Health at spawn.
    pub max_health: f32,
    /// Damage per melee hit or per projectile.
    pub damage: f32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Distance at which attacks are allowed.
    pub attack_range: f32,
    /// Standoff distance ranged enemies try to keep (0 for melee).
    pub preferred_distance: f32,
    /// Seconds between melee strikes.
    pub melee_cooldown: f32,
    /// Experience awarded on kill.
    pub experience: u32,
    /// Ranged attack parameters, if the category shoots.
    pub ranged: Option<RangedProfile>,
}

/// Parameters of a telegraphed ranged attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedProfile {
    /// Projectiles per volley.
    pub shot_count: u32,
    /// Telegraph time before the first shot fires.
    pub telegraph: f32,
    /// Extra delay added per shot index.
    pub stagger: f32,
    /// Time an indicator stays visible after firing.
    pub linger: f32,
    /// Seconds between volleys.
    pub cooldown: f32,
    /// Angle between neighbouring shots (radians).
    pub spread: f32,
    /// Radius around the player the spread is projected onto.
    pub target_offset: f32,
    /// Projectile speed in pixels per second.
    pub projectile_speed: f32,
    /// Projectile collision radius.
    pub projectile_radius: f32,
}

impl RangedProfile {
    /// Single precise shot aimed straight at the player.
    pub const SNIPER: Self = Self {
        shot_count: 1,
        telegraph: 1.2,
        stagger: 0.0,
        linger: 0.2,
        cooldown: 2.5,
        spread: 0.0,
        target_offset: 0.0,
        projectile_speed: 400.0,
        projectile_radius: 3.0,
    };

    /// Three-shot fan landing around the player.
    pub const CASTER: Self = Self {
        shot_count: 3,
        telegraph: 0.6,
        stagger: 0.1,
        linger: 0.2,
        cooldown: 2.0,
        spread: 0.25,
        target_offset: 25.0,
        projectile_speed: 250.0,
        projectile_radius: 5.0,
    };

    /// Angular offset of shot `index` so the volley is centred on the aim line.
    #[must_use]
    pub fn angle_offset(&self, index: u32) -> f32 {
        if self.shot_count <= 1 {
            return 0.0;
        }
        let centre = (self.shot_count - 1) as f32 / 2.0;
        (index as f32 - centre) * self.spread
    }

    /// Time after the volley starts at which shot `index` fires.
    #[must_use]
    pub fn fire_delay(&self, index: u32) -> f32 {
        self.telegraph + self.stagger * index as f32
    }
}
