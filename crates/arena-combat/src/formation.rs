//! Formation coordination.
//!
//! This module provides:
//! - Cluster detection among active enemies
//! - Geometric slot layouts around the player (surround, pincer, ambush)
//! - Persistent groups with pruning and a global re-form cooldown
//!
//! The coordinator runs before any enemy in a tick, so slot changes it makes
//! are visible to every enemy in that same tick.

use std::f32::consts::TAU;

use ahash::{AHashMap, AHashSet};
use arena_common::{EntityId, GroupId, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enemy::Enemy;

/// Groups dissolve once they drop below this many members.
pub const MIN_GROUP_SIZE: usize = 2;

/// Formation assignment carried by an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationSlot {
    /// Group the enemy belongs to.
    pub group: GroupId,
    /// Point the enemy steers toward.
    pub target: Vec2,
}

/// Formation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Minimum live candidates before a formation is considered.
    pub min_members: usize,
    /// Two enemies closer than this count as a close pair.
    pub proximity: f32,
    /// Seconds before another formation may start.
    pub cooldown: f32,
    /// Ring radius for the surround pattern.
    pub surround_radius: f32,
    /// Lateral flank offset for the pincer pattern.
    pub pincer_offset: f32,
    /// Vertical spacing inside a pincer flank.
    pub pincer_spacing: f32,
    /// Half-width of the ambush jitter box.
    pub ambush_jitter: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            min_members: 2,
            proximity: 120.0,
            cooldown: 3.0,
            surround_radius: 120.0,
            pincer_offset: 160.0,
            pincer_spacing: 45.0,
            ambush_jitter: 250.0,
        }
    }
}

impl FormationConfig {
    /// Clamps values into usable ranges.
    pub fn validate(&mut self) {
        self.min_members = self.min_members.max(MIN_GROUP_SIZE);
        self.proximity = self.proximity.clamp(1.0, 2000.0);
        self.cooldown = self.cooldown.clamp(0.0, 60.0);
        self.surround_radius = self.surround_radius.clamp(10.0, 1000.0);
        self.pincer_offset = self.pincer_offset.clamp(10.0, 1000.0);
        self.pincer_spacing = self.pincer_spacing.clamp(1.0, 500.0);
        self.ambush_jitter = self.ambush_jitter.clamp(0.0, 2000.0);
    }
}

/// Layout family chosen by group size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationPattern {
    /// Evenly spaced ring around the player (fewer than 5).
    Surround,
    /// Two flanking columns (5 to 9).
    Pincer,
    /// Scattered jitter around the player (10 or more).
    Ambush,
}

impl FormationPattern {
    /// Pattern used for a group of `count` enemies.
    #[must_use]
    pub const fn for_count(count: usize) -> Self {
        match count {
            0..=4 => Self::Surround,
            5..=9 => Self::Pincer,
            _ => Self::Ambush,
        }
    }
}

/// A live formation group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationGroup {
    /// Group ID.
    pub id: GroupId,
    /// Layout the group was formed with.
    pub pattern: FormationPattern,
    /// Member enemies, in slot order.
    pub members: Vec<EntityId>,
}

/// Group created during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormedGroup {
    /// New group ID.
    pub id: GroupId,
    /// Layout used.
    pub pattern: FormationPattern,
    /// Number of enemies assigned.
    pub members: usize,
}

/// What changed during one coordinator update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormationUpdate {
    /// Group formed this tick, if any.
    pub formed: Option<FormedGroup>,
    /// Groups dissolved this tick.
    pub disbanded: Vec<GroupId>,
}

/// Assigns clusters of enemies to coordinated formation slots.
#[derive(Debug)]
pub struct FormationCoordinator {
    config: FormationConfig,
    cooldown: f32,
    groups: AHashMap<GroupId, FormationGroup>,
    next_group: GroupId,
    rng: fastrand::Rng,
}

impl Default for FormationCoordinator {
    fn default() -> Self {
        Self::new(FormationConfig::default())
    }
}

impl FormationCoordinator {
    /// Creates a coordinator with an entropy-seeded RNG.
    #[must_use]
    pub fn new(config: FormationConfig) -> Self {
        Self::with_seed(config, fastrand::u64(..))
    }

    /// Creates a coordinator with a fixed RNG seed. Out-of-range tuning is
    /// clamped.
    #[must_use]
    pub fn with_seed(mut config: FormationConfig, seed: u64) -> Self {
        config.validate();
        Self {
            config,
            cooldown: 0.0,
            groups: AHashMap::new(),
            next_group: GroupId::new(1),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &FormationConfig {
        &self.config
    }

    /// Seconds until another formation may start.
    #[must_use]
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Number of live groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Looks up a group.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&FormationGroup> {
        self.groups.get(&id)
    }

    /// Iterates live groups in no particular order.
    pub fn groups(&self) -> impl Iterator<Item = &FormationGroup> {
        self.groups.values()
    }

    /// Whether the active enemies in `enemies` are clustered enough to form up.
    #[must_use]
    pub fn should_form(&self, enemies: &[Enemy]) -> bool {
        let positions: Vec<Vec2> = enemies.iter().filter(|e| e.is_active()).map(Enemy::position).collect();
        self.is_clustered(&positions)
    }

    fn is_clustered(&self, positions: &[Vec2]) -> bool {
        if positions.len() < self.config.min_members.max(MIN_GROUP_SIZE) || self.cooldown > 0.0 {
            return false;
        }
        let threshold = self.config.proximity * self.config.proximity;
        let close_pairs = positions
            .iter()
            .enumerate()
            .flat_map(|(i, a)| positions[i + 1..].iter().map(move |b| a.distance_squared(*b)))
            .filter(|d| *d < threshold)
            .count();
        close_pairs >= positions.len() / 2
    }

    /// Exactly `count` slot positions around `player`.
    pub fn formation_positions(&mut self, count: usize, player: Vec2) -> Vec<Vec2> {
        match FormationPattern::for_count(count) {
            FormationPattern::Surround => {
                let radius = self.config.surround_radius;
                (0..count)
                    .map(|i| player + Vec2::from_angle(TAU * i as f32 / count as f32) * radius)
                    .collect()
            },
            FormationPattern::Pincer => {
                let half = count / 2;
                let left = self.flank(player, -self.config.pincer_offset, half);
                let right = self.flank(player, self.config.pincer_offset, count - half);
                left.chain(right).collect()
            },
            FormationPattern::Ambush => {
                let jitter = self.config.ambush_jitter;
                (0..count)
                    .map(|_| {
                        let dx = (self.rng.f32() * 2.0 - 1.0) * jitter;
                        let dy = (self.rng.f32() * 2.0 - 1.0) * jitter;
                        player + Vec2::new(dx, dy)
                    })
                    .collect()
            },
        }
    }

    fn flank(&self, player: Vec2, dx: f32, len: usize) -> impl Iterator<Item = Vec2> {
        let spacing = self.config.pincer_spacing;
        let centre = (len / 2) as f32;
        (0..len).map(move |i| player + Vec2::new(dx, (i as f32 - centre) * spacing))
    }

    /// Puts every active enemy in `enemies` into a new group, in input order.
    ///
    /// Spawning and dying enemies are skipped. Enemies already in another
    /// group are moved out of it. Resets the cooldown. Returns the new group,
    /// or `None` if nothing was active.
    pub fn initiate_formation(&mut self, enemies: &mut [Enemy], player: Vec2) -> Option<FormedGroup> {
        let indices: Vec<usize> = (0..enemies.len()).filter(|&i| enemies[i].is_active()).collect();
        self.assign(enemies, &indices, player)
    }

    fn assign(&mut self, enemies: &mut [Enemy], indices: &[usize], player: Vec2) -> Option<FormedGroup> {
        if indices.is_empty() {
            return None;
        }

        let id = self.next_group;
        self.next_group = id.next();
        let pattern = FormationPattern::for_count(indices.len());
        let positions = self.formation_positions(indices.len(), player);

        let mut members = Vec::with_capacity(indices.len());
        for (&index, target) in indices.iter().zip(positions) {
            let enemy = &mut enemies[index];
            if let Some(previous) = enemy.formation() {
                if let Some(group) = self.groups.get_mut(&previous.group) {
                    group.members.retain(|member| *member != enemy.id());
                }
            }
            enemy.assign_formation(FormationSlot { group: id, target });
            members.push(enemy.id());
        }

        debug!(
            "Formation {} formed: {:?} with {} enemies around ({:.0}, {:.0})",
            id,
            pattern,
            members.len(),
            player.x,
            player.y
        );

        let formed = FormedGroup {
            id,
            pattern,
            members: members.len(),
        };
        self.groups.insert(id, FormationGroup { id, pattern, members });
        self.cooldown = self.config.cooldown;
        Some(formed)
    }

    /// Runs one coordinator tick over the full enemy list.
    pub fn update(&mut self, dt: f32, enemies: &mut [Enemy], player: Vec2) -> FormationUpdate {
        self.cooldown = (self.cooldown - dt).max(0.0);

        let living: AHashSet<EntityId> = enemies.iter().filter(|e| e.is_alive()).map(Enemy::id).collect();
        for group in self.groups.values_mut() {
            group.members.retain(|id| living.contains(id));
        }

        let mut disbanded: Vec<GroupId> = self
            .groups
            .values()
            .filter(|group| group.members.len() < MIN_GROUP_SIZE)
            .map(|group| group.id)
            .collect();
        disbanded.sort_unstable_by_key(|id| id.raw());
        for id in &disbanded {
            self.groups.remove(id);
            debug!("Formation {id} disbanded");
        }

        for enemy in enemies.iter_mut() {
            if let Some(slot) = enemy.formation() {
                let kept = self
                    .groups
                    .get(&slot.group)
                    .is_some_and(|group| group.members.contains(&enemy.id()));
                if !kept {
                    enemy.clear_formation();
                }
            }
        }

        let candidates: Vec<usize> = (0..enemies.len())
            .filter(|&i| enemies[i].is_active() && !enemies[i].is_in_formation())
            .collect();
        let positions: Vec<Vec2> = candidates.iter().map(|&i| enemies[i].position()).collect();

        let formed = if self.is_clustered(&positions) {
            self.assign(enemies, &candidates, player)
        } else {
            None
        };

        FormationUpdate { formed, disbanded }
    }
}
