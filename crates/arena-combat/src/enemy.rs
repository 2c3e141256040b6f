//! Enemy actors.
//!
//! This module provides:
//! - The per-enemy life cycle (spawn fade, active, death fade)
//! - Knockback physics under world bounds
//! - Standalone AI and formation steering
//! - The ranged pipeline: volley -> indicators -> projectiles -> hits
//!
//! Life cycle: `Spawning -> Active -> Dying -> removed`. Only `Active` enemies
//! move on their own, join formations, or attack. A dying enemy only fades.

use arena_common::{heading, ArenaResult, EntityId, Vec2, WorldBounds};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::category::{CategoryStats, EnemyCategory, RangedProfile};
use crate::collab::{emit_damage_effect, emit_impact_effect, CombatTarget, EffectSink, ImpactKind};
use crate::formation::FormationSlot;
use crate::indicator::AttackIndicator;
use crate::projectile::{Projectile, ProjectileStep};

// ============================================================================
// Tuning
// ============================================================================

/// Seconds to fade in after spawning.
pub const SPAWN_FADE_SECONDS: f32 = 0.8;

/// Seconds to fade out after dying.
pub const DEATH_FADE_SECONDS: f32 = 0.6;

/// Seconds the hit flash stays visible.
pub const DAMAGE_FLASH_SECONDS: f32 = 0.2;

/// Maximum knockback speed.
pub const KNOCKBACK_CAP: f32 = 400.0;

/// Knockback below this per-axis speed snaps to zero.
pub const KNOCKBACK_REST_SPEED: f32 = 5.0;

/// Fraction of knockback kept per 60 Hz frame.
pub const KNOCKBACK_RETAIN_PER_FRAME: f32 = 0.85;

/// Knockback speed at which self-directed movement bottoms out.
pub const KNOCKBACK_STAGGER_SPEED: f32 = 200.0;

/// Lowest fraction of normal speed a staggered enemy keeps.
pub const MIN_MOBILITY: f32 = 0.3;

/// Enemies farther than this outside the playfield walk back instead of fighting.
pub const ATTACK_BOUNDS_MARGIN: f32 = 400.0;

/// Distance at which an enemy counts as standing on its formation slot.
pub const FORMATION_ARRIVE_RADIUS: f32 = 20.0;

/// Ranged enemies retreat when closer than this fraction of preferred distance.
pub const RETREAT_RATIO: f32 = 0.7;

/// Ranged enemies approach when farther than this fraction of preferred distance.
pub const APPROACH_RATIO: f32 = 1.3;

const RETREAT_SPEED: f32 = 0.8;
const APPROACH_SPEED: f32 = 0.6;
const STRAFE_SPEED: f32 = 0.4;
const RETURN_SPEED: f32 = 0.5;
const RANGED_WALL_INSET: f32 = 50.0;
const KNOCKBACK_WALL_PAD: f32 = 10.0;

// ============================================================================
// Life phase
// ============================================================================

/// Where an enemy is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifePhase {
    /// Fading in; `progress` rises from 0.0 to 1.0.
    Spawning {
        /// Fade-in progress (0.0-1.0).
        progress: f32,
    },
    /// Fully present and fighting.
    Active,
    /// Fading out; `remaining` falls from 1.0 to 0.0.
    Dying {
        /// Remaining opacity (0.0-1.0).
        remaining: f32,
    },
}

impl LifePhase {
    /// Opacity to draw the enemy with.
    #[must_use]
    pub fn opacity(self) -> f32 {
        match self {
            Self::Spawning { progress } => progress,
            Self::Active => 1.0,
            Self::Dying { remaining } => remaining,
        }
    }
}

// ============================================================================
// Tick report
// ============================================================================

/// What one enemy did during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Volleys started (one per ranged attack decision).
    pub volleys: u32,
    /// Indicators created.
    pub telegraphs: u32,
    /// Projectiles launched.
    pub shots_fired: u32,
    /// Melee strikes landed.
    pub melee_hits: u32,
    /// Projectiles that hit the player.
    pub projectile_hits: u32,
    /// Total damage dealt to the player.
    pub damage_dealt: f32,
}

impl TickReport {
    /// Accumulates another report into this one.
    pub fn merge(&mut self, other: &Self) {
        self.volleys += other.volleys;
        self.telegraphs += other.telegraphs;
        self.shots_fired += other.shots_fired;
        self.melee_hits += other.melee_hits;
        self.projectile_hits += other.projectile_hits;
        self.damage_dealt += other.damage_dealt;
    }
}

// ============================================================================
// Enemy
// ============================================================================

/// A hostile actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    id: EntityId,
    category: EnemyCategory,
    stats: CategoryStats,
    position: Vec2,
    velocity: Vec2,
    health: f32,
    max_health: f32,
    damage: f32,
    attack_cooldown: f32,
    damage_flash: f32,
    knockback: Vec2,
    phase: LifePhase,
    formation: Option<FormationSlot>,
    indicators: Vec<AttackIndicator>,
    projectiles: Vec<Projectile>,
}

impl Enemy {
    /// Creates an enemy of the given category, fading in at `position`.
    #[must_use]
    pub fn new(category: EnemyCategory, position: Vec2) -> Self {
        let stats = category.stats();
        Self {
            id: EntityId::new(),
            category,
            stats,
            position,
            velocity: Vec2::ZERO,
            health: stats.max_health,
            max_health: stats.max_health,
            damage: stats.damage,
            attack_cooldown: 0.0,
            damage_flash: 0.0,
            knockback: Vec2::ZERO,
            phase: LifePhase::Spawning { progress: 0.0 },
            formation: None,
            indicators: Vec::new(),
            projectiles: Vec::new(),
        }
    }

    /// Creates an enemy from a category name, failing on unknown names.
    pub fn from_name(name: &str, position: Vec2) -> ArenaResult<Self> {
        Ok(Self::new(name.parse()?, position))
    }

    /// Overrides maximum (and current) health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self.health = max_health;
        self
    }

    /// Overrides damage per hit.
    #[must_use]
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Skips the spawn fade.
    #[must_use]
    pub fn with_spawn_complete(mut self) -> Self {
        if matches!(self.phase, LifePhase::Spawning { .. }) {
            self.phase = LifePhase::Active;
        }
        self
    }

    // --- Accessors ---------------------------------------------------------

    /// Unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Category.
    #[must_use]
    pub const fn category(&self) -> EnemyCategory {
        self.category
    }

    /// Base stats resolved at construction.
    #[must_use]
    pub const fn stats(&self) -> &CategoryStats {
        &self.stats
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the enemy (spawning, scripted placement).
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Displacement per second observed over the last tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Current health; negative once overkilled.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Health fraction clamped to 0.0-1.0.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    /// Damage per hit.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Seconds until the next attack is allowed.
    #[must_use]
    pub const fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Remaining hit-flash time.
    #[must_use]
    pub const fn damage_flash(&self) -> f32 {
        self.damage_flash
    }

    /// Current knockback velocity.
    #[must_use]
    pub const fn knockback(&self) -> Vec2 {
        self.knockback
    }

    /// Life phase.
    #[must_use]
    pub const fn phase(&self) -> LifePhase {
        self.phase
    }

    /// Opacity to draw with (0.0-1.0).
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.phase.opacity()
    }

    /// Formation assignment, if any.
    #[must_use]
    pub const fn formation(&self) -> Option<FormationSlot> {
        self.formation
    }

    /// Whether the enemy currently follows a formation slot.
    #[must_use]
    pub const fn is_in_formation(&self) -> bool {
        self.formation.is_some()
    }

    /// Pending and spent telegraphs.
    #[must_use]
    pub fn indicators(&self) -> &[AttackIndicator] {
        &self.indicators
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Still fading in.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        matches!(self.phase, LifePhase::Spawning { .. })
    }

    /// Fully present: the only phase that moves, forms up, and attacks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == LifePhase::Active
    }

    /// Fading out.
    #[must_use]
    pub fn is_dying(&self) -> bool {
        matches!(self.phase, LifePhase::Dying { .. })
    }

    /// Has health left and is not fading out.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0 && !self.is_dying()
    }

    /// True once the death fade has fully decayed.
    #[must_use]
    pub fn should_be_removed(&self) -> bool {
        matches!(self.phase, LifePhase::Dying { remaining } if remaining <= 0.0)
    }

    /// Fraction of normal speed available under current knockback.
    #[must_use]
    pub fn mobility(&self) -> f32 {
        (1.0 - self.knockback.length() / KNOCKBACK_STAGGER_SPEED).max(MIN_MOBILITY)
    }

    // --- Formation hooks ---------------------------------------------------

    pub(crate) fn assign_formation(&mut self, slot: FormationSlot) {
        self.formation = Some(slot);
    }

    pub(crate) fn clear_formation(&mut self) {
        self.formation = None;
    }

    // --- External input ----------------------------------------------------

    /// Applies damage. Returns true if this hit started the death fade.
    ///
    /// Health may go negative. The enemy is not removed here; it fades out
    /// and [`Enemy::should_be_removed`] turns true once the fade completes.
    pub fn take_damage(&mut self, amount: f32, effects: &mut dyn EffectSink) -> bool {
        self.health -= amount;
        self.damage_flash = DAMAGE_FLASH_SECONDS;
        emit_damage_effect(effects, self.position, self.category, amount);

        if self.health <= 0.0 && !self.is_dying() {
            self.begin_dying();
            return true;
        }
        false
    }

    /// Adds a knockback impulse, capping the total at [`KNOCKBACK_CAP`].
    pub fn apply_knockback(&mut self, impulse: Vec2) {
        if !impulse.is_finite() {
            return;
        }
        self.knockback = (self.knockback + impulse).clamp_length_max(KNOCKBACK_CAP);
    }

    // --- Simulation --------------------------------------------------------

    /// Runs one simulation tick.
    ///
    /// Order: fades, then (unless dying) knockback physics, AI or formation
    /// steering, and the owned indicators and projectiles. Timers tick last.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut dyn CombatTarget,
        bounds: &WorldBounds,
        effects: &mut dyn EffectSink,
    ) -> TickReport {
        let mut report = TickReport::default();
        let start = self.position;

        self.advance_fade(dt);

        if !self.is_dying() {
            self.apply_physics(dt, bounds);

            if self.is_active() {
                match self.formation {
                    Some(slot) => self.follow_formation(dt, slot, player, bounds, effects, &mut report),
                    None => self.standard_ai(dt, player, bounds, effects, &mut report),
                }
            }

            self.advance_attacks(dt, player, bounds, effects, &mut report);
        }

        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.damage_flash = (self.damage_flash - dt).max(0.0);
        self.velocity = if dt > 0.0 {
            (self.position - start) / dt
        } else {
            Vec2::ZERO
        };

        report
    }

    fn advance_fade(&mut self, dt: f32) {
        match &mut self.phase {
            LifePhase::Spawning { progress } => {
                *progress = (*progress + dt / SPAWN_FADE_SECONDS).clamp(0.0, 1.0);
                if *progress >= 1.0 {
                    self.phase = LifePhase::Active;
                }
            },
            LifePhase::Dying { remaining } => {
                *remaining = (*remaining - dt / DEATH_FADE_SECONDS).clamp(0.0, 1.0);
            },
            LifePhase::Active => {},
        }
    }

    fn begin_dying(&mut self) {
        debug!(
            "Enemy {} ({}) died at ({:.0}, {:.0})",
            self.id, self.category, self.position.x, self.position.y
        );
        self.phase = LifePhase::Dying { remaining: 1.0 };
        self.formation = None;
        self.knockback = Vec2::ZERO;
        self.indicators.clear();
        self.projectiles.clear();
    }

    fn apply_physics(&mut self, dt: f32, bounds: &WorldBounds) {
        if self.knockback.x.abs() <= KNOCKBACK_REST_SPEED && self.knockback.y.abs() <= KNOCKBACK_REST_SPEED {
            self.knockback = Vec2::ZERO;
            return;
        }

        let clamped = bounds.clamp_inset(
            self.position + self.knockback * dt,
            self.stats.radius + KNOCKBACK_WALL_PAD,
        );
        self.position = clamped.point;
        if clamped.hit_x {
            self.knockback.x = 0.0;
        }
        if clamped.hit_y {
            self.knockback.y = 0.0;
        }
        self.knockback *= KNOCKBACK_RETAIN_PER_FRAME.powf(dt * 60.0);
    }

    fn follow_formation(
        &mut self,
        dt: f32,
        slot: FormationSlot,
        player: &mut dyn CombatTarget,
        bounds: &WorldBounds,
        effects: &mut dyn EffectSink,
        report: &mut TickReport,
    ) {
        let remaining = self.position.distance(slot.target);
        if remaining > FORMATION_ARRIVE_RADIUS {
            if let Some(dir) = heading(self.position, slot.target) {
                let step = (self.stats.speed * dt).min(remaining);
                self.position = bounds.clamp_inset(self.position + dir * step, 0.0).point;
            }
        }

        if self.position.distance(player.position()) <= self.stats.attack_range {
            self.engage(player, bounds, effects, report);
        }
    }

    fn standard_ai(
        &mut self,
        dt: f32,
        player: &mut dyn CombatTarget,
        bounds: &WorldBounds,
        effects: &mut dyn EffectSink,
        report: &mut TickReport,
    ) {
        if !bounds.contains_with_margin(self.position, ATTACK_BOUNDS_MARGIN) {
            if let Some(dir) = heading(self.position, bounds.center()) {
                self.position += dir * self.stats.speed * RETURN_SPEED * dt;
            }
            return;
        }

        let target = player.position();
        let distance = self.position.distance(target);
        let direction = heading(self.position, target);
        let step = self.stats.speed * self.mobility() * dt;

        if self.stats.ranged.is_some() {
            let preferred = self.stats.preferred_distance;
            if let Some(dir) = direction {
                let offset = if distance < preferred * RETREAT_RATIO {
                    -dir * step * RETREAT_SPEED
                } else if distance > preferred * APPROACH_RATIO {
                    dir * step * APPROACH_SPEED
                } else {
                    dir.perp() * step * STRAFE_SPEED
                };
                self.position = bounds.clamp_inset(self.position + offset, RANGED_WALL_INSET).point;
            }
            if distance <= self.stats.attack_range {
                self.engage(player, bounds, effects, report);
            }
        } else if distance > self.stats.attack_range {
            if let Some(dir) = direction {
                self.position = bounds.clamp_inset(self.position + dir * step, 0.0).point;
            }
        } else {
            self.engage(player, bounds, effects, report);
        }
    }

    /// Attacks if the cooldown allows: a melee strike or a telegraphed volley.
    fn engage(
        &mut self,
        player: &mut dyn CombatTarget,
        bounds: &WorldBounds,
        effects: &mut dyn EffectSink,
        report: &mut TickReport,
    ) {
        if self.attack_cooldown > 0.0 || !player.is_alive() {
            return;
        }
        if !bounds.contains_with_margin(self.position, ATTACK_BOUNDS_MARGIN) {
            return;
        }

        match self.stats.ranged {
            Some(profile) => self.start_volley(&profile, player.position(), bounds, report),
            None => {
                if player.is_within_reach(self.position, self.stats.attack_range) {
                    player.take_damage(self.damage, self.id);
                    emit_impact_effect(effects, player.position(), ImpactKind::Melee);
                    self.attack_cooldown = self.stats.melee_cooldown;
                    report.melee_hits += 1;
                    report.damage_dealt += self.damage;
                }
            },
        }
    }

    fn start_volley(&mut self, profile: &RangedProfile, player: Vec2, bounds: &WorldBounds, report: &mut TickReport) {
        for index in 0..profile.shot_count {
            let fire_delay = profile.fire_delay(index);
            self.indicators.push(AttackIndicator::new(
                self.id,
                self.position,
                player,
                profile.angle_offset(index),
                profile.target_offset,
                fire_delay,
                fire_delay + profile.linger,
                bounds,
            ));
        }
        self.attack_cooldown = profile.cooldown;
        report.volleys += 1;
        report.telegraphs += profile.shot_count;
        trace!("Enemy {} telegraphed {} shot(s)", self.id, profile.shot_count);
    }

    fn advance_attacks(
        &mut self,
        dt: f32,
        player: &mut dyn CombatTarget,
        bounds: &WorldBounds,
        effects: &mut dyn EffectSink,
        report: &mut TickReport,
    ) {
        let origin = self.position;
        let player_pos = player.position();
        let (id, damage) = (self.id, self.damage);

        if let Some(profile) = self.stats.ranged {
            for indicator in &mut self.indicators {
                let Some(target) = indicator.update(dt, origin, player_pos, bounds) else {
                    continue;
                };
                match Projectile::aimed(
                    id,
                    origin,
                    target,
                    profile.projectile_speed,
                    damage,
                    profile.projectile_radius,
                ) {
                    Some(projectile) => {
                        self.projectiles.push(projectile);
                        report.shots_fired += 1;
                    },
                    None => trace!("Enemy {id} skipped a shot with no usable direction"),
                }
            }
        }
        self.indicators.retain(|indicator| !indicator.is_expired());

        self.projectiles.retain_mut(|projectile| match projectile.step(dt, &*player, bounds) {
            ProjectileStep::Flying => true,
            ProjectileStep::Hit => {
                player.take_damage(projectile.damage, projectile.owner);
                emit_impact_effect(effects, projectile.position, ImpactKind::Projectile);
                report.projectile_hits += 1;
                report.damage_dealt += projectile.damage;
                false
            },
            ProjectileStep::OffWorld => false,
        });
    }
}
