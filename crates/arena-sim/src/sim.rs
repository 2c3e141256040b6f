//! Headless simulation loop.
//!
//! Wires the combat core to the scripted player, the counting effect sink,
//! and the camera, then steps everything on a fixed timestep.

use arena_combat::{
    CombatEvent, CombatTarget, Encounter, EventBus, FormationCoordinator, RenderFrame, WaveDirector,
};
use arena_common::Vec2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::config::SimConfig;
use crate::effects::{CountingEffects, EffectCounts};
use crate::player::ScriptedPlayer;

/// Event bus capacity; events beyond it are dropped until drained.
const EVENT_CAPACITY: usize = 4096;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Configured duration elapsed
    TimeUp,
    /// Configured number of waves cleared
    WavesCleared,
    /// Player died
    PlayerDied,
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSummary {
    /// Why the run stopped
    pub reason: StopReason,
    /// Ticks simulated
    pub ticks: u64,
    /// Simulated seconds
    pub elapsed_secs: f32,
    /// Wave in progress at the end
    pub wave: u32,
    /// Waves fully cleared
    pub waves_cleared: u32,
    /// Enemies spawned
    pub enemies_spawned: u32,
    /// Enemies killed
    pub enemies_killed: u32,
    /// Enemies on the field at the end
    pub enemies_remaining: usize,
    /// Formations created
    pub formations: u32,
    /// Telegraphs shown
    pub telegraphs: u32,
    /// Projectiles launched
    pub projectiles_fired: u32,
    /// Hits the player took
    pub player_hits: u32,
    /// Damage the player took
    pub player_damage: f32,
    /// Player health at the end
    pub player_health: f32,
    /// Experience earned
    pub experience: u32,
    /// Effect requests
    pub effects: EffectCounts,
    /// Entities visible in the final frame
    pub visible_enemies: usize,
}

/// One headless run.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    encounter: Encounter,
    waves: WaveDirector,
    player: ScriptedPlayer,
    effects: CountingEffects,
    camera: Camera,
    waves_cleared: u32,
    ticks: u64,
}

impl Simulation {
    /// Builds a simulation from a validated config.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        info!("Simulation seed: {seed}");

        let formations = FormationCoordinator::with_seed(config.formation.clone(), seed);
        let encounter = Encounter::with_parts(config.world, formations, EventBus::new(EVENT_CAPACITY));
        let waves = WaveDirector::with_seed(config.waves.clone(), seed.wrapping_add(1));
        let player = ScriptedPlayer::new(config.player.clone(), &config.world, seed.wrapping_add(2));
        let effects = CountingEffects::new(config.effect_budget);
        let camera = Camera::new(Vec2::new(config.screen_width, config.screen_height), config.camera_zoom);

        Self {
            config,
            encounter,
            waves,
            player,
            effects,
            camera,
            waves_cleared: 0,
            ticks: 0,
        }
    }

    /// The encounter being simulated.
    #[must_use]
    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// The scripted player.
    #[must_use]
    pub fn player(&self) -> &ScriptedPlayer {
        &self.player
    }

    /// Advances one fixed step. Returns a stop reason once the run is over.
    pub fn step(&mut self) -> Option<StopReason> {
        let dt = self.config.fixed_dt();
        let bounds = *self.encounter.bounds();

        if self.ticks == 0 {
            self.waves.start_wave(self.config.start_wave, &self.encounter);
        }

        self.effects.begin_tick();
        self.player.advance(dt, &bounds, self.encounter.enemies());
        self.camera.center_on(self.player.position());

        let progress = self.waves.update(dt, &mut self.encounter);
        self.player.attack(dt, &mut self.encounter, &mut self.effects);
        self.encounter.tick(dt, &mut self.player, &mut self.effects);
        self.ticks += 1;

        self.log_events();

        if !self.player.is_alive() {
            return Some(StopReason::PlayerDied);
        }
        if progress.completed {
            self.waves_cleared += 1;
            if self.config.max_waves > 0 && self.waves_cleared >= self.config.max_waves {
                return Some(StopReason::WavesCleared);
            }
            self.waves.start_next_wave(&self.encounter);
        }
        if self.ticks >= self.config.total_ticks() {
            return Some(StopReason::TimeUp);
        }
        None
    }

    /// Runs until a stop condition and returns the summary.
    pub fn run(&mut self) -> SimSummary {
        let reason = loop {
            if let Some(reason) = self.step() {
                break reason;
            }
        };
        info!("Simulation stopped: {reason:?} after {} ticks", self.ticks);
        self.summary(reason)
    }

    /// Render snapshot through the camera.
    #[must_use]
    pub fn frame(&self) -> RenderFrame {
        self.encounter.render(&self.camera)
    }

    fn log_events(&self) {
        let events = self.encounter.events();
        if events.pending_count() >= events.capacity() {
            warn!("Combat event bus full; some events were dropped");
        }
        for event in events.drain() {
            match event {
                CombatEvent::WaveStarted { wave, enemies } => debug!("Wave {wave}: {enemies} enemies queued"),
                CombatEvent::FormationFormed { group, pattern, members } => {
                    debug!("{group} formed {pattern:?} with {members} members");
                },
                CombatEvent::EnemyDied { category, experience, .. } => {
                    debug!("{category} died (+{experience} xp)");
                },
                _ => {},
            }
        }
    }

    fn summary(&self, reason: StopReason) -> SimSummary {
        let stats = self.encounter.stats();
        let visible_enemies = self
            .frame()
            .enemies
            .iter()
            .filter(|view| self.camera.is_on_screen(view.position))
            .count();

        SimSummary {
            reason,
            ticks: self.ticks,
            elapsed_secs: stats.elapsed,
            wave: self.waves.wave(),
            waves_cleared: self.waves_cleared,
            enemies_spawned: stats.spawned,
            enemies_killed: stats.killed,
            enemies_remaining: self.encounter.enemies().len(),
            formations: stats.formations,
            telegraphs: stats.enemy_totals.telegraphs,
            projectiles_fired: stats.enemy_totals.shots_fired,
            player_hits: self.player.hits_taken(),
            player_damage: self.player.damage_taken(),
            player_health: self.player.health(),
            experience: stats.experience,
            effects: self.effects.counts(),
            visible_enemies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    fn config() -> SimConfig {
        let mut config = SimConfig {
            seed: Some(7),
            duration_secs: 90.0,
            ..SimConfig::default()
        };
        config.validate();
        config
    }

    #[test]
    fn test_run_stops_on_time() {
        let mut config = config();
        config.duration_secs = 2.0;
        let summary = Simulation::new(config).run();
        assert_eq!(summary.reason, StopReason::TimeUp);
        assert_eq!(summary.ticks, 120);
        assert_eq!(summary.wave, 1);
        assert!(summary.enemies_spawned >= 1);
    }

    #[test]
    fn test_first_wave_is_cleared() {
        let mut config = config();
        config.max_waves = 1;
        config.player = PlayerConfig {
            health: 100_000.0,
            attack_reach: 120.0,
            ..PlayerConfig::default()
        };

        let mut sim = Simulation::new(config);
        let summary = sim.run();
        assert_eq!(summary.reason, StopReason::WavesCleared);
        assert_eq!(summary.waves_cleared, 1);
        assert_eq!(summary.enemies_spawned, 3);
        assert_eq!(summary.enemies_killed, 3);
        assert!(summary.experience > 0);
        assert!(summary.effects.damage > 0);
    }

    #[test]
    fn test_fragile_player_dies() {
        let mut config = config();
        config.start_wave = 6;
        config.player = PlayerConfig {
            health: 5.0,
            attack_damage: 0.0,
            attack_variance: 0.0,
            ..PlayerConfig::default()
        };
        let summary = Simulation::new(config).run();
        assert_eq!(summary.reason, StopReason::PlayerDied);
        assert!(summary.player_health <= 0.0);
        assert!(summary.player_hits > 0);
    }

    #[test]
    fn test_visible_count_matches_camera() {
        let mut config = config();
        config.duration_secs = 10.0;
        config.start_wave = 4;
        config.player.health = 100_000.0;
        let mut sim = Simulation::new(config);
        let summary = sim.run();

        let expected = sim
            .encounter()
            .enemies()
            .iter()
            .filter(|e| sim.camera.is_visible(e.position()))
            .count();
        assert_eq!(summary.visible_enemies, expected);
        assert!(summary.visible_enemies <= summary.enemies_remaining);
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let mut config = config();
        config.duration_secs = 20.0;
        let a = Simulation::new(config.clone()).run();
        let b = Simulation::new(config).run();
        assert_eq!(a.enemies_spawned, b.enemies_spawned);
        assert_eq!(a.player_hits, b.player_hits);
        assert_eq!(a.formations, b.formations);
        assert_eq!(a.wave, b.wave);
    }
}
