//! Event bus for combat notifications.
//!
//! The simulation publishes what happened each tick; presentation layers
//! (audio, VFX, HUD, the headless summary) drain the bus at their own pace.

use arena_common::{EntityId, GroupId, Vec2};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::category::EnemyCategory;
use crate::formation::FormationPattern;

/// Things that happened during combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Enemy added to the encounter
    EnemySpawned {
        /// Enemy ID
        enemy: EntityId,
        /// Enemy category
        category: EnemyCategory,
        /// Spawn point
        position: Vec2,
    },
    /// Enemy took damage from the player
    EnemyDamaged {
        /// Enemy ID
        enemy: EntityId,
        /// Damage amount
        amount: f32,
        /// Health left (may be negative)
        remaining: f32,
    },
    /// Enemy started its death fade
    EnemyDied {
        /// Enemy ID
        enemy: EntityId,
        /// Enemy category
        category: EnemyCategory,
        /// Experience awarded
        experience: u32,
    },
    /// Enemy faded out and left the encounter
    EnemyRemoved {
        /// Enemy ID
        enemy: EntityId,
    },
    /// Formation group created
    FormationFormed {
        /// Group ID
        group: GroupId,
        /// Layout used
        pattern: FormationPattern,
        /// Number of members
        members: usize,
    },
    /// Formation group dissolved
    FormationDisbanded {
        /// Group ID
        group: GroupId,
    },
    /// Enemy began a telegraphed volley
    TelegraphStarted {
        /// Enemy ID
        enemy: EntityId,
        /// Indicators created
        shots: u32,
    },
    /// Enemy projectiles launched this tick
    ProjectileFired {
        /// Enemy ID
        enemy: EntityId,
        /// Projectiles launched
        count: u32,
    },
    /// Player took damage from an enemy this tick
    PlayerHit {
        /// Enemy ID
        enemy: EntityId,
        /// Total damage dealt
        damage: f32,
    },
    /// Wave began spawning
    WaveStarted {
        /// Wave number (1-based)
        wave: u32,
        /// Enemies queued for the wave
        enemies: usize,
    },
    /// Wave fully cleared
    WaveCompleted {
        /// Wave number (1-based)
        wave: u32,
    },
}

/// Bounded, non-blocking event bus.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event; dropped if the bus is full.
    pub fn publish(&self, event: CombatEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}
