//! Arena event queue
//!
//! Double-buffered: events pushed during tick N become readable after the
//! swap at the start of tick N+1, so readers never depend on agent update
//! order within a tick.

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened in the arena
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ArenaEvent {
    /// An entity took damage.
    EntityDamaged {
        entity: Entity,
        amount: f32,
        source: Option<Entity>,
    },

    /// A breakable entity's durability reached zero and it was removed.
    ///
    /// Covers the goal as well: the goal is breakable and is just the last
    /// obstacle in a target sequence.
    ObstacleDestroyed { entity: Entity },

    /// An agent switched to its next target.
    TargetAdvanced {
        agent: Entity,
        from: Option<Entity>,
        to: Entity,
    },

    /// An agent has no targets left.
    ObjectiveReached { agent: Entity },

    /// An agent died.
    AgentDied { agent: Entity },

    /// A turret fired at its aim point.
    TurretFired {
        turret: Entity,
        target: Option<Entity>,
        aim_point: Vec3,
    },

    /// Player control was released from a unit.
    ControlReleased { unit: Entity },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<ArenaEvent>,
    /// Events from previous tick, ready for processing
    processing: VecDeque<ArenaEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Push an event to be processed next tick.
    #[inline]
    pub fn push(&mut self, event: ArenaEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Call once per tick, before any agent updates.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Number of events pushed this tick so far.
    #[must_use]
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ArenaEvent> {
        self.processing.iter()
    }

    /// Events pushed this tick, not yet swapped in.
    #[inline]
    pub fn pending(&self) -> impl Iterator<Item = &ArenaEvent> {
        self.pending.iter()
    }

    /// Drain all events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = ArenaEvent> + '_ {
        self.processing.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl ArenaEvent {
    /// Whether this event leaves a collider behind that must be cleared
    #[must_use]
    pub fn removes_entity(&self) -> bool {
        matches!(
            self,
            Self::ObstacleDestroyed { .. } | Self::AgentDied { .. }
        )
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
