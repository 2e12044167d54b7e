//! Death notification
//!
//! Observers register a callback on an agent's [`DeathSignal`]; the signal
//! fires at most once and drops every subscriber as it does, so no observer
//! is ever notified twice.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use hecs::Entity;

/// Handle returned by [`DeathSignal::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type DeathCallback = Box<dyn FnMut(Entity)>;

/// Registrable "on death" callback list
#[derive(Default)]
pub struct DeathSignal {
    subscribers: Vec<(SubscriptionId, DeathCallback)>,
    next_id: u64,
    fired: bool,
}

impl DeathSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked with the dying entity
    pub fn subscribe(&mut self, callback: impl FnMut(Entity) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Notify and drop every subscriber. Later calls do nothing.
    pub fn emit(&mut self, entity: Entity) {
        if self.fired {
            return;
        }
        self.fired = true;
        for (_, mut callback) in std::mem::take(&mut self.subscribers) {
            callback(entity);
        }
    }
}

impl fmt::Debug for DeathSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeathSignal")
            .field("subscribers", &self.subscribers.len())
            .field("fired", &self.fired)
            .finish()
    }
}

/// Spawner-side count of living wave members
#[derive(Debug, Clone, Default)]
pub struct WaveTracker {
    alive: Rc<Cell<usize>>,
    spawned: usize,
}

impl WaveTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a freshly spawned agent and watch for its death
    pub fn track(&mut self, signal: &mut DeathSignal) -> SubscriptionId {
        self.alive.set(self.alive.get() + 1);
        self.spawned += 1;
        let alive = Rc::clone(&self.alive);
        signal.subscribe(move |entity| {
            alive.set(alive.get().saturating_sub(1));
            log::debug!("{entity:?} died, {} left in wave", alive.get());
        })
    }

    #[must_use]
    pub fn alive(&self) -> usize {
        self.alive.get()
    }

    /// Total agents tracked so far
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Everything spawned so far has died
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.alive.get() == 0
    }

    /// Start a new wave; the live count carries over
    pub fn reset_spawned(&mut self) {
        self.spawned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> Entity {
        hecs::World::new().spawn(())
    }

    #[test]
    fn test_emit_notifies_each_subscriber_once() {
        let calls = Rc::new(Cell::new(0));
        let mut signal = DeathSignal::new();
        for _ in 0..3 {
            let calls = Rc::clone(&calls);
            signal.subscribe(move |_| calls.set(calls.get() + 1));
        }

        let e = entity();
        signal.emit(e);
        signal.emit(e);

        assert_eq!(calls.get(), 3);
        assert_eq!(signal.subscriber_count(), 0);
        assert!(signal.has_fired());
    }

    #[test]
    fn test_unsubscribe_removes_callback() {
        let calls = Rc::new(Cell::new(0));
        let mut signal = DeathSignal::new();
        let id = {
            let calls = Rc::clone(&calls);
            signal.subscribe(move |_| calls.set(calls.get() + 1))
        };

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.emit(entity());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_wave_tracker_counts_down_on_death() {
        let mut tracker = WaveTracker::new();
        let mut a = DeathSignal::new();
        let mut b = DeathSignal::new();
        tracker.track(&mut a);
        tracker.track(&mut b);
        assert_eq!(tracker.alive(), 2);

        a.emit(entity());
        a.emit(entity());
        assert_eq!(tracker.alive(), 1);

        b.emit(entity());
        assert!(tracker.is_cleared());
        assert_eq!(tracker.spawned(), 2);
    }

    #[test]
    fn test_wave_tracker_clones_share_count() {
        let mut tracker = WaveTracker::new();
        let view = tracker.clone();
        let mut signal = DeathSignal::new();
        tracker.track(&mut signal);
        assert_eq!(view.alive(), 1);
        signal.emit(entity());
        assert_eq!(view.alive(), 0);
    }
}
