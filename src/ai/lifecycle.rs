//! Per-agent target list bookkeeping
//!
//! An agent works through an ordered list of targets, dropping each one as
//! soon as it stops being active.

use hecs::Entity;

use crate::ai::TargetSequence;

/// Result of re-validating an agent's target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// Still working on the same active target
    Engaging(Entity),
    /// Switched targets; `from` is `None` on the first adoption
    Advanced { from: Option<Entity>, to: Entity },
    /// The last target just went inactive
    ObjectiveReached,
    /// Nothing to do
    Idle,
}

/// Ordered list of admissible targets with the one currently engaged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    targets: Vec<Entity>,
    current: Option<Entity>,
    exhausted: bool,
}

impl TargetList {
    #[must_use]
    pub fn new(targets: Vec<Entity>) -> Self {
        Self {
            targets,
            current: None,
            exhausted: false,
        }
    }

    #[must_use]
    pub fn from_sequence(sequence: &TargetSequence) -> Self {
        Self::new(sequence.to_vec())
    }

    /// The target currently engaged
    #[must_use]
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    /// Targets not yet dropped, current one first
    #[must_use]
    pub fn remaining(&self) -> &[Entity] {
        &self.targets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether every target has been dealt with
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Append a target to the end of the list
    pub fn push(&mut self, target: Entity) {
        self.targets.push(target);
        self.exhausted = false;
    }

    /// Re-validate the current target against `is_active`.
    ///
    /// Inactive targets are removed from the front of the list until an
    /// active one is found.
    pub fn update(&mut self, is_active: impl Fn(Entity) -> bool) -> TargetStatus {
        let previous = self.current;
        let had_targets = previous.is_some() || !self.targets.is_empty();
        if self.current.is_none() {
            self.current = self.targets.first().copied();
        }

        while let Some(target) = self.current {
            if is_active(target) {
                break;
            }
            if let Some(index) = self.targets.iter().position(|&e| e == target) {
                self.targets.remove(index);
            }
            self.current = self.targets.first().copied();
        }

        match (previous, self.current) {
            (_, None) if !had_targets => TargetStatus::Idle,
            (_, None) => {
                self.exhausted = true;
                TargetStatus::ObjectiveReached
            }
            (Some(from), Some(to)) if from == to => TargetStatus::Engaging(to),
            (from, Some(to)) => TargetStatus::Advanced { from, to },
        }
    }
}
