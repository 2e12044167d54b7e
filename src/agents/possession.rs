//! Player possession
//!
//! Tracks which unit, if any, the player currently controls. Units receive a
//! shared handle at construction and consult it every tick.

use std::cell::RefCell;
use std::rc::Rc;

use hecs::Entity;

/// Shared handle passed to possessable units
pub type SharedPossession = Rc<RefCell<PossessionCoordinator>>;

/// Which unit the player controls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PossessionCoordinator {
    selected: Option<Entity>,
}

impl PossessionCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a coordinator behind a shared handle
    #[must_use]
    pub fn shared() -> SharedPossession {
        Rc::new(RefCell::new(Self::new()))
    }

    #[must_use]
    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }

    #[must_use]
    pub fn is_selected(&self, unit: Entity) -> bool {
        self.selected == Some(unit)
    }

    /// Take control of `unit`; ignored while another unit is held
    pub fn select(&mut self, unit: Entity) -> bool {
        if self.selected.is_some() {
            return false;
        }
        log::info!("Player took control of {unit:?}");
        self.selected = Some(unit);
        true
    }

    /// Hand control back to the overview; returns the released unit
    pub fn release(&mut self) -> Option<Entity> {
        let released = self.selected.take();
        if let Some(unit) = released {
            log::info!("Player released {unit:?}");
        }
        released
    }

    /// Release only if `unit` is the one held
    pub fn release_if(&mut self, unit: Entity) -> bool {
        if self.is_selected(unit) {
            self.release();
            true
        } else {
            false
        }
    }
}
