mod conflicts;
mod mutate;
mod types;
mod util;

pub use types::{Conflict, ConflictKind, NewSlot, SlotPatch, TimetableOptions};

use crate::error::SchedError;
use crate::model::{ClassroomId, Registry, Slot, SlotId, SubjectId, User};
use std::ops::{Deref, DerefMut};

/// Scheduler : grille hebdomadaire (classe, matière, enseignant, jour, heure).
///
/// `R` vaut `&Registry` pour les lectures, `&mut Registry` pour les écritures.
#[derive(Debug)]
pub struct TimetableScheduler<R> {
    registry: R,
    opts: TimetableOptions,
}

impl<R: Deref<Target = Registry>> TimetableScheduler<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            opts: TimetableOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: TimetableOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn get_slot(&self, id: &SlotId) -> Result<&Slot, SchedError> {
        self.registry.find_slot(id)
    }

    /// Toute la grille, triée par jour puis par heure.
    pub fn list_slots(&self) -> Vec<&Slot> {
        let mut slots: Vec<&Slot> = self.registry.slots().iter().collect();
        slots.sort_by(|a, b| util::grid_order(a, b));
        slots
    }

    /// Créneaux d'une classe, triés par jour puis par heure.
    pub fn list_slots_by_classroom(&self, classroom: &ClassroomId) -> Result<Vec<&Slot>, SchedError> {
        self.registry.find_classroom(classroom)?;
        let mut slots: Vec<&Slot> = self
            .registry
            .slots()
            .iter()
            .filter(|s| &s.classroom == classroom)
            .collect();
        slots.sort_by(|a, b| util::grid_order(a, b));
        Ok(slots)
    }

    pub fn list_teachers_authorized_for(
        &self,
        classroom: &ClassroomId,
        subject: &SubjectId,
    ) -> Result<Vec<&User>, SchedError> {
        self.registry.find_classroom(classroom)?;
        self.registry.find_subject(subject)?;
        self.registry
            .roster()
            .teachers_for(classroom, subject)
            .into_iter()
            .map(|id| self.registry.find_user(id))
            .collect()
    }

    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        conflicts::detect_conflicts(&self.registry)
    }
}

impl<R: DerefMut<Target = Registry>> TimetableScheduler<R> {
    pub fn create_slot(&mut self, req: NewSlot) -> Result<Slot, SchedError> {
        mutate::create_slot(&mut self.registry, req, self.opts)
    }

    pub fn update_slot(&mut self, id: &SlotId, patch: SlotPatch) -> Result<Slot, SchedError> {
        mutate::update_slot(&mut self.registry, id, patch, self.opts)
    }

    /// Supprime le créneau (et ses remplacements) ; `NotFound` s'il n'existe pas.
    pub fn delete_slot(&mut self, id: &SlotId) -> Result<Slot, SchedError> {
        mutate::delete_slot(&mut self.registry, id)
    }
}
