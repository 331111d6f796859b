#![forbid(unsafe_code)]
//! Horaire : emploi du temps d'établissement scolaire, local (sans BD).
//!
//! - Grille hebdomadaire (classe, matière, enseignant, jour, heure) sans double réservation.
//! - Remplacements datés, recherche d'enseignants libres, balayage quotidien.
//! - Calendrier scolaire (ouvré / férié / demi-journée) généré de façon idempotente.
//! - Stockage fichier JSON, écriture atomique.

pub mod calendar;
mod constraints;
pub mod error;
pub mod io;
pub mod model;
pub mod planner;
mod referential;
pub mod roster;
pub mod scheduler;
pub mod storage;
pub mod substitution;
pub mod sweeper;

pub use calendar::{CalendarGenerator, CalendarPatch, GenerateReport};
pub use error::{EntityKind, SchedError};
pub use model::{
    Authorization, CalendarDay, Classroom, DayStatus, Registry, School, Slot, Subject,
    SubstitutionOverride, User, UserRole, Weekday,
};
pub use planner::{Audit, Planner};
pub use roster::Roster;
pub use scheduler::{Conflict, ConflictKind, NewSlot, SlotPatch, TimetableOptions, TimetableScheduler};
pub use storage::{JsonStorage, MemoryStorage, Storage};
pub use substitution::{OverrideRequest, OverrideWarning, OverrideWarningKind, SubstitutionResolver};
pub use sweeper::{SweepOptions, SweepOutcome, Sweeper};
