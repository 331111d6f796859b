use crate::model::{ClassroomId, SlotId, SubjectId, UserId, Weekday};

/// Options de la grille hebdomadaire
#[derive(Debug, Clone, Copy, Default)]
pub struct TimetableOptions {
    /// Dernière heure de cours autorisée (pas de borne si `None`).
    pub max_period: Option<u32>,
}

/// Demande de création d'un créneau
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub classroom: ClassroomId,
    pub subject: SubjectId,
    pub teacher: Option<UserId>,
    pub weekday: Weekday,
    pub period: u32,
}

/// Modification partielle d'un créneau : les champs absents sont conservés.
#[derive(Debug, Clone, Default)]
pub struct SlotPatch {
    pub classroom: Option<ClassroomId>,
    pub subject: Option<SubjectId>,
    pub weekday: Option<Weekday>,
    pub period: Option<u32>,
    pub teacher: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    DoubleBooking,  // même enseignant, même jour, même heure
    Unauthorized,   // habilitation retirée depuis la pose du créneau
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub teacher: UserId,
    pub slot_a: SlotId,
    pub slot_b: Option<SlotId>,
    pub kind: ConflictKind,
}
