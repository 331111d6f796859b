use crate::model::{ClassroomId, SubjectId, UserId, Weekday};
use std::fmt;
use thiserror::Error;

/// Type d'entité référencée par une erreur `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    School,
    Classroom,
    Subject,
    User,
    Authorization,
    Slot,
    Override,
    CalendarDay,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::School => "school",
            EntityKind::Classroom => "classroom",
            EntityKind::Subject => "subject",
            EntityKind::User => "user",
            EntityKind::Authorization => "authorization",
            EntityKind::Slot => "slot",
            EntityKind::Override => "substitution",
            EntityKind::CalendarDay => "calendar entry",
        })
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },
    #[error("teacher {teacher} is not assigned to classroom {classroom} for subject {subject}")]
    NotAuthorized {
        teacher: UserId,
        classroom: ClassroomId,
        subject: SubjectId,
    },
    #[error("teacher {teacher} is already allotted to class {classroom_name} on {weekday} period {period}")]
    SlotConflict {
        teacher: UserId,
        classroom: ClassroomId,
        classroom_name: String,
        weekday: Weekday,
        period: u32,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Contrainte d'unicité du stockage (filet de sécurité sous les contrôles applicatifs).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SchedError {
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        SchedError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
