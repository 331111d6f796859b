use super::{Conflict, ConflictKind};
use crate::error::SchedError;
use crate::model::{Registry, Slot, SlotId, UserId, Weekday};

/// Refuse si `teacher` occupe déjà (weekday, period) ailleurs que dans `exclude`.
pub(super) fn ensure_free(
    registry: &Registry,
    teacher: &UserId,
    weekday: Weekday,
    period: u32,
    exclude: Option<&SlotId>,
) -> Result<(), SchedError> {
    let taken = registry.slots().iter().find(|s| {
        Some(&s.id) != exclude && s.booking_key() == Some((teacher, weekday, period))
    });

    let Some(taken) = taken else {
        return Ok(());
    };

    let classroom_name = registry
        .find_classroom(&taken.classroom)
        .map(|c| c.name.clone())
        .unwrap_or_else(|_| "another class".to_string());

    Err(SchedError::SlotConflict {
        teacher: teacher.clone(),
        classroom: taken.classroom.clone(),
        classroom_name,
        weekday,
        period,
    })
}

pub(super) fn ensure_authorized(registry: &Registry, slot: &Slot) -> Result<(), SchedError> {
    let Some(teacher) = slot.teacher.as_ref() else {
        return Ok(());
    };
    if registry
        .roster()
        .is_authorized(&slot.classroom, &slot.subject, teacher)
    {
        return Ok(());
    }
    Err(SchedError::NotAuthorized {
        teacher: teacher.clone(),
        classroom: slot.classroom.clone(),
        subject: slot.subject.clone(),
    })
}

/// Audit de toute la grille : doubles réservations et créneaux sans habilitation.
pub(super) fn detect_conflicts(registry: &Registry) -> Vec<Conflict> {
    let mut out = Vec::new();
    let roster = registry.roster();
    let slots = registry.slots();

    for (idx, a) in slots.iter().enumerate() {
        let Some(key) = a.booking_key() else {
            continue;
        };
        let teacher = key.0;

        for b in slots.iter().skip(idx + 1) {
            if b.booking_key() == Some(key) {
                out.push(Conflict {
                    teacher: teacher.clone(),
                    slot_a: a.id.clone(),
                    slot_b: Some(b.id.clone()),
                    kind: ConflictKind::DoubleBooking,
                });
            }
        }

        if !roster.is_authorized(&a.classroom, &a.subject, teacher) {
            out.push(Conflict {
                teacher: teacher.clone(),
                slot_a: a.id.clone(),
                slot_b: None,
                kind: ConflictKind::Unauthorized,
            });
        }
    }

    out
}
