use super::{conflicts, util, NewSlot, SlotPatch, TimetableOptions};
use crate::error::SchedError;
use crate::model::{Registry, Slot, SlotId};
use tracing::debug;

pub(super) fn create_slot(
    registry: &mut Registry,
    req: NewSlot,
    opts: TimetableOptions,
) -> Result<Slot, SchedError> {
    util::validate_period(req.period, opts)?;
    registry.find_classroom(&req.classroom)?;
    registry.find_subject(&req.subject)?;

    let slot = Slot {
        id: SlotId::random(),
        classroom: req.classroom,
        subject: req.subject,
        teacher: req.teacher,
        weekday: req.weekday,
        period: req.period,
    };

    if let Some(teacher) = slot.teacher.as_ref() {
        registry.find_user(teacher)?;
        conflicts::ensure_authorized(registry, &slot)?;
        conflicts::ensure_free(registry, teacher, slot.weekday, slot.period, None)?;
    }

    registry.insert_slot(slot.clone())?;
    debug!(slot = %slot.id, weekday = %slot.weekday, period = slot.period, "slot created");
    Ok(slot)
}

pub(super) fn update_slot(
    registry: &mut Registry,
    id: &SlotId,
    patch: SlotPatch,
    opts: TimetableOptions,
) -> Result<Slot, SchedError> {
    // on travaille sur une copie : rien n'est écrit avant la fin des contrôles
    let mut slot = registry.find_slot(id)?.clone();

    if let Some(classroom) = patch.classroom {
        registry.find_classroom(&classroom)?;
        slot.classroom = classroom;
    }
    if let Some(subject) = patch.subject {
        registry.find_subject(&subject)?;
        slot.subject = subject;
    }
    if let Some(weekday) = patch.weekday {
        slot.weekday = weekday;
    }
    if let Some(period) = patch.period {
        util::validate_period(period, opts)?;
        slot.period = period;
    }
    if let Some(teacher) = patch.teacher {
        registry.find_user(&teacher)?;
        slot.teacher = Some(teacher);
    }

    if let Some(teacher) = slot.teacher.as_ref() {
        conflicts::ensure_authorized(registry, &slot)?;
        conflicts::ensure_free(registry, teacher, slot.weekday, slot.period, Some(&slot.id))?;
    }

    registry.replace_slot(slot.clone())?;
    debug!(slot = %slot.id, weekday = %slot.weekday, period = slot.period, "slot updated");
    Ok(slot)
}

pub(super) fn delete_slot(registry: &mut Registry, id: &SlotId) -> Result<Slot, SchedError> {
    let before = registry.overrides().len();
    let removed = registry.remove_slot(id)?;
    let cascaded = before - registry.overrides().len();
    debug!(slot = %id, cascaded, "slot deleted");
    Ok(removed)
}
