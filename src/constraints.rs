//! Écritures bas niveau du registre, avec contraintes d'unicité.
//!
//! Ce sont les équivalents des contraintes `UNIQUE` d'une base : les services
//! vérifient avant d'écrire pour produire une erreur lisible, ces fonctions
//! refusent quoi qu'il arrive.

use crate::error::{EntityKind, SchedError};
use crate::model::{
    CalendarDay, OverrideId, Registry, SchoolId, Slot, SlotId, SubstitutionOverride,
};
use chrono::NaiveDate;
use std::collections::HashSet;

const SLOT_BOOKING: &str = "slot (teacher, weekday, period)";
const CALENDAR_DAY: &str = "calendar day (school, date)";
const DUPLICATE_ID: &str = "primary key";

impl Registry {
    pub(crate) fn insert_slot(&mut self, slot: Slot) -> Result<(), SchedError> {
        if self.slots.iter().any(|s| s.id == slot.id) {
            return Err(SchedError::UniqueViolation(DUPLICATE_ID));
        }
        self.check_booking(&slot)?;
        self.slots.push(slot);
        Ok(())
    }

    pub(crate) fn replace_slot(&mut self, slot: Slot) -> Result<(), SchedError> {
        let pos = self
            .slots
            .iter()
            .position(|s| s.id == slot.id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Slot, &slot.id))?;
        self.check_booking(&slot)?;
        self.slots[pos] = slot;
        Ok(())
    }

    /// Supprime le créneau et les remplacements qui le visent.
    pub(crate) fn remove_slot(&mut self, id: &SlotId) -> Result<Slot, SchedError> {
        let pos = self
            .slots
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Slot, id))?;
        self.overrides.retain(|o| &o.slot != id);
        Ok(self.slots.remove(pos))
    }

    fn check_booking(&self, slot: &Slot) -> Result<(), SchedError> {
        let Some(key) = slot.booking_key() else {
            return Ok(());
        };
        let taken = self
            .slots
            .iter()
            .any(|s| s.id != slot.id && s.booking_key() == Some(key));
        if taken {
            return Err(SchedError::UniqueViolation(SLOT_BOOKING));
        }
        Ok(())
    }

    pub(crate) fn upsert_override(&mut self, entry: SubstitutionOverride) {
        match self.overrides.iter_mut().find(|o| o.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.overrides.push(entry),
        }
    }

    pub(crate) fn remove_override(
        &mut self,
        id: &OverrideId,
    ) -> Result<SubstitutionOverride, SchedError> {
        let pos = self
            .overrides
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Override, id))?;
        Ok(self.overrides.remove(pos))
    }

    pub(crate) fn retain_overrides<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&SubstitutionOverride) -> bool,
    {
        let before = self.overrides.len();
        self.overrides.retain(keep);
        before - self.overrides.len()
    }

    pub(crate) fn insert_calendar_day(&mut self, day: CalendarDay) -> Result<(), SchedError> {
        if self.calendar.iter().any(|d| d.id == day.id) {
            return Err(SchedError::UniqueViolation(DUPLICATE_ID));
        }
        self.check_calendar_day(&day)?;
        self.calendar.push(day);
        Ok(())
    }

    pub(crate) fn replace_calendar_day(&mut self, day: CalendarDay) -> Result<(), SchedError> {
        let pos = self
            .calendar
            .iter()
            .position(|d| d.id == day.id)
            .ok_or_else(|| SchedError::not_found(EntityKind::CalendarDay, &day.id))?;
        self.check_calendar_day(&day)?;
        self.calendar[pos] = day;
        Ok(())
    }

    fn check_calendar_day(&self, day: &CalendarDay) -> Result<(), SchedError> {
        let taken = self
            .calendar
            .iter()
            .any(|d| d.id != day.id && d.school == day.school && d.date == day.date);
        if taken {
            return Err(SchedError::UniqueViolation(CALENDAR_DAY));
        }
        Ok(())
    }

    pub(crate) fn has_calendar_day(&self, school: &SchoolId, date: NaiveDate) -> bool {
        self.calendar
            .iter()
            .any(|d| &d.school == school && d.date == date)
    }

    /// Vérifie les contraintes d'unicité sur un registre chargé depuis un support.
    pub fn validate(&self) -> Result<(), SchedError> {
        let mut bookings = HashSet::new();
        let mut slot_ids = HashSet::new();
        for slot in &self.slots {
            if !slot_ids.insert(&slot.id) {
                return Err(SchedError::UniqueViolation(DUPLICATE_ID));
            }
            if slot.period == 0 {
                return Err(SchedError::InvalidInput(format!(
                    "slot {} has period 0",
                    slot.id
                )));
            }
            if let Some(key) = slot.booking_key() {
                if !bookings.insert(key) {
                    return Err(SchedError::UniqueViolation(SLOT_BOOKING));
                }
            }
        }

        let mut days = HashSet::new();
        for day in &self.calendar {
            if !days.insert((&day.school, day.date)) {
                return Err(SchedError::UniqueViolation(CALENDAR_DAY));
            }
        }

        let mut override_ids = HashSet::new();
        for entry in &self.overrides {
            if !override_ids.insert(&entry.id) {
                return Err(SchedError::UniqueViolation(DUPLICATE_ID));
            }
        }
        Ok(())
    }
}
