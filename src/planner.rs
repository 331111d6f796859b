//! Façade transactionnelle au-dessus d'un [`Storage`].
//!
//! Chaque écriture est une [`Storage::transaction`] : chargement, opération
//! et sauvegarde sous le verrou du support, partagé entre processus pour un
//! fichier JSON. Deux créations concurrentes ne peuvent donc pas passer le
//! contrôle de conflit avant que l'une d'elles soit écrite. Une opération en
//! erreur ne sauvegarde rien.

use crate::calendar::{CalendarGenerator, CalendarPatch, GenerateReport};
use crate::error::SchedError;
use crate::model::{
    CalendarDay, CalendarDayId, ClassroomId, DayStatus, OverrideId, Registry, SchoolId, Slot,
    SlotId, SubjectId, SubstitutionOverride, User, UserId,
};
use crate::scheduler::{Conflict, NewSlot, SlotPatch, TimetableOptions, TimetableScheduler};
use crate::storage::Storage;
use crate::substitution::{OverrideRequest, OverrideWarning, SubstitutionResolver};
use chrono::NaiveDate;

/// Résultat d'un audit complet (grille + remplacements).
#[derive(Debug, Clone, Default)]
pub struct Audit {
    pub conflicts: Vec<Conflict>,
    pub warnings: Vec<OverrideWarning>,
}

impl Audit {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.warnings.is_empty()
    }
}

pub struct Planner<S> {
    storage: S,
    opts: TimetableOptions,
}

impl<S: Storage> Planner<S> {
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, TimetableOptions::default())
    }

    pub fn with_options(storage: S, opts: TimetableOptions) -> Self {
        Self { storage, opts }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn read<T, F>(&self, f: F) -> Result<T, SchedError>
    where
        F: FnOnce(&Registry) -> Result<T, SchedError>,
    {
        let registry = self.storage.load()?;
        f(&registry)
    }

    pub fn write<T, F>(&self, f: F) -> Result<T, SchedError>
    where
        F: FnOnce(&mut Registry) -> Result<T, SchedError>,
    {
        self.storage.transaction(f)
    }

    // --- grille hebdomadaire ---

    pub fn create_slot(&self, req: NewSlot) -> Result<Slot, SchedError> {
        let opts = self.opts;
        self.write(|r| TimetableScheduler::new(r).with_options(opts).create_slot(req))
    }

    pub fn update_slot(&self, id: &SlotId, patch: SlotPatch) -> Result<Slot, SchedError> {
        let opts = self.opts;
        self.write(|r| TimetableScheduler::new(r).with_options(opts).update_slot(id, patch))
    }

    pub fn delete_slot(&self, id: &SlotId) -> Result<Slot, SchedError> {
        self.write(|r| TimetableScheduler::new(r).delete_slot(id))
    }

    pub fn get_slot(&self, id: &SlotId) -> Result<Slot, SchedError> {
        self.read(|r| TimetableScheduler::new(r).get_slot(id).cloned())
    }

    pub fn list_slots(&self) -> Result<Vec<Slot>, SchedError> {
        self.read(|r| {
            let scheduler = TimetableScheduler::new(r);
            Ok(scheduler.list_slots().into_iter().cloned().collect())
        })
    }

    pub fn list_slots_by_classroom(&self, classroom: &ClassroomId) -> Result<Vec<Slot>, SchedError> {
        self.read(|r| {
            let scheduler = TimetableScheduler::new(r);
            let slots = scheduler.list_slots_by_classroom(classroom)?;
            Ok(slots.into_iter().cloned().collect())
        })
    }

    pub fn list_teachers_authorized_for(
        &self,
        classroom: &ClassroomId,
        subject: &SubjectId,
    ) -> Result<Vec<User>, SchedError> {
        self.read(|r| {
            let scheduler = TimetableScheduler::new(r);
            let teachers = scheduler.list_teachers_authorized_for(classroom, subject)?;
            Ok(teachers.into_iter().cloned().collect())
        })
    }

    // --- remplacements ---

    pub fn save_override(&self, req: OverrideRequest) -> Result<SubstitutionOverride, SchedError> {
        self.write(|r| SubstitutionResolver::new(r).save(req))
    }

    pub fn find_free_teachers(&self, date: NaiveDate, period: u32) -> Result<Vec<User>, SchedError> {
        self.read(|r| {
            let resolver = SubstitutionResolver::new(r);
            let free = resolver.find_free_teachers(date, period)?;
            Ok(free.into_iter().cloned().collect())
        })
    }

    pub fn list_overrides(&self) -> Result<Vec<SubstitutionOverride>, SchedError> {
        self.read(|r| Ok(SubstitutionResolver::new(r).list().to_vec()))
    }

    pub fn substitutions_by_date(&self, date: NaiveDate) -> Result<Vec<SubstitutionOverride>, SchedError> {
        self.read(|r| {
            Ok(SubstitutionResolver::new(r)
                .by_date(date)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    pub fn substitutions_by_substitute(
        &self,
        teacher: &UserId,
    ) -> Result<Vec<SubstitutionOverride>, SchedError> {
        self.read(|r| {
            let resolver = SubstitutionResolver::new(r);
            let found = resolver.by_substitute_teacher(teacher)?;
            Ok(found.into_iter().cloned().collect())
        })
    }

    pub fn delete_override(&self, id: &OverrideId) -> Result<SubstitutionOverride, SchedError> {
        self.write(|r| SubstitutionResolver::new(r).delete(id))
    }

    pub fn sweep_expired(&self, today: NaiveDate) -> Result<usize, SchedError> {
        self.write(|r| Ok(SubstitutionResolver::new(r).sweep_expired(today)))
    }

    // --- calendrier ---

    pub fn generate_calendar(
        &self,
        school: &SchoolId,
        start: NaiveDate,
        end: NaiveDate,
        holidays: &[NaiveDate],
    ) -> Result<GenerateReport, SchedError> {
        self.write(|r| CalendarGenerator::new(r).generate_range(school, start, end, holidays))
    }

    pub fn create_calendar_entry(
        &self,
        school: &SchoolId,
        date: NaiveDate,
        status: DayStatus,
        description: &str,
    ) -> Result<CalendarDay, SchedError> {
        self.write(|r| CalendarGenerator::new(r).create_entry(school, date, status, description))
    }

    pub fn update_calendar_entry(
        &self,
        id: &CalendarDayId,
        patch: CalendarPatch,
    ) -> Result<CalendarDay, SchedError> {
        self.write(|r| CalendarGenerator::new(r).update_entry(id, patch))
    }

    pub fn calendar_by_school(&self, school: &SchoolId) -> Result<Vec<CalendarDay>, SchedError> {
        self.read(|r| {
            let generator = CalendarGenerator::new(r);
            let days = generator.list_by_school(school)?;
            Ok(days.into_iter().cloned().collect())
        })
    }

    pub fn audit(&self) -> Result<Audit, SchedError> {
        self.read(|r| {
            Ok(Audit {
                conflicts: TimetableScheduler::new(r).detect_conflicts(),
                warnings: SubstitutionResolver::new(r).check(),
            })
        })
    }
}
