//! Remplacements datés d'un enseignant sur un créneau.
//!
//! Un remplacement ne modifie jamais la grille hebdomadaire : il ne vaut que
//! pour sa date et disparaît au balayage du lendemain.

use crate::error::SchedError;
use crate::model::{OverrideId, Registry, SlotId, SubstitutionOverride, User, UserId, Weekday};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use tracing::{debug, info, warn};

/// Demande de création (ou de mise à jour si `id` est fourni).
#[derive(Debug, Clone)]
pub struct OverrideRequest {
    pub id: Option<OverrideId>,
    pub slot: SlotId,
    pub date: NaiveDate,
    pub original_teacher: UserId,
    pub substitute_teacher: UserId,
    pub reason: String,
}

/// Incohérences tolérées à l'écriture, signalées après coup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideWarningKind {
    /// La date ne tombe pas le jour du créneau.
    WeekdayMismatch,
    /// Le remplaçant est déjà envoyé ailleurs à la même heure ce jour-là.
    SubstituteDoubleBooked,
    /// Le remplaçant a déjà cours à cette heure dans la grille.
    SubstituteBusyInTimetable,
}

#[derive(Debug, Clone)]
pub struct OverrideWarning {
    pub substitution: OverrideId,
    pub other: Option<OverrideId>,
    pub kind: OverrideWarningKind,
}

#[derive(Debug)]
pub struct SubstitutionResolver<R> {
    registry: R,
}

impl<R: Deref<Target = Registry>> SubstitutionResolver<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Enseignants libres à `date`, heure `period`.
    ///
    /// Occupés : ceux qui ont un créneau ce jour-là à cette heure, et ceux déjà
    /// envoyés en remplacement sur un créneau de cette heure à cette date.
    pub fn find_free_teachers(&self, date: NaiveDate, period: u32) -> Result<Vec<&User>, SchedError> {
        if period == 0 {
            return Err(SchedError::InvalidInput(
                "period number must be positive".to_string(),
            ));
        }

        let busy = self.busy_teachers(date, period);
        Ok(self
            .registry
            .teachers()
            .filter(|t| !busy.contains(&t.id))
            .collect())
    }

    fn busy_teachers(&self, date: NaiveDate, period: u32) -> HashSet<&UserId> {
        let mut busy = HashSet::new();

        // le dimanche, aucun créneau de la grille ne s'applique
        if let Some(weekday) = Weekday::of_date(date) {
            busy.extend(
                self.registry
                    .slots()
                    .iter()
                    .filter(|s| s.weekday == weekday && s.period == period)
                    .filter_map(|s| s.teacher.as_ref()),
            );
        }

        busy.extend(
            self.registry
                .overrides()
                .iter()
                .filter(|o| o.date == date && self.slot_period(&o.slot) == Some(period))
                .map(|o| &o.substitute_teacher),
        );

        busy
    }

    fn slot_period(&self, slot: &SlotId) -> Option<u32> {
        self.registry.find_slot(slot).ok().map(|s| s.period)
    }

    pub fn list(&self) -> &[SubstitutionOverride] {
        self.registry.overrides()
    }

    pub fn by_date(&self, date: NaiveDate) -> Vec<&SubstitutionOverride> {
        self.registry
            .overrides()
            .iter()
            .filter(|o| o.date == date)
            .collect()
    }

    pub fn by_substitute_teacher(
        &self,
        teacher: &UserId,
    ) -> Result<Vec<&SubstitutionOverride>, SchedError> {
        self.registry.find_user(teacher)?;
        Ok(self
            .registry
            .overrides()
            .iter()
            .filter(|o| &o.substitute_teacher == teacher)
            .collect())
    }

    /// Signale les incohérences que l'écriture laisse passer.
    pub fn check(&self) -> Vec<OverrideWarning> {
        self.registry
            .overrides()
            .iter()
            .flat_map(|o| self.check_one(o))
            .collect()
    }

    fn check_one(&self, entry: &SubstitutionOverride) -> Vec<OverrideWarning> {
        let mut out = Vec::new();
        let Ok(slot) = self.registry.find_slot(&entry.slot) else {
            return out;
        };

        if Weekday::of_date(entry.date) != Some(slot.weekday) {
            out.push(OverrideWarning {
                substitution: entry.id.clone(),
                other: None,
                kind: OverrideWarningKind::WeekdayMismatch,
            });
        }

        for other in self.registry.overrides() {
            if other.id != entry.id
                && other.date == entry.date
                && other.substitute_teacher == entry.substitute_teacher
                && self.slot_period(&other.slot) == Some(slot.period)
            {
                out.push(OverrideWarning {
                    substitution: entry.id.clone(),
                    other: Some(other.id.clone()),
                    kind: OverrideWarningKind::SubstituteDoubleBooked,
                });
            }
        }

        let busy_in_grid = Weekday::of_date(entry.date).is_some_and(|weekday| {
            self.registry.slots().iter().any(|s| {
                s.id != slot.id
                    && s.booking_key() == Some((&entry.substitute_teacher, weekday, slot.period))
            })
        });
        if busy_in_grid {
            out.push(OverrideWarning {
                substitution: entry.id.clone(),
                other: None,
                kind: OverrideWarningKind::SubstituteBusyInTimetable,
            });
        }

        out
    }
}

impl<R: DerefMut<Target = Registry>> SubstitutionResolver<R> {
    /// Crée ou met à jour un remplacement. Aucun contrôle de conflit ici :
    /// les incohérences sont seulement journalisées (voir [`Self::check`]).
    pub fn save(&mut self, req: OverrideRequest) -> Result<SubstitutionOverride, SchedError> {
        self.registry.find_slot(&req.slot)?;
        self.registry.find_user(&req.original_teacher)?;
        self.registry.find_user(&req.substitute_teacher)?;

        let id = match req.id {
            Some(id) => {
                self.registry.find_override(&id)?;
                id
            }
            None => OverrideId::random(),
        };

        let entry = SubstitutionOverride {
            id,
            slot: req.slot,
            date: req.date,
            original_teacher: req.original_teacher,
            substitute_teacher: req.substitute_teacher,
            reason: req.reason,
        };

        for w in self.check_one(&entry) {
            warn!(
                substitution = %w.substitution,
                other = ?w.other.as_ref().map(OverrideId::as_str),
                kind = ?w.kind,
                "substitution accepted despite inconsistency"
            );
        }

        self.registry.upsert_override(entry.clone());
        debug!(substitution = %entry.id, date = %entry.date, "substitution saved");
        Ok(entry)
    }

    pub fn delete(&mut self, id: &OverrideId) -> Result<SubstitutionOverride, SchedError> {
        self.registry.remove_override(id)
    }

    /// Supprime les remplacements dont la date est strictement antérieure à `today`.
    pub fn sweep_expired(&mut self, today: NaiveDate) -> usize {
        let removed = self.registry.retain_overrides(|o| o.date >= today);
        info!(%today, removed, "expired substitutions swept");
        removed
    }
}
