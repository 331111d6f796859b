use crate::error::SchedError;
use crate::model::{CalendarDay, CalendarDayId, DayStatus, Registry, SchoolId};
use anyhow::Context;
use chrono::{Datelike, NaiveDate, Weekday as ChronoWeekday};
use std::ops::{Deref, DerefMut};
use tracing::info;

pub const HOLIDAY_DESCRIPTION: &str = "Holiday";
pub const WORKING_DESCRIPTION: &str = "Working Day";

/// Bilan d'une génération de calendrier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub created: usize,
    pub skipped: usize,
}

/// Modification partielle d'une journée du calendrier.
#[derive(Debug, Clone, Default)]
pub struct CalendarPatch {
    pub status: Option<DayStatus>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct CalendarGenerator<R> {
    registry: R,
}

impl<R: Deref<Target = Registry>> CalendarGenerator<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn list_by_school(&self, school: &SchoolId) -> Result<Vec<&CalendarDay>, SchedError> {
        self.registry.find_school(school)?;
        Ok(self
            .registry
            .calendar()
            .iter()
            .filter(|d| &d.school == school)
            .collect())
    }

    pub fn day(&self, school: &SchoolId, date: NaiveDate) -> Option<&CalendarDay> {
        self.registry
            .calendar()
            .iter()
            .find(|d| &d.school == school && d.date == date)
    }
}

impl<R: DerefMut<Target = Registry>> CalendarGenerator<R> {
    /// Remplit le calendrier de `start` à `end` inclus.
    ///
    /// Les jours déjà présents sont laissés tels quels ; dimanches et jours de
    /// `holidays` sont fériés, le reste ouvré. `start > end` ne produit rien.
    pub fn generate_range(
        &mut self,
        school: &SchoolId,
        start: NaiveDate,
        end: NaiveDate,
        holidays: &[NaiveDate],
    ) -> Result<GenerateReport, SchedError> {
        self.registry.find_school(school)?;

        let mut report = GenerateReport::default();
        let mut current = start;

        while current <= end {
            if self.registry.has_calendar_day(school, current) {
                report.skipped += 1;
            } else {
                let (status, description) = classify(current, holidays);
                self.registry.insert_calendar_day(CalendarDay {
                    id: CalendarDayId::random(),
                    school: school.clone(),
                    date: current,
                    status,
                    description: description.to_string(),
                })?;
                report.created += 1;
            }
            if current == end {
                break;
            }
            current = current.succ_opt().context("date overflow")?;
        }

        info!(%school, %start, %end, created = report.created, skipped = report.skipped, "calendar generated");
        Ok(report)
    }

    /// Insertion directe ; un doublon (école, date) est refusé par le stockage.
    pub fn create_entry(
        &mut self,
        school: &SchoolId,
        date: NaiveDate,
        status: DayStatus,
        description: &str,
    ) -> Result<CalendarDay, SchedError> {
        self.registry.find_school(school)?;
        let day = CalendarDay {
            id: CalendarDayId::random(),
            school: school.clone(),
            date,
            status,
            description: description.to_string(),
        };
        self.registry.insert_calendar_day(day.clone())?;
        Ok(day)
    }

    pub fn update_entry(
        &mut self,
        id: &CalendarDayId,
        patch: CalendarPatch,
    ) -> Result<CalendarDay, SchedError> {
        let mut day = self.registry.find_calendar_day(id)?.clone();
        if let Some(status) = patch.status {
            day.status = status;
        }
        if let Some(description) = patch.description {
            day.description = description;
        }
        if let Some(date) = patch.date {
            day.date = date;
        }
        self.registry.replace_calendar_day(day.clone())?;
        Ok(day)
    }
}

fn classify(date: NaiveDate, holidays: &[NaiveDate]) -> (DayStatus, &'static str) {
    if date.weekday() == ChronoWeekday::Sun || holidays.contains(&date) {
        (DayStatus::Holiday, HOLIDAY_DESCRIPTION)
    } else {
        (DayStatus::Working, WORKING_DESCRIPTION)
    }
}
