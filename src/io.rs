use crate::model::{CalendarDay, Registry, Slot, User, UserRole};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::io::Write;
use std::path::Path;

/// Import d'utilisateurs depuis CSV: header `handle,display_name,role`
pub fn import_users_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<User>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        if handle.is_empty() || display.is_empty() {
            bail!("invalid user row (empty)");
        }
        let role = match rec.get(2).map(str::trim) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<UserRole>()
                .with_context(|| format!("invalid role for handle {handle}"))?,
            _ => UserRole::Teacher,
        };
        out.push(User::new(handle, display, role));
    }
    Ok(out)
}

/// Liste de jours fériés: header `date[,label]`, dates `YYYY-MM-DD`.
pub fn import_holidays_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<NaiveDate>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let raw = rec.get(0).context("missing date")?.trim();
        if raw.is_empty() {
            continue;
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {raw}"))?;
        out.push(date);
    }
    out.sort();
    out.dedup();
    Ok(out)
}

/// Export CSV d'une grille: header `id,weekday,period,classroom,subject,teacher_handle`
pub fn write_timetable_csv<W: Write>(out: W, registry: &Registry, slots: &[Slot]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record(["id", "weekday", "period", "classroom", "subject", "teacher_handle"])?;
    let mut period_buf = itoa::Buffer::new();
    for s in slots {
        let classroom = registry
            .find_classroom(&s.classroom)
            .map(|c| c.name.as_str())
            .unwrap_or("");
        let subject = registry
            .find_subject(&s.subject)
            .map(|c| c.name.as_str())
            .unwrap_or("");
        let teacher = s
            .teacher
            .as_ref()
            .and_then(|id| registry.find_user(id).ok())
            .map(|u| u.handle.as_str())
            .unwrap_or("");
        w.write_record([
            s.id.as_str(),
            s.weekday.as_str(),
            period_buf.format(s.period),
            classroom,
            subject,
            teacher,
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_timetable_csv<P: AsRef<Path>>(path: P, registry: &Registry, slots: &[Slot]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_timetable_csv(file, registry, slots)
}

/// Export CSV du calendrier: header `date,status,description`
pub fn write_calendar_csv<W: Write>(out: W, days: &[CalendarDay]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record(["date", "status", "description"])?;
    for d in days {
        let date = d.date.to_string();
        w.write_record([date.as_str(), d.status.as_str(), d.description.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_calendar_csv<P: AsRef<Path>>(path: P, days: &[CalendarDay]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_calendar_csv(file, days)
}
