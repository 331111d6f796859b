#![forbid(unsafe_code)]
mod common;

use common::{date, fixture};
use horaire::calendar::{HOLIDAY_DESCRIPTION, WORKING_DESCRIPTION};
use horaire::model::{CalendarDay, SchoolId};
use horaire::{CalendarGenerator, CalendarPatch, DayStatus, GenerateReport, SchedError};

#[test]
fn first_week_of_2024_has_one_sunday() {
    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);

    let report = cal
        .generate_range(&f.school, date(2024, 1, 1), date(2024, 1, 7), &[])
        .unwrap();
    assert_eq!(report, GenerateReport { created: 7, skipped: 0 });

    let days = cal.list_by_school(&f.school).unwrap();
    let working = days.iter().filter(|d| d.status == DayStatus::Working).count();
    assert_eq!(working, 6);

    let sunday = cal.day(&f.school, date(2024, 1, 7)).unwrap();
    assert_eq!(sunday.status, DayStatus::Holiday);
    assert_eq!(sunday.description, HOLIDAY_DESCRIPTION);
    let monday = cal.day(&f.school, date(2024, 1, 1)).unwrap();
    assert_eq!(monday.description, WORKING_DESCRIPTION);
}

#[test]
fn regeneration_keeps_manual_edits() {
    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);
    cal.generate_range(&f.school, date(2024, 1, 1), date(2024, 1, 7), &[])
        .unwrap();

    let wednesday = cal.day(&f.school, date(2024, 1, 3)).unwrap().id.clone();
    cal.update_entry(
        &wednesday,
        CalendarPatch {
            status: Some(DayStatus::HalfDay),
            description: Some("Sortie scolaire".to_string()),
            date: None,
        },
    )
    .unwrap();

    let report = cal
        .generate_range(&f.school, date(2024, 1, 1), date(2024, 1, 7), &[])
        .unwrap();
    assert_eq!(report, GenerateReport { created: 0, skipped: 7 });
    assert_eq!(cal.list_by_school(&f.school).unwrap().len(), 7);

    let kept = cal.day(&f.school, date(2024, 1, 3)).unwrap();
    assert_eq!(kept.status, DayStatus::HalfDay);
    assert_eq!(kept.description, "Sortie scolaire");
}

#[test]
fn overlapping_range_only_fills_gaps() {
    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);
    cal.generate_range(&f.school, date(2024, 1, 1), date(2024, 1, 3), &[])
        .unwrap();

    let report = cal
        .generate_range(&f.school, date(2024, 1, 2), date(2024, 1, 5), &[])
        .unwrap();
    assert_eq!(report, GenerateReport { created: 2, skipped: 2 });
}

#[test]
fn listed_holidays_and_degenerate_ranges() {
    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);

    let report = cal
        .generate_range(&f.school, date(2024, 5, 1), date(2024, 5, 1), &[date(2024, 5, 1)])
        .unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(
        cal.day(&f.school, date(2024, 5, 1)).unwrap().status,
        DayStatus::Holiday
    );

    let report = cal
        .generate_range(&f.school, date(2024, 6, 10), date(2024, 6, 1), &[])
        .unwrap();
    assert_eq!(report, GenerateReport::default());
    assert_eq!(cal.list_by_school(&f.school).unwrap().len(), 1);

    assert!(matches!(
        cal.generate_range(&SchoolId::new("nope"), date(2024, 1, 1), date(2024, 1, 2), &[]),
        Err(SchedError::NotFound { .. })
    ));
}

#[test]
fn calendars_are_per_school() {
    let mut f = fixture();
    let other = f.registry.add_school("Collège Pasteur").unwrap();
    let mut cal = CalendarGenerator::new(&mut f.registry);

    cal.generate_range(&f.school, date(2024, 1, 1), date(2024, 1, 2), &[])
        .unwrap();
    let report = cal
        .generate_range(&other, date(2024, 1, 1), date(2024, 1, 2), &[])
        .unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(cal.list_by_school(&other).unwrap().len(), 2);
}

#[test]
fn single_entry_duplicate_is_rejected() {
    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);

    cal.create_entry(&f.school, date(2024, 2, 14), DayStatus::HalfDay, "Conseil de classe")
        .unwrap();
    let err = cal
        .create_entry(&f.school, date(2024, 2, 14), DayStatus::Working, "")
        .unwrap_err();
    assert!(matches!(err, SchedError::UniqueViolation(_)));
    assert_eq!(cal.list_by_school(&f.school).unwrap().len(), 1);
}

#[test]
fn moving_an_entry_onto_another_date_is_rejected() {
    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);
    cal.generate_range(&f.school, date(2024, 1, 1), date(2024, 1, 2), &[])
        .unwrap();
    let first = cal.day(&f.school, date(2024, 1, 1)).unwrap().id.clone();

    let err = cal
        .update_entry(
            &first,
            CalendarPatch {
                date: Some(date(2024, 1, 2)),
                ..CalendarPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, SchedError::UniqueViolation(_)));
    assert_eq!(cal.day(&f.school, date(2024, 1, 1)).unwrap().id, first);
}

#[test]
fn calendar_csv_export() {
    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);
    cal.generate_range(&f.school, date(2024, 1, 5), date(2024, 1, 8), &[])
        .unwrap();

    let days: Vec<CalendarDay> = cal
        .list_by_school(&f.school)
        .unwrap()
        .into_iter()
        .cloned()
        .collect();
    let mut buf = Vec::new();
    horaire::io::write_calendar_csv(&mut buf, &days).unwrap();
    let out = String::from_utf8(buf).unwrap();

    insta::assert_snapshot!(out.trim_end(), @r"
    date,status,description
    2024-01-05,WORKING,Working Day
    2024-01-06,WORKING,Working Day
    2024-01-07,HOLIDAY,Holiday
    2024-01-08,WORKING,Working Day
    ");
}

#[test]
fn holidays_from_csv_feed_generation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feries.csv");
    std::fs::write(&path, "date,label\n2024-05-08,Victoire 1945\n2024-05-01,Fête du travail\n2024-05-01\n").unwrap();

    let holidays = horaire::io::import_holidays_csv(&path).unwrap();
    assert_eq!(holidays, vec![date(2024, 5, 1), date(2024, 5, 8)]);

    let mut f = fixture();
    let mut cal = CalendarGenerator::new(&mut f.registry);
    cal.generate_range(&f.school, date(2024, 5, 1), date(2024, 5, 8), &holidays)
        .unwrap();
    let holiday_count = cal
        .list_by_school(&f.school)
        .unwrap()
        .iter()
        .filter(|d| d.status == DayStatus::Holiday)
        .count();
    // 1er mai, 5 mai (dimanche), 8 mai
    assert_eq!(holiday_count, 3);
}

#[test]
fn users_csv_defaults_to_teacher() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.csv");
    std::fs::write(&path, "handle,display_name,role\nt9,Zoé Blanc,\np1,Paul Noir,PRINCIPAL\n").unwrap();

    let users = horaire::io::import_users_csv(&path).unwrap();
    assert_eq!(users.len(), 2);
    assert!(users[0].is_teacher());
    assert_eq!(users[1].role, horaire::UserRole::Principal);

    std::fs::write(&path, "handle,display_name,role\nx,X,WIZARD\n").unwrap();
    assert!(horaire::io::import_users_csv(&path).is_err());
}
