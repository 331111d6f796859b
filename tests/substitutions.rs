#![forbid(unsafe_code)]
mod common;

use common::{date, fixture, Fixture};
use horaire::model::{OverrideId, Slot, UserId};
use horaire::{
    NewSlot, OverrideRequest, OverrideWarningKind, SchedError, SubstitutionResolver,
    TimetableScheduler, Weekday,
};

fn wednesday_slot(f: &mut Fixture, teacher: &UserId, period: u32) -> Slot {
    TimetableScheduler::new(&mut f.registry)
        .create_slot(NewSlot {
            classroom: f.c1.clone(),
            subject: f.math.clone(),
            teacher: Some(teacher.clone()),
            weekday: Weekday::Wed,
            period,
        })
        .unwrap()
}

fn request(slot: &Slot, day: chrono::NaiveDate, original: &UserId, substitute: &UserId) -> OverrideRequest {
    OverrideRequest {
        id: None,
        slot: slot.id.clone(),
        date: day,
        original_teacher: original.clone(),
        substitute_teacher: substitute.clone(),
        reason: "sick leave".to_string(),
    }
}

fn handles(users: &[&horaire::User]) -> Vec<String> {
    users.iter().map(|u| u.handle.clone()).collect()
}

#[test]
fn teacher_busy_in_grid_is_not_free() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    wednesday_slot(&mut f, &t1, 3);

    let resolver = SubstitutionResolver::new(&f.registry);
    // 2024-01-03 est un mercredi
    let free = resolver.find_free_teachers(date(2024, 1, 3), 3).unwrap();
    assert_eq!(handles(&free), vec!["t2", "t3"]);

    // autre heure, autre jour : tout le monde est libre
    let free = resolver.find_free_teachers(date(2024, 1, 3), 4).unwrap();
    assert_eq!(handles(&free), vec!["t1", "t2", "t3"]);
    let free = resolver.find_free_teachers(date(2024, 1, 4), 3).unwrap();
    assert_eq!(free.len(), 3);
}

#[test]
fn substitute_already_sent_is_not_free() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    let slot = wednesday_slot(&mut f, &t1, 3);

    let mut resolver = SubstitutionResolver::new(&mut f.registry);
    resolver
        .save(request(&slot, date(2024, 1, 3), &f.t1, &f.t3))
        .unwrap();

    let free = resolver.find_free_teachers(date(2024, 1, 3), 3).unwrap();
    // t1 reste occupé par la grille, t3 par le remplacement
    assert_eq!(handles(&free), vec!["t2"]);

    // le remplacement ne vaut que pour sa date
    let free = resolver.find_free_teachers(date(2024, 1, 10), 3).unwrap();
    assert_eq!(handles(&free), vec!["t2", "t3"]);
}

#[test]
fn sunday_has_no_grid_and_period_zero_is_invalid() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    wednesday_slot(&mut f, &t1, 1);

    let resolver = SubstitutionResolver::new(&f.registry);
    assert_eq!(resolver.find_free_teachers(date(2024, 1, 7), 1).unwrap().len(), 3);
    assert!(matches!(
        resolver.find_free_teachers(date(2024, 1, 3), 0),
        Err(SchedError::InvalidInput(_))
    ));
}

#[test]
fn save_validates_references_and_updates_in_place() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    let slot = wednesday_slot(&mut f, &t1, 2);

    let mut resolver = SubstitutionResolver::new(&mut f.registry);
    let missing = resolver.save(request(&slot, date(2024, 1, 3), &f.t1, &UserId::new("ghost")));
    assert!(matches!(missing, Err(SchedError::NotFound { .. })));

    let saved = resolver
        .save(request(&slot, date(2024, 1, 3), &f.t1, &f.t2))
        .unwrap();

    let mut update = request(&slot, date(2024, 1, 3), &f.t1, &f.t3);
    update.id = Some(saved.id.clone());
    update.reason = "training".to_string();
    resolver.save(update).unwrap();

    assert_eq!(resolver.list().len(), 1);
    assert_eq!(resolver.list()[0].substitute_teacher, f.t3);
    assert_eq!(resolver.list()[0].reason, "training");

    let mut unknown = request(&slot, date(2024, 1, 3), &f.t1, &f.t3);
    unknown.id = Some(OverrideId::new("nope"));
    assert!(matches!(resolver.save(unknown), Err(SchedError::NotFound { .. })));
}

#[test]
fn filters_by_date_and_substitute() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    let slot = wednesday_slot(&mut f, &t1, 2);

    let mut resolver = SubstitutionResolver::new(&mut f.registry);
    resolver.save(request(&slot, date(2024, 1, 3), &f.t1, &f.t2)).unwrap();
    resolver.save(request(&slot, date(2024, 1, 10), &f.t1, &f.t3)).unwrap();

    assert_eq!(resolver.by_date(date(2024, 1, 10)).len(), 1);
    assert_eq!(resolver.by_substitute_teacher(&f.t2).unwrap().len(), 1);
    assert!(resolver.by_substitute_teacher(&f.t1).unwrap().is_empty());
    assert!(matches!(
        resolver.by_substitute_teacher(&UserId::new("ghost")),
        Err(SchedError::NotFound { .. })
    ));
}

#[test]
fn sweep_keeps_today_and_future() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    let slot = wednesday_slot(&mut f, &t1, 2);
    let today = date(2024, 3, 13);

    let mut resolver = SubstitutionResolver::new(&mut f.registry);
    resolver.save(request(&slot, date(2024, 3, 12), &f.t1, &f.t2)).unwrap();
    let kept_today = resolver.save(request(&slot, today, &f.t1, &f.t2)).unwrap();
    let tomorrow = resolver.save(request(&slot, date(2024, 3, 14), &f.t1, &f.t3)).unwrap();

    assert_eq!(resolver.sweep_expired(today), 1);
    let left: Vec<_> = resolver.list().iter().map(|o| o.id.clone()).collect();
    assert_eq!(left, vec![kept_today.id, tomorrow.id]);

    // idempotent
    assert_eq!(resolver.sweep_expired(today), 0);
}

#[test]
fn delete_override_and_cascade_from_slot() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    let slot = wednesday_slot(&mut f, &t1, 2);

    let mut resolver = SubstitutionResolver::new(&mut f.registry);
    let a = resolver.save(request(&slot, date(2024, 1, 3), &f.t1, &f.t2)).unwrap();
    resolver.save(request(&slot, date(2024, 1, 10), &f.t1, &f.t2)).unwrap();

    resolver.delete(&a.id).unwrap();
    assert!(matches!(resolver.delete(&a.id), Err(SchedError::NotFound { .. })));
    assert_eq!(resolver.list().len(), 1);

    TimetableScheduler::new(&mut f.registry).delete_slot(&slot.id).unwrap();
    assert!(f.registry.overrides().is_empty());
}

#[test]
fn lenient_writes_are_reported_by_check() {
    let mut f = fixture();
    let t1 = f.t1.clone();
    let t2 = f.t2.clone();
    let first = wednesday_slot(&mut f, &t1, 3);
    let second = TimetableScheduler::new(&mut f.registry)
        .create_slot(NewSlot {
            classroom: f.c2.clone(),
            subject: f.math.clone(),
            teacher: Some(t2.clone()),
            weekday: Weekday::Wed,
            period: 3,
        })
        .unwrap();

    let mut resolver = SubstitutionResolver::new(&mut f.registry);
    // deux remplacements envoient t3 à la même heure : accepté à l'écriture
    resolver.save(request(&first, date(2024, 1, 3), &f.t1, &f.t3)).unwrap();
    resolver.save(request(&second, date(2024, 1, 3), &f.t2, &f.t3)).unwrap();
    // un jeudi pour un créneau du mercredi
    resolver.save(request(&first, date(2024, 1, 4), &f.t1, &f.t2)).unwrap();

    let warnings = resolver.check();
    let doubles = warnings
        .iter()
        .filter(|w| w.kind == OverrideWarningKind::SubstituteDoubleBooked)
        .count();
    let mismatches = warnings
        .iter()
        .filter(|w| w.kind == OverrideWarningKind::WeekdayMismatch)
        .count();
    assert_eq!(doubles, 2);
    assert_eq!(mismatches, 1);
    assert_eq!(resolver.list().len(), 3);
}
