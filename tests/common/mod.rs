#![allow(dead_code)]
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use mockable::Clock;
use horaire::model::{ClassroomId, SchoolId, SubjectId, UserId};
use horaire::{Registry, User, UserRole};

/// Petit établissement : deux classes, deux matières, trois enseignants, un élève.
pub struct Fixture {
    pub registry: Registry,
    pub school: SchoolId,
    pub c1: ClassroomId,
    pub c2: ClassroomId,
    pub math: SubjectId,
    pub science: SubjectId,
    pub t1: UserId,
    pub t2: UserId,
    pub t3: UserId,
    pub student: UserId,
}

pub fn fixture() -> Fixture {
    let mut registry = Registry::default();
    let school = registry.add_school("Lycée Voltaire").unwrap();
    let c1 = registry.add_classroom(&school, "C1", Some("A")).unwrap();
    let c2 = registry.add_classroom(&school, "C2", None).unwrap();
    let math = registry.add_subject("Math").unwrap();
    let science = registry.add_subject("Science").unwrap();
    let t1 = registry
        .add_user(User::new("t1", "Alice Martin", UserRole::Teacher))
        .unwrap();
    let t2 = registry
        .add_user(User::new("t2", "Bruno Petit", UserRole::Teacher))
        .unwrap();
    let t3 = registry
        .add_user(User::new("t3", "Chloé Roux", UserRole::Teacher))
        .unwrap();
    let student = registry
        .add_user(User::new("s1", "Eve", UserRole::Student))
        .unwrap();

    registry.authorize(&c1, &math, &t1).unwrap();
    registry.authorize(&c2, &science, &t1).unwrap();
    registry.authorize(&c1, &math, &t2).unwrap();
    registry.authorize(&c2, &math, &t2).unwrap();
    registry.authorize(&c2, &science, &t3).unwrap();

    Fixture {
        registry,
        school,
        c1,
        c2,
        math,
        science,
        t1,
        t2,
        t3,
        student,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Horloge figée sur une heure locale.
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn at(naive: NaiveDateTime) -> Self {
        let local = Local
            .from_local_datetime(&naive)
            .earliest()
            .expect("local time exists");
        Self(local)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}
