use crate::error::{EntityKind, SchedError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort d'un établissement
    SchoolId
);
string_id!(
    /// Identifiant fort d'une classe
    ClassroomId
);
string_id!(SubjectId);
string_id!(
    /// Identifiant fort d'un utilisateur (enseignant ou non)
    UserId
);
string_id!(AuthorizationId);
string_id!(
    /// Identifiant fort d'un créneau de l'emploi du temps
    SlotId
);
string_id!(OverrideId);
string_id!(CalendarDayId);

/// Jour de cours (pas de dimanche dans la grille hebdomadaire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// Jour de la grille correspondant à une date ; `None` le dimanche.
    pub fn of_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            chrono::Weekday::Mon => Some(Weekday::Mon),
            chrono::Weekday::Tue => Some(Weekday::Tue),
            chrono::Weekday::Wed => Some(Weekday::Wed),
            chrono::Weekday::Thu => Some(Weekday::Thu),
            chrono::Weekday::Fri => Some(Weekday::Fri),
            chrono::Weekday::Sat => Some(Weekday::Sat),
            chrono::Weekday::Sun => None,
        }
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Mon => chrono::Weekday::Mon,
            Weekday::Tue => chrono::Weekday::Tue,
            Weekday::Wed => chrono::Weekday::Wed,
            Weekday::Thu => chrono::Weekday::Thu,
            Weekday::Fri => chrono::Weekday::Fri,
            Weekday::Sat => chrono::Weekday::Sat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepte "Mon" comme "monday", sans casse
        s.trim()
            .parse::<chrono::Weekday>()
            .ok()
            .and_then(|d| Weekday::ALL.into_iter().find(|w| w.to_chrono() == d))
            .ok_or_else(|| SchedError::InvalidInput(format!("unrecognized weekday: {s}")))
    }
}

/// Statut d'une journée du calendrier scolaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    Working,
    Holiday,
    HalfDay,
}

impl DayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Working => "WORKING",
            DayStatus::Holiday => "HOLIDAY",
            DayStatus::HalfDay => "HALF_DAY",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayStatus {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "WORKING" => Ok(DayStatus::Working),
            "HOLIDAY" => Ok(DayStatus::Holiday),
            "HALF_DAY" => Ok(DayStatus::HalfDay),
            _ => Err(SchedError::InvalidInput(format!("unrecognized day status: {s}"))),
        }
    }
}

/// Rôle d'un utilisateur ; seul `Teacher` enseigne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Student,
    Teacher,
    Principal,
    SchoolAdmin,
    Admin,
}

impl FromStr for UserRole {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(UserRole::Student),
            "TEACHER" => Ok(UserRole::Teacher),
            "PRINCIPAL" => Ok(UserRole::Principal),
            "SCHOOLADMIN" => Ok(UserRole::SchoolAdmin),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(SchedError::InvalidInput(format!("unrecognized role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: ClassroomId,
    pub school: SchoolId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub handle: String,
    pub display_name: String,
    pub role: UserRole,
}

impl User {
    pub fn new<H: Into<String>, D: Into<String>>(handle: H, display_name: D, role: UserRole) -> Self {
        Self {
            id: UserId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            role,
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == UserRole::Teacher
    }
}

/// Entrée du roster : `teacher` peut enseigner `subject` dans `classroom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: AuthorizationId,
    pub classroom: ClassroomId,
    pub subject: SubjectId,
    pub teacher: UserId,
}

/// Cellule de la grille hebdomadaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub classroom: ClassroomId,
    pub subject: SubjectId,
    #[serde(default)]
    pub teacher: Option<UserId>,
    pub weekday: Weekday,
    pub period: u32,
}

impl Slot {
    /// Clé d'unicité (enseignant, jour, heure) ; `None` sans enseignant.
    pub fn booking_key(&self) -> Option<(&UserId, Weekday, u32)> {
        self.teacher.as_ref().map(|t| (t, self.weekday, self.period))
    }
}

/// Remplacement ponctuel d'un enseignant sur un créneau, pour une date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionOverride {
    pub id: OverrideId,
    pub slot: SlotId,
    pub date: NaiveDate,
    pub original_teacher: UserId,
    pub substitute_teacher: UserId,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub id: CalendarDayId,
    pub school: SchoolId,
    pub date: NaiveDate,
    pub status: DayStatus,
    #[serde(default)]
    pub description: String,
}

/// Document complet : référentiel + emploi du temps + remplacements + calendrier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Registry {
    #[serde(default)]
    pub(crate) schools: Vec<School>,
    #[serde(default)]
    pub(crate) classrooms: Vec<Classroom>,
    #[serde(default)]
    pub(crate) subjects: Vec<Subject>,
    #[serde(default)]
    pub(crate) users: Vec<User>,
    #[serde(default)]
    pub(crate) authorizations: Vec<Authorization>,
    #[serde(default)]
    pub(crate) slots: Vec<Slot>,
    #[serde(default)]
    pub(crate) overrides: Vec<SubstitutionOverride>,
    #[serde(default)]
    pub(crate) calendar: Vec<CalendarDay>,
}

impl Registry {
    pub fn find_school(&self, id: &SchoolId) -> Result<&School, SchedError> {
        self.schools
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::School, id))
    }
    pub fn find_classroom(&self, id: &ClassroomId) -> Result<&Classroom, SchedError> {
        self.classrooms
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Classroom, id))
    }
    pub fn find_subject(&self, id: &SubjectId) -> Result<&Subject, SchedError> {
        self.subjects
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Subject, id))
    }
    pub fn find_user(&self, id: &UserId) -> Result<&User, SchedError> {
        self.users
            .iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::User, id))
    }
    pub fn find_user_by_handle<'a>(&'a self, handle: &str) -> Option<&'a User> {
        self.users.iter().find(|u| u.handle == handle)
    }
    pub fn find_slot(&self, id: &SlotId) -> Result<&Slot, SchedError> {
        self.slots
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Slot, id))
    }
    pub fn find_override(&self, id: &OverrideId) -> Result<&SubstitutionOverride, SchedError> {
        self.overrides
            .iter()
            .find(|o| &o.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Override, id))
    }
    pub fn find_calendar_day(&self, id: &CalendarDayId) -> Result<&CalendarDay, SchedError> {
        self.calendar
            .iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::CalendarDay, id))
    }

    pub fn schools(&self) -> &[School] {
        &self.schools
    }
    pub fn classrooms(&self) -> &[Classroom] {
        &self.classrooms
    }
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }
    pub fn users(&self) -> &[User] {
        &self.users
    }
    pub fn authorizations(&self) -> &[Authorization] {
        &self.authorizations
    }
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
    pub fn overrides(&self) -> &[SubstitutionOverride] {
        &self.overrides
    }
    pub fn calendar(&self) -> &[CalendarDay] {
        &self.calendar
    }

    /// Enseignants (rôle `Teacher`) dans l'ordre du registre.
    pub fn teachers(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|u| u.is_teacher())
    }
}
