use crate::error::{EntityKind, SchedError};
use crate::model::{
    Authorization, AuthorizationId, Classroom, ClassroomId, Registry, School, SchoolId, Subject,
    SubjectId, User, UserId,
};
use crate::roster::Roster;
use tracing::debug;

impl Registry {
    pub fn roster(&self) -> Roster<'_> {
        Roster::new(&self.authorizations)
    }

    pub fn add_school(&mut self, name: &str) -> Result<SchoolId, SchedError> {
        let name = non_empty(name, "school name")?;
        let id = SchoolId::random();
        self.schools.push(School {
            id: id.clone(),
            name,
        });
        Ok(id)
    }

    pub fn add_classroom(
        &mut self,
        school: &SchoolId,
        name: &str,
        section: Option<&str>,
    ) -> Result<ClassroomId, SchedError> {
        self.find_school(school)?;
        let name = non_empty(name, "classroom name")?;
        let id = ClassroomId::random();
        self.classrooms.push(Classroom {
            id: id.clone(),
            school: school.clone(),
            name,
            section: section.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned),
        });
        Ok(id)
    }

    pub fn add_subject(&mut self, name: &str) -> Result<SubjectId, SchedError> {
        let name = non_empty(name, "subject name")?;
        let id = SubjectId::random();
        self.subjects.push(Subject {
            id: id.clone(),
            name,
        });
        Ok(id)
    }

    /// Ajoute un utilisateur ; le handle est unique.
    pub fn add_user(&mut self, user: User) -> Result<UserId, SchedError> {
        non_empty(&user.handle, "user handle")?;
        if self.find_user_by_handle(&user.handle).is_some() {
            return Err(SchedError::UniqueViolation("user handle"));
        }
        let id = user.id.clone();
        self.users.push(user);
        Ok(id)
    }

    /// Habilite un enseignant pour (classe, matière). Idempotent.
    pub fn authorize(
        &mut self,
        classroom: &ClassroomId,
        subject: &SubjectId,
        teacher: &UserId,
    ) -> Result<AuthorizationId, SchedError> {
        self.find_classroom(classroom)?;
        self.find_subject(subject)?;
        let user = self.find_user(teacher)?;
        if !user.is_teacher() {
            return Err(SchedError::InvalidInput(format!(
                "user {} is not a teacher",
                user.handle
            )));
        }

        if let Some(existing) = self.authorizations.iter().find(|a| {
            &a.classroom == classroom && &a.subject == subject && &a.teacher == teacher
        }) {
            return Ok(existing.id.clone());
        }

        let id = AuthorizationId::random();
        self.authorizations.push(Authorization {
            id: id.clone(),
            classroom: classroom.clone(),
            subject: subject.clone(),
            teacher: teacher.clone(),
        });
        debug!(authorization = %id, %classroom, %subject, %teacher, "teacher authorized");
        Ok(id)
    }

    /// Retire une habilitation. Les créneaux déjà posés restent en place.
    pub fn revoke_authorization(&mut self, id: &AuthorizationId) -> Result<Authorization, SchedError> {
        let pos = self
            .authorizations
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| SchedError::not_found(EntityKind::Authorization, id))?;
        Ok(self.authorizations.remove(pos))
    }
}

fn non_empty(raw: &str, what: &str) -> Result<String, SchedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SchedError::InvalidInput(format!("{what} cannot be empty")));
    }
    Ok(trimmed.to_owned())
}
