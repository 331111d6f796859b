use crate::model::{Authorization, ClassroomId, SubjectId, UserId};

/// Vue en lecture seule sur les habilitations (classe, matière, enseignant).
#[derive(Debug, Clone, Copy)]
pub struct Roster<'a> {
    entries: &'a [Authorization],
}

impl<'a> Roster<'a> {
    pub fn new(entries: &'a [Authorization]) -> Self {
        Self { entries }
    }

    pub fn is_authorized(
        &self,
        classroom: &ClassroomId,
        subject: &SubjectId,
        teacher: &UserId,
    ) -> bool {
        self.entries
            .iter()
            .any(|a| &a.classroom == classroom && &a.subject == subject && &a.teacher == teacher)
    }

    /// Enseignants habilités, sans doublon, dans l'ordre du roster.
    pub fn teachers_for(&self, classroom: &ClassroomId, subject: &SubjectId) -> Vec<&'a UserId> {
        let mut out: Vec<&'a UserId> = Vec::new();
        for a in self.entries {
            if &a.classroom == classroom && &a.subject == subject && !out.contains(&&a.teacher) {
                out.push(&a.teacher);
            }
        }
        out
    }
}
