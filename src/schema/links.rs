use super::{Instructor, InstructorUnique, Student, StudentUnique, Subject, SubjectUnique};
use crate::{Entity, Scope};
use evalkit_core::{Passive, Result};
use time::PrimitiveDateTime;

/// Enrollment of a student in a subject.
#[derive(Entity, Debug, Clone, PartialEq)]
#[evalkit(primary_key = (Self::student_id, Self::subject_id))]
pub struct StudentSubject {
    #[evalkit(references = Student::id, on_delete = "cascade")]
    pub student_id: i32,
    #[evalkit(references = Subject::id, on_delete = "cascade")]
    pub subject_id: i32,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub assigned_at: Passive<PrimitiveDateTime>,
}

impl StudentSubject {
    pub fn new(student_id: i32, subject_id: i32) -> Self {
        Self {
            student_id,
            subject_id,
            assigned_at: Passive::NotSet,
        }
    }

    pub async fn student(&self, scope: &mut impl Scope) -> Result<Student> {
        scope
            .student()
            .find_unique_or_throw(StudentUnique::Id(self.student_id))
            .await
    }

    pub async fn subject(&self, scope: &mut impl Scope) -> Result<Subject> {
        scope
            .subject()
            .find_unique_or_throw(SubjectUnique::Id(self.subject_id))
            .await
    }
}

/// Assignment of an instructor to a subject.
#[derive(Entity, Debug, Clone, PartialEq)]
#[evalkit(primary_key = (Self::instructor_id, Self::subject_id))]
pub struct InstructorSubject {
    #[evalkit(references = Instructor::id, on_delete = "cascade")]
    pub instructor_id: i32,
    #[evalkit(references = Subject::id, on_delete = "cascade")]
    pub subject_id: i32,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub assigned_at: Passive<PrimitiveDateTime>,
}

impl InstructorSubject {
    pub fn new(instructor_id: i32, subject_id: i32) -> Self {
        Self {
            instructor_id,
            subject_id,
            assigned_at: Passive::NotSet,
        }
    }

    pub async fn instructor(&self, scope: &mut impl Scope) -> Result<Instructor> {
        scope
            .instructor()
            .find_unique_or_throw(InstructorUnique::Id(self.instructor_id))
            .await
    }

    pub async fn subject(&self, scope: &mut impl Scope) -> Result<Subject> {
        scope
            .subject()
            .find_unique_or_throw(SubjectUnique::Id(self.subject_id))
            .await
    }
}
