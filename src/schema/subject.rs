use super::{Evaluation, Instructor, InstructorSubject, Student, StudentSubject, stored};
use crate::{Entity, Scope};
use evalkit_core::{Filterable, FindArgs, Passive, Result, Sortable};
use time::PrimitiveDateTime;

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Subject {
    #[evalkit(primary_key, auto_increment)]
    pub id: Passive<i32>,
    #[evalkit(unique)]
    pub code: String,
    pub name: String,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub created_at: Passive<PrimitiveDateTime>,
    #[evalkit(default = "CURRENT_TIMESTAMP", updated_at)]
    pub updated_at: Passive<PrimitiveDateTime>,
}

impl Subject {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Passive::NotSet,
            code: code.into(),
            name: name.into(),
            created_at: Passive::NotSet,
            updated_at: Passive::NotSet,
        }
    }

    pub async fn enrollments(&self, scope: &mut impl Scope) -> Result<Vec<StudentSubject>> {
        let id = stored(&self.id, "Subject")?;
        scope
            .student_subject()
            .find_many(
                FindArgs::new()
                    .filter(StudentSubject::subject_id.equals(id))
                    .order_by(StudentSubject::student_id.asc()),
            )
            .await
    }

    pub async fn students(&self, scope: &mut impl Scope) -> Result<Vec<Student>> {
        let ids: Vec<i32> = self
            .enrollments(scope)
            .await?
            .into_iter()
            .map(|v| v.student_id)
            .collect();
        scope
            .student()
            .find_many(
                FindArgs::new()
                    .filter(Student::id.in_list(ids))
                    .order_by(Student::id.asc()),
            )
            .await
    }

    pub async fn assignments(&self, scope: &mut impl Scope) -> Result<Vec<InstructorSubject>> {
        let id = stored(&self.id, "Subject")?;
        scope
            .instructor_subject()
            .find_many(
                FindArgs::new()
                    .filter(InstructorSubject::subject_id.equals(id))
                    .order_by(InstructorSubject::instructor_id.asc()),
            )
            .await
    }

    pub async fn instructors(&self, scope: &mut impl Scope) -> Result<Vec<Instructor>> {
        let ids: Vec<i32> = self
            .assignments(scope)
            .await?
            .into_iter()
            .map(|v| v.instructor_id)
            .collect();
        scope
            .instructor()
            .find_many(
                FindArgs::new()
                    .filter(Instructor::id.in_list(ids))
                    .order_by(Instructor::id.asc()),
            )
            .await
    }

    pub async fn evaluations(&self, scope: &mut impl Scope) -> Result<Vec<Evaluation>> {
        let id = stored(&self.id, "Subject")?;
        scope
            .evaluation()
            .find_many(
                FindArgs::new()
                    .filter(Evaluation::subject_id.equals(id))
                    .order_by(Evaluation::id.asc()),
            )
            .await
    }
}
