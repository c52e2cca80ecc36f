use super::{Evaluation, StudentSubject, Subject, stored};
use crate::{Entity, Scope};
use evalkit_core::{Filterable, FindArgs, Passive, Result, Sortable};
use time::PrimitiveDateTime;

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Student {
    #[evalkit(primary_key, auto_increment)]
    pub id: Passive<i32>,
    /// External identifier, for example the enrollment number.
    #[evalkit(name = "studentID", unique)]
    pub student_id: String,
    pub name: String,
    /// Password hash.
    pub password: String,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub created_at: Passive<PrimitiveDateTime>,
    #[evalkit(default = "CURRENT_TIMESTAMP", updated_at)]
    pub updated_at: Passive<PrimitiveDateTime>,
}

impl Student {
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: Passive::NotSet,
            student_id: student_id.into(),
            name: name.into(),
            password: password.into(),
            created_at: Passive::NotSet,
            updated_at: Passive::NotSet,
        }
    }

    pub async fn enrollments(&self, scope: &mut impl Scope) -> Result<Vec<StudentSubject>> {
        let id = stored(&self.id, "Student")?;
        scope
            .student_subject()
            .find_many(
                FindArgs::new()
                    .filter(StudentSubject::student_id.equals(id))
                    .order_by(StudentSubject::subject_id.asc()),
            )
            .await
    }

    /// Subjects the student is enrolled in.
    pub async fn subjects(&self, scope: &mut impl Scope) -> Result<Vec<Subject>> {
        let ids: Vec<i32> = self
            .enrollments(scope)
            .await?
            .into_iter()
            .map(|v| v.subject_id)
            .collect();
        scope
            .subject()
            .find_many(
                FindArgs::new()
                    .filter(Subject::id.in_list(ids))
                    .order_by(Subject::id.asc()),
            )
            .await
    }

    pub async fn evaluations(&self, scope: &mut impl Scope) -> Result<Vec<Evaluation>> {
        let id = stored(&self.id, "Student")?;
        scope
            .evaluation()
            .find_many(
                FindArgs::new()
                    .filter(Evaluation::student_id.equals(id))
                    .order_by(Evaluation::id.asc()),
            )
            .await
    }
}
