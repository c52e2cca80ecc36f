use super::{Evaluation, InstructorSubject, Subject, stored};
use crate::{Entity, Scope};
use evalkit_core::{Filterable, FindArgs, Passive, Result, Sortable};
use time::PrimitiveDateTime;

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Instructor {
    #[evalkit(primary_key, auto_increment)]
    pub id: Passive<i32>,
    #[evalkit(name = "instructorID", unique)]
    pub instructor_id: String,
    pub name: String,
    pub password: String,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub created_at: Passive<PrimitiveDateTime>,
    #[evalkit(default = "CURRENT_TIMESTAMP", updated_at)]
    pub updated_at: Passive<PrimitiveDateTime>,
}

impl Instructor {
    pub fn new(
        instructor_id: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: Passive::NotSet,
            instructor_id: instructor_id.into(),
            name: name.into(),
            password: password.into(),
            created_at: Passive::NotSet,
            updated_at: Passive::NotSet,
        }
    }

    pub async fn assignments(&self, scope: &mut impl Scope) -> Result<Vec<InstructorSubject>> {
        let id = stored(&self.id, "Instructor")?;
        scope
            .instructor_subject()
            .find_many(
                FindArgs::new()
                    .filter(InstructorSubject::instructor_id.equals(id))
                    .order_by(InstructorSubject::subject_id.asc()),
            )
            .await
    }

    /// Subjects the instructor teaches.
    pub async fn subjects(&self, scope: &mut impl Scope) -> Result<Vec<Subject>> {
        let ids: Vec<i32> = self
            .assignments(scope)
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

    /// Evaluations received by the instructor.
    pub async fn evaluations(&self, scope: &mut impl Scope) -> Result<Vec<Evaluation>> {
        let id = stored(&self.id, "Instructor")?;
        scope
            .evaluation()
            .find_many(
                FindArgs::new()
                    .filter(Evaluation::instructor_id.equals(id))
                    .order_by(Evaluation::id.asc()),
            )
            .await
    }
}
