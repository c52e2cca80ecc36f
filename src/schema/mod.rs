//! The evaluation schema: people, subjects, their links, the questionnaire and
//! the submitted evaluations.
//!
//! Every model derives [`Entity`](crate::Entity). Relations are loaded on
//! demand through methods taking a [`Scope`](crate::Scope), for example
//! `student.subjects(&mut client).await?`.

mod admin;
mod evaluation;
mod instructor;
mod links;
mod question;
mod student;
mod subject;

pub use admin::*;
pub use evaluation::*;
pub use instructor::*;
pub use links::*;
pub use question::*;
pub use student::*;
pub use subject::*;

use evalkit_core::{AsValue, ClientError, Entity, Executor, Passive, Result};

/// Identifier of a stored record, fails when the record was never read back from the engine.
pub(crate) fn stored<T: AsValue + Copy>(id: &Passive<T>, model: &str) -> Result<T> {
    id.get().copied().ok_or_else(|| {
        ClientError::Validation(format!(
            "The `{}` record has no identifier, it was not stored yet",
            model
        ))
        .into()
    })
}

/// Create the tables that do not exist yet, referenced tables first.
pub async fn push_schema<Exec: Executor>(executor: &mut Exec) -> Result<()> {
    Student::create_table(executor, true).await?;
    Instructor::create_table(executor, true).await?;
    Admin::create_table(executor, true).await?;
    Subject::create_table(executor, true).await?;
    Question::create_table(executor, true).await?;
    StudentSubject::create_table(executor, true).await?;
    InstructorSubject::create_table(executor, true).await?;
    Evaluation::create_table(executor, true).await?;
    EvaluationResponse::create_table(executor, true).await?;
    Ok(())
}

/// Drop every table, referencing tables first.
pub async fn drop_schema<Exec: Executor>(executor: &mut Exec) -> Result<()> {
    EvaluationResponse::drop_table(executor, true).await?;
    Evaluation::drop_table(executor, true).await?;
    InstructorSubject::drop_table(executor, true).await?;
    StudentSubject::drop_table(executor, true).await?;
    Question::drop_table(executor, true).await?;
    Subject::drop_table(executor, true).await?;
    Admin::drop_table(executor, true).await?;
    Instructor::drop_table(executor, true).await?;
    Student::drop_table(executor, true).await?;
    Ok(())
}
