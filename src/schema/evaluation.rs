use super::{
    Instructor, InstructorUnique, Question, QuestionUnique, Student, StudentUnique, Subject,
    SubjectUnique, stored,
};
use crate::{Entity, Scope};
use evalkit_core::{ClientError, Filterable, FindArgs, Passive, Result, Sortable};
use time::PrimitiveDateTime;

/// One student's evaluation of one instructor for one subject.
#[derive(Entity, Debug, Clone, PartialEq)]
#[evalkit(unique = (Self::student_id, Self::instructor_id, Self::subject_id))]
pub struct Evaluation {
    #[evalkit(primary_key, auto_increment)]
    pub id: Passive<i32>,
    #[evalkit(references = Student::id, on_delete = "cascade")]
    pub student_id: i32,
    #[evalkit(references = Instructor::id, on_delete = "cascade")]
    pub instructor_id: i32,
    #[evalkit(references = Subject::id, on_delete = "cascade")]
    pub subject_id: i32,
    pub comments: Option<String>,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub submitted_at: Passive<PrimitiveDateTime>,
}

/// Rating given to one question of an evaluation.
#[derive(Entity, Debug, Clone, PartialEq)]
#[evalkit(primary_key = (Self::evaluation_id, Self::question_id))]
pub struct EvaluationResponse {
    #[evalkit(references = Evaluation::id, on_delete = "cascade")]
    pub evaluation_id: i32,
    #[evalkit(references = Question::id, on_delete = "cascade")]
    pub question_id: i32,
    pub rating: i32,
}

/// A response with the question it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDetails {
    pub response: EvaluationResponse,
    pub question: Question,
}

/// An evaluation with every relation loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDetails {
    pub evaluation: Evaluation,
    pub student: Student,
    pub instructor: Instructor,
    pub subject: Subject,
    pub responses: Vec<ResponseDetails>,
}

impl Evaluation {
    pub fn new(student_id: i32, instructor_id: i32, subject_id: i32) -> Self {
        Self {
            id: Passive::NotSet,
            student_id,
            instructor_id,
            subject_id,
            comments: None,
            submitted_at: Passive::NotSet,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub async fn student(&self, scope: &mut impl Scope) -> Result<Student> {
        scope
            .student()
            .find_unique_or_throw(StudentUnique::Id(self.student_id))
            .await
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

    pub async fn responses(&self, scope: &mut impl Scope) -> Result<Vec<EvaluationResponse>> {
        let id = stored(&self.id, "Evaluation")?;
        scope
            .evaluation_response()
            .find_many(
                FindArgs::new()
                    .filter(EvaluationResponse::evaluation_id.equals(id))
                    .order_by(EvaluationResponse::question_id.asc()),
            )
            .await
    }

    /// Loads the student, instructor, subject and the answered questions.
    pub async fn details(&self, scope: &mut impl Scope) -> Result<EvaluationDetails> {
        let student = self.student(scope).await?;
        let instructor = self.instructor(scope).await?;
        let subject = self.subject(scope).await?;
        let responses = self.responses(scope).await?;
        let question_ids: Vec<i32> = responses.iter().map(|v| v.question_id).collect();
        let mut questions = scope
            .question()
            .find_many(Question::id.in_list(question_ids))
            .await?;
        let mut details = Vec::with_capacity(responses.len());
        for response in responses {
            let Some(i) = questions
                .iter()
                .position(|q| q.id.get() == Some(&response.question_id))
            else {
                return Err(ClientError::not_found("Question").into());
            };
            details.push(ResponseDetails {
                response,
                question: questions.swap_remove(i),
            });
        }
        Ok(EvaluationDetails {
            evaluation: self.clone(),
            student,
            instructor,
            subject,
            responses: details,
        })
    }
}

impl EvaluationResponse {
    pub fn new(evaluation_id: i32, question_id: i32, rating: i32) -> Self {
        Self {
            evaluation_id,
            question_id,
            rating,
        }
    }

    pub async fn evaluation(&self, scope: &mut impl Scope) -> Result<Evaluation> {
        scope
            .evaluation()
            .find_unique_or_throw(EvaluationUnique::Id(self.evaluation_id))
            .await
    }

    pub async fn question(&self, scope: &mut impl Scope) -> Result<Question> {
        scope
            .question()
            .find_unique_or_throw(QuestionUnique::Id(self.question_id))
            .await
    }
}
