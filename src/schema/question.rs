use super::{EvaluationResponse, stored};
use crate::{Entity, Scope};
use evalkit_core::{Filterable, FindArgs, Passive, Result, Sortable};
use time::PrimitiveDateTime;

/// Item of the evaluation questionnaire.
#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Question {
    #[evalkit(primary_key, auto_increment)]
    pub id: Passive<i32>,
    pub text: String,
    pub category: String,
    /// Inactive questions are kept for the responses already given.
    #[evalkit(default = "TRUE")]
    pub is_active: Passive<bool>,
    #[evalkit(default = "CURRENT_TIMESTAMP")]
    pub created_at: Passive<PrimitiveDateTime>,
    #[evalkit(default = "CURRENT_TIMESTAMP", updated_at)]
    pub updated_at: Passive<PrimitiveDateTime>,
}

impl Question {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Passive::NotSet,
            text: text.into(),
            category: category.into(),
            is_active: Passive::NotSet,
            created_at: Passive::NotSet,
            updated_at: Passive::NotSet,
        }
    }

    pub async fn responses(&self, scope: &mut impl Scope) -> Result<Vec<EvaluationResponse>> {
        let id = stored(&self.id, "Question")?;
        scope
            .evaluation_response()
            .find_many(
                FindArgs::new()
                    .filter(EvaluationResponse::question_id.equals(id))
                    .order_by(EvaluationResponse::evaluation_id.asc()),
            )
            .await
    }
}
