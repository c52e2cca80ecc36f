use crate::{evaluations::seed, silent_logs};
use evalkit::{
    Aggregate, AggregateArgs, Client, ClientError, Connection, Filterable, GroupByArgs, Result,
    Scope, Sortable,
    schema::{EvaluationResponse, Question},
};
use std::fmt::Debug;

#[track_caller]
fn assert_validation<T: Debug>(result: Result<T>) {
    match result {
        Ok(value) => panic!("Expected a validation error, got {:?}", value),
        Err(error) => assert!(
            matches!(ClientError::of(&error), Some(ClientError::Validation(..))),
            "Unexpected error: {:#}",
            error
        ),
    }
}

pub async fn aggregates<C: Connection>(client: &mut Client<C>) {
    let seed = seed(client).await;
    let rating = EvaluationResponse::rating;

    let all = client
        .evaluation_response()
        .aggregate(
            AggregateArgs::new()
                .count_all()
                .avg(rating)
                .sum(rating)
                .min(rating)
                .max(rating),
        )
        .await
        .expect("Could not aggregate the ratings");
    assert_eq!(all.count_all(), Some(9));
    assert_eq!(all.sum::<i64>(rating).expect("Sum"), Some(31));
    assert_eq!(all.min::<i32>(rating).expect("Min"), Some(1));
    assert_eq!(all.max::<i32>(rating).expect("Max"), Some(5));
    let avg = all.avg(rating).expect("Average");
    assert!((avg - 31.0 / 9.0).abs() < 1e-9, "Average was {}", avg);

    let first = client
        .evaluation_response()
        .aggregate(
            AggregateArgs::new()
                .avg(rating)
                .count(rating)
                .filter(EvaluationResponse::evaluation_id.equals(seed.evaluations[0])),
        )
        .await
        .expect("Could not aggregate the first evaluation");
    assert_eq!(first.avg(rating), Some(4.0));
    assert_eq!(first.count(rating), Some(3));
    assert_eq!(first.count_all(), None, "Not selected");

    let top = client
        .evaluation_response()
        .aggregate(
            AggregateArgs::new()
                .sum(rating)
                .order_by(rating.desc())
                .take(3),
        )
        .await
        .expect("Could not aggregate the top ratings");
    assert_eq!(top.sum::<i64>(rating).expect("Sum"), Some(14));

    let empty = client
        .evaluation_response()
        .aggregate(
            AggregateArgs::new()
                .avg(rating)
                .count_all()
                .filter(rating.gt(5)),
        )
        .await
        .expect("Could not aggregate nothing");
    assert_eq!(empty.avg(rating), None);
    assert_eq!(empty.count_all(), Some(0));

    // Per question
    let groups = client
        .evaluation_response()
        .group_by(
            GroupByArgs::new([EvaluationResponse::question_id])
                .count_all()
                .avg(rating)
                .min(rating)
                .having(Aggregate::avg(rating).gte(3))
                .order_by(EvaluationResponse::question_id.asc()),
        )
        .await
        .expect("Could not group the ratings");
    let summary: Vec<(i32, Option<u64>, Option<i32>)> = groups
        .iter()
        .map(|v| {
            (
                v.get::<i32>(EvaluationResponse::question_id)
                    .expect("Grouped column"),
                v.aggregates.count_all(),
                v.aggregates.min::<i32>(rating).expect("Min"),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [
            (seed.questions[0], Some(3), Some(3)),
            (seed.questions[1], Some(3), Some(4)),
        ]
    );

    let best = client
        .evaluation_response()
        .group_by(
            GroupByArgs::new([EvaluationResponse::evaluation_id])
                .sum(rating)
                .order_by(Aggregate::sum(rating).desc())
                .take(1),
        )
        .await
        .expect("Could not find the best evaluation");
    assert_eq!(best.len(), 1);
    assert_eq!(
        best[0]
            .get::<i32>(EvaluationResponse::evaluation_id)
            .expect("Grouped column"),
        seed.evaluations[0]
    );
    assert_eq!(
        best[0].aggregates.sum::<i64>(rating).expect("Sum"),
        Some(12)
    );

    let categories = client
        .question()
        .group_by(GroupByArgs::new([Question::category]).count_all().order_by(Question::category.asc()))
        .await
        .expect("Could not group the questions");
    let categories: Vec<(String, Option<u64>)> = categories
        .iter()
        .map(|v| {
            (
                v.get::<String>(Question::category).expect("Grouped column"),
                v.aggregates.count_all(),
            )
        })
        .collect();
    assert_eq!(
        categories,
        [
            ("content".to_string(), Some(2)),
            ("teaching".to_string(), Some(1)),
        ]
    );

    // Invalid requests
    silent_logs! {
        assert_validation(
            client
                .evaluation_response()
                .aggregate(AggregateArgs::new())
                .await,
        );
        assert_validation(
            client
                .question()
                .aggregate(AggregateArgs::new().avg(Question::text))
                .await,
        );
        assert_validation(
            client
                .evaluation_response()
                .aggregate(AggregateArgs::new().max(Question::text))
                .await,
        );
        assert_validation(
            client
                .evaluation_response()
                .group_by(GroupByArgs::new([EvaluationResponse::question_id]).take(1))
                .await,
        );
        assert_validation(
            client
                .evaluation_response()
                .group_by(
                    GroupByArgs::new([EvaluationResponse::question_id])
                        .order_by(EvaluationResponse::evaluation_id.asc()),
                )
                .await,
        );
        assert_validation(
            client
                .evaluation_response()
                .group_by(GroupByArgs::new([]))
                .await,
        );
    }
}
