use crate::{assert_error_code, silent_logs};
use evalkit::{
    Client, Connection, FOREIGN_KEY_CONSTRAINT_FAILED, Filterable, Passive, Scope,
    UNIQUE_CONSTRAINT_FAILED, UpdateData,
    schema::{
        Evaluation, EvaluationResponse, EvaluationResponseUnique, EvaluationUnique, Instructor,
        InstructorUnique, Question, QuestionUnique, Student, Subject,
    },
};

/// Records created by [`seed`], identifiers in creation order.
pub(crate) struct Seed {
    pub students: Vec<i32>,
    pub instructors: Vec<i32>,
    pub subjects: Vec<i32>,
    pub questions: Vec<i32>,
    pub evaluations: Vec<i32>,
}

/// Three students evaluating two instructors on the questionnaire.
///
/// | evaluation | student | instructor | ratings (q0, q1, q2) |
/// |------------|---------|------------|----------------------|
/// | 0          | 0       | 0          | 5, 4, 3              |
/// | 1          | 1       | 0          | 4, 4, 2              |
/// | 2          | 2       | 1          | 3, 5, 1              |
pub(crate) async fn seed<C: Connection>(client: &mut Client<C>) -> Seed {
    client
        .reset_schema()
        .await
        .expect("Could not reset the schema");
    let mut seed = Seed {
        students: Vec::new(),
        instructors: Vec::new(),
        subjects: Vec::new(),
        questions: Vec::new(),
        evaluations: Vec::new(),
    };
    for (code, name) in [("S-201", "Eve"), ("S-202", "Finn"), ("S-203", "Gus")] {
        let student = client
            .student()
            .create(&Student::new(code, name, "hash"))
            .await
            .expect("Could not create the student");
        seed.students.push(*student.id.get().expect("Stored"));
    }
    for (code, name) in [("I-201", "Hana"), ("I-202", "Ivan")] {
        let instructor = client
            .instructor()
            .create(&Instructor::new(code, name, "hash"))
            .await
            .expect("Could not create the instructor");
        seed.instructors.push(*instructor.id.get().expect("Stored"));
    }
    let subject = client
        .subject()
        .create(&Subject::new("PH101", "Physics"))
        .await
        .expect("Could not create the subject");
    seed.subjects.push(*subject.id.get().expect("Stored"));
    for (text, category) in [
        ("The lectures were clear", "teaching"),
        ("The material was useful", "content"),
        ("The workload was fair", "content"),
    ] {
        let question = client
            .question()
            .create(&Question::new(text, category))
            .await
            .expect("Could not create the question");
        seed.questions.push(*question.id.get().expect("Stored"));
    }
    let ratings = [(0, 0, [5, 4, 3]), (1, 0, [4, 4, 2]), (2, 1, [3, 5, 1])];
    for (student, instructor, ratings) in ratings {
        let evaluation = client
            .evaluation()
            .create(&Evaluation::new(
                seed.students[student],
                seed.instructors[instructor],
                seed.subjects[0],
            ))
            .await
            .expect("Could not create the evaluation");
        let id = *evaluation.id.get().expect("Stored");
        let responses: Vec<EvaluationResponse> = seed
            .questions
            .iter()
            .zip(ratings)
            .map(|(question, rating)| EvaluationResponse::new(id, *question, rating))
            .collect();
        client
            .evaluation_response()
            .create_many(&responses, false)
            .await
            .expect("Could not create the responses");
        seed.evaluations.push(id);
    }
    seed
}

pub async fn evaluations<C: Connection>(client: &mut Client<C>) {
    let seed = seed(client).await;

    let question = client
        .question()
        .find_unique_or_throw(QuestionUnique::Id(seed.questions[0]))
        .await
        .expect("Could not find the question");
    assert_eq!(question.is_active, Passive::Set(true));
    let question = client
        .question()
        .update(
            QuestionUnique::Id(seed.questions[2]),
            UpdateData::new().set(Question::is_active, false),
        )
        .await
        .expect("Could not deactivate the question");
    assert_eq!(question.is_active, Passive::Set(false));
    assert_eq!(
        client
            .question()
            .count(Question::is_active.equals(true))
            .await
            .expect("Could not count"),
        2
    );

    // One evaluation per student, instructor and subject
    silent_logs! {
        assert_error_code(
            client
                .evaluation()
                .create(&Evaluation::new(
                    seed.students[0],
                    seed.instructors[0],
                    seed.subjects[0],
                ))
                .await,
            UNIQUE_CONSTRAINT_FAILED,
        );
        assert_error_code(
            client
                .evaluation_response()
                .create(&EvaluationResponse::new(seed.evaluations[0], seed.questions[0], 1))
                .await,
            UNIQUE_CONSTRAINT_FAILED,
        );
        assert_error_code(
            client
                .evaluation_response()
                .create(&EvaluationResponse::new(seed.evaluations[0], 9_999, 1))
                .await,
            FOREIGN_KEY_CONSTRAINT_FAILED,
        );
    }

    let evaluation = client
        .evaluation()
        .find_unique_or_throw(EvaluationUnique::StudentIdInstructorIdSubjectId(
            seed.students[1],
            seed.instructors[0],
            seed.subjects[0],
        ))
        .await
        .expect("Could not find the evaluation");
    assert_eq!(evaluation.comments, None);
    assert!(evaluation.submitted_at.is_set());
    let evaluation = client
        .evaluation()
        .update(
            EvaluationUnique::Id(*evaluation.id.get().expect("Stored")),
            UpdateData::new().set(Evaluation::comments, "Great course"),
        )
        .await
        .expect("Could not comment the evaluation");
    assert_eq!(evaluation.comments.as_deref(), Some("Great course"));

    // Details
    let details = evaluation
        .details(client)
        .await
        .expect("Could not load the details");
    assert_eq!(details.student.name, "Finn");
    assert_eq!(details.instructor.name, "Hana");
    assert_eq!(details.subject.code, "PH101");
    let ratings: Vec<(String, i32)> = details
        .responses
        .iter()
        .map(|v| (v.question.text.clone(), v.response.rating))
        .collect();
    assert_eq!(
        ratings,
        [
            ("The lectures were clear".to_string(), 4),
            ("The material was useful".to_string(), 4),
            ("The workload was fair".to_string(), 2),
        ]
    );
    let response = &details.responses[0].response;
    assert_eq!(
        response
            .evaluation(client)
            .await
            .expect("Could not load the evaluation"),
        evaluation
    );
    assert_eq!(
        response
            .question(client)
            .await
            .expect("Could not load the question")
            .id,
        Passive::Set(seed.questions[0])
    );

    // Relations seen from the other side
    let instructor = client
        .instructor()
        .find_unique_or_throw(InstructorUnique::Id(seed.instructors[0]))
        .await
        .expect("Could not find the instructor");
    let students: Vec<i32> = instructor
        .evaluations(client)
        .await
        .expect("Could not load the evaluations")
        .into_iter()
        .map(|v| v.student_id)
        .collect();
    assert_eq!(students, [seed.students[0], seed.students[1]]);
    let question = client
        .question()
        .find_unique_or_throw(QuestionUnique::Id(seed.questions[1]))
        .await
        .expect("Could not find the question");
    let ratings: Vec<i32> = question
        .responses(client)
        .await
        .expect("Could not load the responses")
        .into_iter()
        .map(|v| v.rating)
        .collect();
    assert_eq!(ratings, [4, 4, 5]);

    // Ratings are adjusted in place
    let response = client
        .evaluation_response()
        .update(
            EvaluationResponseUnique::EvaluationIdQuestionId(
                seed.evaluations[2],
                seed.questions[2],
            ),
            UpdateData::new().increment(EvaluationResponse::rating, 1),
        )
        .await
        .expect("Could not adjust the rating");
    assert_eq!(response.rating, 2);

    // Deleting an instructor removes the evaluations and their responses
    client
        .instructor()
        .delete(InstructorUnique::Id(seed.instructors[0]))
        .await
        .expect("Could not delete the instructor");
    assert_eq!(
        client.evaluation().count(()).await.expect("Could not count"),
        1
    );
    assert_eq!(
        client
            .evaluation_response()
            .count(())
            .await
            .expect("Could not count"),
        3
    );
    assert_eq!(
        client
            .evaluation_response()
            .count(EvaluationResponse::evaluation_id.equals(seed.evaluations[0]))
            .await
            .expect("Could not count"),
        0
    );
}
