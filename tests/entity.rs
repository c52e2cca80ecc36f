#[cfg(test)]
mod tests {
    use evalkit::{
        ClientError, ColumnRef, Entity, Passive, PrimaryKeyType, RowLabeled, Value,
        schema::{
            Evaluation, EvaluationResponse, EvaluationUnique, Student, StudentSubject,
            StudentSubjectUnique, StudentUnique,
        },
    };
    use std::sync::Arc;
    use time::macros::datetime;

    #[derive(Entity, Debug, Clone, PartialEq)]
    #[evalkit(name = "course_offering", unique = (Self::code, Self::term))]
    struct Offering {
        #[evalkit(primary_key)]
        _id: i64,
        code: String,
        term: String,
        #[evalkit(name = "seats_left", type = "SMALLINT")]
        seats: i16,
        note: Option<String>,
    }

    fn row(labels: &[&str], values: Vec<Value>) -> RowLabeled {
        let labels: Arc<[String]> = labels.iter().map(|v| v.to_string()).collect();
        RowLabeled::new(labels, values.into_boxed_slice())
    }

    #[test]
    fn metadata() {
        assert_eq!(
            Student::student_id,
            ColumnRef::new("studentID", "Student", "")
        );
        assert_eq!(Student::created_at.name, "createdAt");
        assert_eq!(Student::model_name(), "Student");
        assert!(Student::has_column(&Student::password));
        assert!(!Student::has_column(&Evaluation::comments));

        let id = Student::column_def(&Student::id).expect("Column");
        assert_eq!(id.primary_key, PrimaryKeyType::PrimaryKey);
        assert!(id.auto_increment && id.passive);
        let updated_at = Student::column_def(&Student::updated_at).expect("Column");
        assert!(updated_at.updated_at);
        assert_eq!(updated_at.default, Some("CURRENT_TIMESTAMP"));

        let names: Vec<&str> = StudentSubject::primary_key_def()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, ["studentId", "subjectId"]);
        assert!(
            StudentSubject::columns()[..2]
                .iter()
                .all(|c| c.primary_key == PrimaryKeyType::PartOfPrimaryKey && !c.nullable)
        );
        let unique: Vec<Vec<&str>> = Evaluation::unique_defs()
            .iter()
            .map(|v| v.iter().map(|c| c.name()).collect())
            .collect();
        assert_eq!(unique, [["studentId", "instructorId", "subjectId"]]);
        assert!(
            Evaluation::column_def(&Evaluation::comments)
                .expect("Column")
                .nullable
        );

        assert_eq!(Offering::table_ref().name, "course_offering");
        let names: Vec<&str> = Offering::columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["id", "code", "term", "seats_left", "note"]);
        assert_eq!(Offering::columns()[3].column_type, "SMALLINT");
        assert_eq!(
            OfferingUnique::CodeTerm("CS101".into(), "2025S".into()),
            OfferingUnique::CodeTerm("CS101".into(), "2025S".into())
        );
    }

    #[test]
    fn unique_key() {
        let mut student = Student::new("S-001", "Ada", "hash");
        let error = student.unique_key().expect_err("Not stored");
        assert!(matches!(
            ClientError::of(&error),
            Some(ClientError::Validation(..))
        ));
        student.id = Passive::Set(5);
        assert_eq!(student.unique_key().expect("Stored"), StudentUnique::Id(5));
        assert_eq!(
            StudentSubject::new(1, 2).unique_key().expect("Key"),
            StudentSubjectUnique::StudentIdSubjectId(1, 2)
        );
        let offering = Offering {
            _id: 9,
            code: "CS101".into(),
            term: "2025S".into(),
            seats: 30,
            note: None,
        };
        assert_eq!(offering.unique_key().expect("Key"), OfferingUnique::Id(9));
        let _ = EvaluationUnique::StudentIdInstructorIdSubjectId(1, 2, 3);
    }

    #[test]
    fn row_fields() {
        let student = Student::new("S-001", "Ada", "hash");
        let names: Vec<&str> = student.row_filtered().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["studentID", "name", "password"]);
        let full = student.row_full();
        assert_eq!(full.len(), 6);
        assert!(full[0].1.is_null());

        let stored = Student {
            id: Passive::Set(1),
            created_at: Passive::Set(datetime!(2025-03-01 08:30:00)),
            ..student
        };
        let names: Vec<&str> = stored.row_filtered().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["id", "studentID", "name", "password", "createdAt"]);
    }

    #[test]
    fn from_row() {
        let response = EvaluationResponse::from_row(row(
            &["rating", "questionId", "evaluationId"],
            vec![
                Value::Int64(Some(4)),
                Value::Int64(Some(2)),
                Value::Int64(Some(1)),
            ],
        ))
        .expect("Could not decode the response");
        assert_eq!(response, EvaluationResponse::new(1, 2, 4));

        let student = Student::from_row(row(
            &["id", "studentID", "name", "password", "createdAt"],
            vec![
                Value::Int64(Some(7)),
                Value::Varchar(Some("S-007".into())),
                Value::Varchar(Some("Bond".into())),
                Value::Varchar(Some("hash".into())),
                Value::Varchar(Some("2025-03-01 08:30:00".into())),
            ],
        ))
        .expect("Could not decode the student");
        assert_eq!(student.id, Passive::Set(7));
        assert_eq!(
            student.created_at,
            Passive::Set(datetime!(2025-03-01 08:30:00))
        );
        assert_eq!(student.updated_at, Passive::NotSet);

        let evaluation = Evaluation::from_row(row(
            &["id", "studentId", "instructorId", "subjectId", "comments", "submittedAt"],
            vec![
                Value::Int64(Some(1)),
                Value::Int64(Some(1)),
                Value::Int64(Some(2)),
                Value::Int64(Some(3)),
                Value::Null,
                Value::Varchar(Some("2025-03-01 08:30:00".into())),
            ],
        ))
        .expect("Could not decode the evaluation");
        assert_eq!(evaluation.comments, None);

        assert!(
            EvaluationResponse::from_row(row(
                &["evaluationId", "rating"],
                vec![Value::Int64(Some(1)), Value::Int64(Some(3))],
            ))
            .is_err(),
            "questionId is required"
        );
        assert!(
            EvaluationResponse::from_row(row(
                &["evaluationId", "questionId", "rating"],
                vec![
                    Value::Int64(Some(1)),
                    Value::Int64(Some(2)),
                    Value::Varchar(Some("excellent".into())),
                ],
            ))
            .is_err(),
            "rating is an integer"
        );
    }
}
