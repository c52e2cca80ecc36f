#[cfg(test)]
mod tests {
    use evalkit::{
        AggregateFn, Aggregate, Condition, Context, Entity, Filterable, FieldUpdate, GenericSqlWriter,
        SqlWriter, Sortable, UniqueWhere, UpdateData, Value, Window,
        schema::{
            Evaluation, EvaluationResponse, EvaluationResponseUnique, Student, StudentSubject,
            StudentUnique,
        },
    };
    use indoc::indoc;

    const WRITER: GenericSqlWriter = GenericSqlWriter;

    fn window<'a>(filter: Option<&'a Condition>) -> Window<'a> {
        Window {
            filter,
            order_by: &[],
            skip: None,
            take: None,
        }
    }

    #[test]
    fn create_tables() {
        let mut out = String::new();
        WRITER.write_create_table::<Student>(&mut out, true);
        assert_eq!(
            out,
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "Student" (
                "id" INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
                "studentID" TEXT NOT NULL UNIQUE,
                "name" TEXT NOT NULL,
                "password" TEXT NOT NULL,
                "createdAt" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                "updatedAt" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                );
            "#}
            .trim()
        );

        let mut out = String::new();
        WRITER.write_create_table::<StudentSubject>(&mut out, false);
        assert_eq!(
            out,
            indoc! {r#"
                CREATE TABLE "StudentSubject" (
                "studentId" INTEGER REFERENCES "Student"("id") ON DELETE CASCADE,
                "subjectId" INTEGER REFERENCES "Subject"("id") ON DELETE CASCADE,
                "assignedAt" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY ("studentId", "subjectId")
                );
            "#}
            .trim()
        );

        let mut out = String::new();
        WRITER.write_create_table::<Evaluation>(&mut out, false);
        assert_eq!(
            out,
            indoc! {r#"
                CREATE TABLE "Evaluation" (
                "id" INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
                "studentId" INTEGER NOT NULL REFERENCES "Student"("id") ON DELETE CASCADE,
                "instructorId" INTEGER NOT NULL REFERENCES "Instructor"("id") ON DELETE CASCADE,
                "subjectId" INTEGER NOT NULL REFERENCES "Subject"("id") ON DELETE CASCADE,
                "comments" TEXT,
                "submittedAt" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE ("studentId", "instructorId", "subjectId")
                );
            "#}
            .trim()
        );

        let mut out = String::new();
        WRITER.write_drop_table::<Evaluation>(&mut out, true);
        assert_eq!(out, r#"DROP TABLE IF EXISTS "Evaluation";"#);
    }

    #[test]
    fn select() {
        let filter = Student::name
            .starts_with("A")
            .and(Student::student_id.in_list(["S-1", "S-2"]).or(Student::id.gt(10)));
        let order_by = [Student::name.asc(), Student::id.desc()];
        let mut out = String::new();
        WRITER.write_select::<Student>(
            &mut out,
            &Window {
                filter: Some(&filter),
                order_by: &order_by,
                skip: Some(1),
                take: Some(2),
            },
        );
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "id", "studentID", "name", "password", "createdAt", "updatedAt"
                FROM "Student"
                WHERE "name" LIKE 'A%' ESCAPE '\' AND ("studentID" IN ('S-1', 'S-2') OR "id" > 10)
                ORDER BY "name" ASC, "id" DESC
                LIMIT 2
                OFFSET 1;
            "#}
            .trim()
        );

        let mut out = String::new();
        let filter = Evaluation::comments
            .is_null()
            .or(Evaluation::comments.contains("50%_off").not());
        WRITER.write_select::<Evaluation>(&mut out, &window(Some(&filter)));
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "id", "studentId", "instructorId", "subjectId", "comments", "submittedAt"
                FROM "Evaluation"
                WHERE "comments" IS NULL OR NOT "comments" LIKE '%50\%\_off%' ESCAPE '\';
            "#}
            .trim()
        );

        let mut out = String::new();
        let nothing = Student::id.in_list(Vec::<i32>::new());
        WRITER.write_select::<Student>(&mut out, &window(Some(&nothing)));
        assert!(out.ends_with("WHERE false;"), "{}", out);
    }

    #[test]
    fn unique_conditions() {
        let mut out = String::new();
        WRITER.write_select::<EvaluationResponse>(
            &mut out,
            &window(Some(
                &EvaluationResponseUnique::EvaluationIdQuestionId(3, 4).condition(),
            )),
        );
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "evaluationId", "questionId", "rating"
                FROM "EvaluationResponse"
                WHERE "evaluationId" = 3 AND "questionId" = 4;
            "#}
            .trim()
        );
        assert_eq!(
            StudentUnique::StudentId("S-9".into()).condition(),
            Student::student_id.equals("S-9")
        );
    }

    #[test]
    fn insert() {
        let rows = [
            Student::new("S-001", "Ada", "hash").row_filtered(),
            Student::new("S-002", "O'Neil", "hash").row_filtered(),
        ];
        let mut out = String::new();
        WRITER.write_insert::<Student>(&mut out, &rows, false, true);
        assert_eq!(
            out,
            indoc! {r#"
                INSERT INTO "Student" ("studentID", "name", "password") VALUES
                ('S-001', 'Ada', 'hash'),
                ('S-002', 'O''Neil', 'hash')
                RETURNING "id", "studentID", "name", "password", "createdAt", "updatedAt";
            "#}
            .trim()
        );

        let rows = [EvaluationResponse::new(1, 2, 5).row_filtered()];
        let mut out = String::new();
        WRITER.write_insert::<EvaluationResponse>(&mut out, &rows, true, false);
        assert_eq!(
            out,
            indoc! {r#"
                INSERT INTO "EvaluationResponse" ("evaluationId", "questionId", "rating") VALUES
                (1, 2, 5)
                ON CONFLICT DO NOTHING;
            "#}
            .trim()
        );
    }

    #[test]
    fn update_and_delete() {
        let data = UpdateData::new()
            .increment(EvaluationResponse::rating, 1)
            .with(EvaluationResponse::question_id, FieldUpdate::Set(7.into()));
        let mut out = String::new();
        WRITER.write_update::<EvaluationResponse>(
            &mut out,
            &data,
            &EvaluationResponseUnique::EvaluationIdQuestionId(3, 4).condition(),
            true,
        );
        assert_eq!(
            out,
            indoc! {r#"
                UPDATE "EvaluationResponse" SET
                "rating" = "rating" + 1,
                "questionId" = 7
                WHERE "evaluationId" = 3 AND "questionId" = 4
                RETURNING "evaluationId", "questionId", "rating";
            "#}
            .trim()
        );

        let mut out = String::new();
        WRITER.write_delete::<Student>(&mut out, &Student::student_id.equals("S-001"), false);
        assert_eq!(
            out,
            indoc! {r#"
                DELETE FROM "Student"
                WHERE "studentID" = 'S-001';
            "#}
            .trim()
        );
    }

    #[test]
    fn count_and_aggregates() {
        let filter = Student::name.contains("50%");
        let order_by = [Student::id.desc()];
        let mut out = String::new();
        WRITER.write_count::<Student>(
            &mut out,
            &Window {
                filter: Some(&filter),
                order_by: &order_by,
                skip: Some(5),
                take: Some(10),
            },
        );
        assert_eq!(
            out,
            indoc! {r#"
                SELECT COUNT(*) AS "_count"
                FROM (SELECT * FROM "Student"
                WHERE "name" LIKE '%50\%%' ESCAPE '\'
                ORDER BY "id" DESC
                LIMIT 10
                OFFSET 5) AS "Student";
            "#}
            .trim()
        );

        let functions: [AggregateFn; 3] = [
            Aggregate::count_all(),
            Aggregate::avg(EvaluationResponse::rating),
            Aggregate::max(EvaluationResponse::rating),
        ];
        let filter = EvaluationResponse::question_id.in_list([1, 2]);
        let mut out = String::new();
        WRITER.write_aggregate::<EvaluationResponse>(&mut out, &functions, &window(Some(&filter)));
        assert_eq!(
            out,
            indoc! {r#"
                SELECT COUNT(*) AS "_count._all", AVG("rating") AS "_avg.rating", MAX("rating") AS "_max.rating"
                FROM "EvaluationResponse"
                WHERE "questionId" IN (1, 2);
            "#}
            .trim()
        );

        let having = Aggregate::avg(EvaluationResponse::rating).gte(3);
        let order_by = [Aggregate::count_all().desc()];
        let mut out = String::new();
        WRITER.write_group_by::<EvaluationResponse>(
            &mut out,
            &[EvaluationResponse::question_id],
            &functions[..2],
            Some(&having),
            &Window {
                filter: None,
                order_by: &order_by,
                skip: None,
                take: Some(3),
            },
        );
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "questionId", COUNT(*) AS "_count._all", AVG("rating") AS "_avg.rating"
                FROM "EvaluationResponse"
                GROUP BY "questionId"
                HAVING AVG("rating") >= 3
                ORDER BY COUNT(*) DESC
                LIMIT 3;
            "#}
            .trim()
        );
    }

    #[test]
    fn transactions() {
        let mut out = String::new();
        WRITER.write_transaction_begin(&mut out, Some(evalkit::IsolationLevel::RepeatableRead));
        assert_eq!(out, "BEGIN ISOLATION LEVEL REPEATABLE READ;");
        out.clear();
        WRITER.write_transaction_commit(&mut out);
        assert_eq!(out, "COMMIT;");
    }

    #[test]
    fn float_literals() {
        let mut context = Context::default();
        let mut out = String::new();
        WRITER.write_value(&mut context, &mut out, &Value::Float64(Some(2.5)));
        assert_eq!(out, "2.5");
        out.clear();
        WRITER.write_value(&mut context, &mut out, &Value::Float64(Some(f64::INFINITY)));
        assert_eq!(out, "NULL");
        out.clear();
        WRITER.write_value(&mut context, &mut out, &Value::Float32(Some(f32::NAN)));
        assert_eq!(out, "NULL");
    }
}
