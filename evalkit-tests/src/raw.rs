use crate::{assert_error_code, silent_logs};
use evalkit::{
    AsValue, Client, ClientError, Connection, Result, Scope, UNIQUE_CONSTRAINT_FAILED, Value,
    schema::{Student, Subject, SubjectUnique},
};
use std::fmt::Debug;

#[track_caller]
fn assert_validation<T: Debug>(result: Result<T>) {
    match result {
        Ok(value) => panic!("Expected a validation error, the operation returned {:?}", value),
        Err(error) => assert!(
            matches!(ClientError::of(&error), Some(ClientError::Validation(..))),
            "Unexpected error: {:#}",
            error
        ),
    }
}

pub async fn raw<C: Connection>(client: &mut Client<C>) {
    client
        .reset_schema()
        .await
        .expect("Could not reset the schema");
    client
        .subject()
        .create_many(
            &[
                Subject::new("BI101", "Biology"),
                Subject::new("BI102", "Genetics"),
                Subject::new("GE101", "Geology"),
            ],
            false,
        )
        .await
        .expect("Could not create the subjects");

    // Parameters are bound in order
    let rows = client
        .query_raw(
            "SELECT code, name FROM \"Subject\" WHERE code LIKE ? ORDER BY code",
            vec!["BI%".into()],
        )
        .await
        .expect("Could not query the subjects");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].names(), ["code", "name"]);
    assert_eq!(rows[0].values[0], Value::Varchar(Some("BI101".into())));
    assert_eq!(
        String::try_from_value(rows[1].values[1].clone()).expect("Text"),
        "Genetics"
    );

    let affected = client
        .execute_raw(
            "UPDATE \"Subject\" SET name = ? WHERE code = ?",
            vec!["Earth Sciences".into(), "GE101".into()],
        )
        .await
        .expect("Could not update the subject");
    assert_eq!(affected, 1);
    let affected = client
        .execute_raw("DELETE FROM \"Subject\" WHERE code = ?", vec!["XX000".into()])
        .await
        .expect("Could not delete nothing");
    assert_eq!(affected, 0);

    // Without parameters several statements may run at once
    let affected = client
        .execute_raw(
            "INSERT INTO \"Subject\" (code, name) VALUES ('MU101', 'Music');
             INSERT INTO \"Subject\" (code, name) VALUES ('MU102', 'Harmony');",
            Vec::new(),
        )
        .await
        .expect("Could not run the script");
    assert_eq!(affected, 2);
    let rows = client
        .query_raw("SELECT COUNT(*) AS total FROM \"Subject\"", Vec::new())
        .await
        .expect("Could not count the subjects");
    assert_eq!(
        i64::try_from_value(rows[0].values[0].clone()).expect("Integer"),
        5
    );
    silent_logs! {
        assert!(
            client
                .execute_raw(
                    "DELETE FROM \"Subject\" WHERE code = ?; DELETE FROM \"Subject\";",
                    vec!["MU101".into()],
                )
                .await
                .is_err(),
            "A statement with parameters must be alone"
        );
        assert!(
            client
                .query_raw("SELECT * FROM missing_table", Vec::new())
                .await
                .is_err()
        );
    }
    assert_eq!(
        client.subject().count(()).await.expect("Could not count"),
        5
    );

    // Every placeholder needs exactly one value
    silent_logs! {
        assert_validation(
            client
                .execute_raw(
                    "UPDATE \"Subject\" SET name = ? WHERE code = ?",
                    vec!["Acoustics".into()],
                )
                .await,
        );
        assert_validation(
            client
                .execute_raw(
                    "UPDATE \"Subject\" SET name = ? WHERE code = ?",
                    vec!["Acoustics".into(), "MU101".into(), "MU102".into()],
                )
                .await,
        );
        assert_validation(
            client
                .query_raw("SELECT * FROM \"Subject\" WHERE code = ?", Vec::new())
                .await,
        );
    }
    let music = client
        .subject()
        .find_unique_or_throw(SubjectUnique::Code("MU101".into()))
        .await
        .expect("Could not read the subject");
    assert_eq!(music.name, "Music");

    // Batches are atomic
    let affected = client
        .batch([
            "INSERT INTO \"Student\" (\"studentID\", name, password) VALUES ('S-401', 'Nia', 'hash')",
            "INSERT INTO \"Student\" (\"studentID\", name, password) VALUES ('S-402', 'Oto', 'hash')",
            "UPDATE \"Student\" SET password = 'changed'",
        ])
        .await
        .expect("Could not run the batch");
    assert_eq!(affected, [1, 1, 2]);
    let result = silent_logs! {
        client
            .batch([
                "DELETE FROM \"Student\" WHERE \"studentID\" = 'S-401'",
                "INSERT INTO \"Student\" (\"studentID\", name, password) VALUES ('S-402', 'Dup', 'hash')",
            ])
            .await
    };
    assert_error_code(result, UNIQUE_CONSTRAINT_FAILED);
    let students = client
        .student()
        .find_many(())
        .await
        .expect("Could not read the students");
    let names: Vec<&str> = students.iter().map(|v: &Student| v.name.as_str()).collect();
    assert_eq!(names, ["Nia", "Oto"]);
    assert!(students.iter().all(|v| v.password == "changed"));
}
