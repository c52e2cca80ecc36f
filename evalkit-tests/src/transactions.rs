use crate::{assert_error_code, silent_logs};
use evalkit::{
    Client, Connection, Delegate, Error, Scope, TRANSACTION_API_ERROR, Transaction,
    TransactionOptions, UNIQUE_CONSTRAINT_FAILED, UpdateData,
    future::FutureExt,
    schema::{Student, StudentSubject, StudentUnique, Subject},
};
use std::time::{Duration, Instant};
use tokio::time::sleep;

pub async fn transactions<C: Connection>(client: &mut Client<C>) {
    client
        .reset_schema()
        .await
        .expect("Could not reset the schema");

    // Commit
    let enrolled = client
        .transaction(None, |tx| {
            async move {
                let student = tx
                    .student()
                    .create(&Student::new("S-301", "Jo", "hash"))
                    .await?;
                let subject = tx
                    .subject()
                    .create(&Subject::new("CH101", "Chemistry"))
                    .await?;
                let (Some(student_id), Some(subject_id)) = (student.id.get(), subject.id.get())
                else {
                    return Err(Error::msg("The engine did not return the identifiers"));
                };
                tx.student_subject()
                    .create(&StudentSubject::new(*student_id, *subject_id))
                    .await?;
                student.subjects(tx).await
            }
            .boxed()
        })
        .await
        .expect("The transaction should commit");
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0].code, "CH101");
    assert_eq!(
        client
            .student_subject()
            .count(())
            .await
            .expect("Could not count"),
        1
    );

    // An error rolls everything back
    let result = silent_logs! {
        client
            .transaction(None, |tx| {
                async move {
                    tx.student()
                        .create(&Student::new("S-302", "Kim", "hash"))
                        .await?;
                    tx.student()
                        .create(&Student::new("S-301", "Duplicate", "hash"))
                        .await?;
                    Ok(())
                }
                .boxed()
            })
            .await
    };
    assert_error_code(result, UNIQUE_CONSTRAINT_FAILED);
    assert_eq!(
        client
            .student()
            .find_unique(StudentUnique::StudentId("S-302".into()))
            .await
            .expect("Could not look for the student"),
        None
    );

    let result: evalkit::Result<()> = silent_logs! {
        client
            .transaction(None, |tx| {
                async move {
                    tx.subject()
                        .create(&Subject::new("CH102", "Organic Chemistry"))
                        .await?;
                    Err(Error::msg("Changed my mind"))
                }
                .boxed()
            })
            .await
    };
    assert_eq!(
        result.expect_err("The callback failed").to_string(),
        "Changed my mind"
    );
    assert_eq!(client.subject().count(()).await.expect("Could not count"), 1);

    // Expired
    let options = TransactionOptions::default().timeout(Duration::from_millis(50));
    let result = silent_logs! {
        client
            .transaction(Some(options), |tx| {
                async move {
                    tx.student()
                        .create(&Student::new("S-303", "Lou", "hash"))
                        .await?;
                    sleep(Duration::from_millis(500)).await;
                    Ok(())
                }
                .boxed()
            })
            .await
    };
    assert_error_code(result, TRANSACTION_API_ERROR);
    assert_eq!(
        client
            .student()
            .find_unique(StudentUnique::StudentId("S-303".into()))
            .await
            .expect("Could not look for the student"),
        None
    );

    // The client is usable again
    let student = client
        .transaction(None, |tx| {
            async move {
                tx.student()
                    .create(&Student::new("S-304", "Max", "hash"))
                    .await
            }
            .boxed()
        })
        .await
        .expect("The transaction should commit");
    assert_eq!(student.name, "Max");
    assert_eq!(client.student().count(()).await.expect("Could not count"), 2);

    // Another connection holds the lock
    let mut other = C::connect(&client.options().url)
        .await
        .expect("Could not open a second connection");
    let mut locker = other
        .begin(&TransactionOptions::default())
        .await
        .expect("Could not begin on the second connection");
    Delegate::<Student, _>::new(&mut locker, false)
        .update(
            StudentUnique::StudentId("S-304".into()),
            UpdateData::new().set(Student::name, "Locked"),
        )
        .await
        .expect("Could not lock the student");
    let options = TransactionOptions::default()
        .max_wait(Duration::from_millis(200))
        .timeout(Duration::from_millis(500));
    let started = Instant::now();
    let result = silent_logs! {
        client
            .transaction(Some(options), |tx| {
                async move {
                    tx.student()
                        .update(
                            StudentUnique::StudentId("S-304".into()),
                            UpdateData::new().set(Student::name, "Blocked"),
                        )
                        .await
                }
                .boxed()
            })
            .await
    };
    let elapsed = started.elapsed();
    assert_error_code(result, TRANSACTION_API_ERROR);
    assert!(
        elapsed < Duration::from_secs(2),
        "The transaction waited {:?} for the lock",
        elapsed
    );
    locker
        .rollback()
        .await
        .expect("Could not release the lock");
    other
        .disconnect()
        .await
        .expect("Could not close the second connection");
    let student = client
        .student()
        .find_unique_or_throw(StudentUnique::StudentId("S-304".into()))
        .await
        .expect("Could not read the student");
    assert_eq!(student.name, "Max");
}
