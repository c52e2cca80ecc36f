#[cfg(test)]
mod tests {
    use evalkit::{ClientError, Connection, Executor, IsolationLevel, TransactionOptions};
    use evalkit_sqlite::SqliteConnection;
    use evalkit_tests::{init_logs, silent_logs};
    use std::{path::Path, sync::Mutex};
    use tokio::fs;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .await
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=rwc", DB_PATH))
            .await
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
            .await
            .expect("Could not open the database");
        fs::remove_file(DB_PATH)
            .await
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteConnection::connect(&format!("sqlite://{}?mode=ro", DB_PATH))
                    .await
                    .is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            let error = SqliteConnection::connect("postgres://some_value")
                .await
                .expect_err("Not a sqlite URL");
            assert!(matches!(
                ClientError::of(&error),
                Some(ClientError::Initialization(..))
            ));
            assert!(SqliteConnection::connect("sqlite://").await.is_err());
            assert!(
                SqliteConnection::connect("sqlite://:memory:?mode=everything")
                    .await
                    .is_err()
            );
        }
    }

    #[tokio::test]
    async fn memory_database() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:?cache=shared")
            .await
            .expect("Could not open the database");
        let affected = connection
            .execute("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1), (2);".into())
            .await
            .expect("Could not run the script");
        assert_eq!(affected.rows_affected, 2);
        assert_eq!(affected.last_affected_id, Some(2));
    }

    #[tokio::test]
    async fn serializable_only() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the database");
        silent_logs! {
            let result = connection
                .begin(&TransactionOptions::default().isolation_level(IsolationLevel::ReadCommitted))
                .await;
            assert!(matches!(
                result.as_ref().map_err(ClientError::of),
                Err(Some(ClientError::Validation(..)))
            ));
        }
        let transaction = connection
            .begin(&TransactionOptions::default().isolation_level(IsolationLevel::Serializable))
            .await
            .expect("Serializable is the native level");
        drop(transaction);
        let transaction = connection
            .begin(&TransactionOptions::default())
            .await
            .expect("The dropped transaction was rolled back");
        drop(transaction);
    }
}
