#[cfg(test)]
mod tests {
    use evalkit::{Client, ClientOptions};
    use evalkit_sqlite::SqliteConnection;
    use evalkit_tests::{execute_tests, init_logs};
    use std::{path::Path, sync::Mutex};
    use tokio::fs;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn sqlite() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/tests.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH).await.expect(
                format!("Failed to remove existing test database file {}", DB_PATH).as_str(),
            );
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        let options = ClientOptions::new(format!("sqlite://{}?mode=rwc", DB_PATH))
            .expect("Valid URL")
            .log_queries(true);
        let mut client = Client::<SqliteConnection>::connect(options)
            .await
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        execute_tests(&mut client).await;
        client.disconnect().await.expect("Could not disconnect");
    }

    #[tokio::test]
    async fn wrong_driver() {
        let options = ClientOptions::new("postgres://localhost/evaluations").expect("Valid URL");
        assert!(
            Client::<SqliteConnection>::connect(options).await.is_err(),
            "The scheme must name the driver"
        );
    }
}
