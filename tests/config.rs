#[cfg(test)]
mod tests {
    use evalkit::{
        ClientError, ClientOptions, DATABASE_URL, ISOLATION_LEVEL, IsolationLevel, LOG_QUERIES,
        TRANSACTION_MAX_WAIT_MS, TRANSACTION_TIMEOUT_MS, TransactionOptions,
    };
    use std::{collections::HashMap, time::Duration};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn is_initialization(error: &evalkit::Error) -> bool {
        matches!(
            ClientError::of(error),
            Some(ClientError::Initialization(..))
        )
    }

    #[test]
    fn urls() {
        let options = ClientOptions::new("sqlite://data.sqlite?mode=rwc").expect("Valid URL");
        assert_eq!(options.scheme(), "sqlite");
        assert!(!options.log_queries);
        assert_eq!(options.transaction, TransactionOptions::default());
        assert_eq!(
            ClientOptions::new("sqlite://:memory:")
                .expect("Valid URL")
                .scheme(),
            "sqlite"
        );
        assert!(ClientOptions::new("sqlite://../target/debug/tests.sqlite").is_ok());

        for url in ["data.sqlite", "sqlite://", "://data.sqlite", "1sqlite://data"] {
            let error = ClientOptions::new(url).expect_err(url);
            assert!(is_initialization(&error), "{}: {:#}", url, error);
        }
    }

    #[test]
    fn environment() {
        let error = ClientOptions::from_lookup(lookup(&[])).expect_err("Missing URL");
        assert!(is_initialization(&error));
        assert!(error.to_string().contains(DATABASE_URL));

        let options = ClientOptions::from_lookup(lookup(&[
            (DATABASE_URL, "sqlite://school.sqlite?mode=rwc"),
            (LOG_QUERIES, "yes"),
            (TRANSACTION_MAX_WAIT_MS, "250"),
            (TRANSACTION_TIMEOUT_MS, " 10000 "),
            (ISOLATION_LEVEL, "Serializable"),
        ]))
        .expect("Valid environment");
        assert_eq!(options.url, "sqlite://school.sqlite?mode=rwc");
        assert!(options.log_queries);
        assert_eq!(
            options.transaction,
            TransactionOptions::default()
                .max_wait(Duration::from_millis(250))
                .timeout(Duration::from_secs(10))
                .isolation_level(IsolationLevel::Serializable)
        );

        let defaults = ClientOptions::from_lookup(lookup(&[(DATABASE_URL, "sqlite://a.sqlite")]))
            .expect("Valid environment");
        assert_eq!(defaults, ClientOptions::new("sqlite://a.sqlite").expect("Valid URL"));
    }

    #[test]
    fn wrong_environment() {
        let base = (DATABASE_URL, "sqlite://a.sqlite");
        let error = ClientOptions::from_lookup(lookup(&[base, (LOG_QUERIES, "sometimes")]))
            .expect_err("Not a flag");
        assert!(is_initialization(&error));
        let error =
            ClientOptions::from_lookup(lookup(&[base, (TRANSACTION_TIMEOUT_MS, "5s")]))
                .expect_err("Not a number");
        assert!(is_initialization(&error));
        assert!(
            ClientOptions::from_lookup(lookup(&[base, (ISOLATION_LEVEL, "snapshot")])).is_err()
        );
    }

    #[test]
    fn isolation_levels() {
        assert_eq!(
            "read committed".parse::<IsolationLevel>().expect("Level"),
            IsolationLevel::ReadCommitted
        );
        assert_eq!(
            "REPEATABLE_READ".parse::<IsolationLevel>().expect("Level"),
            IsolationLevel::RepeatableRead
        );
        assert_eq!(IsolationLevel::ReadUncommitted.to_string(), "ReadUncommitted");
        assert_eq!(IsolationLevel::ReadUncommitted.as_sql(), "READ UNCOMMITTED");
    }
}
