mod aggregates;
mod enrollment;
mod evaluations;
mod people;
mod raw;
mod transactions;

use aggregates::aggregates;
use enrollment::enrollment;
use evalkit::{Client, Connection, Result, error_code};
use evaluations::evaluations;
use log::LevelFilter;
use people::people;
use raw::raw;
use std::{env, fmt::Debug};
use transactions::transactions;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every scenario, each one starting from empty tables.
pub async fn execute_tests<C: Connection>(client: &mut Client<C>) {
    people(client).await;
    enrollment(client).await;
    evaluations(client).await;
    aggregates(client).await;
    transactions(client).await;
    raw(client).await;
}

/// Asserts that `result` failed with the known request `code`.
#[track_caller]
pub fn assert_error_code<T: Debug>(result: Result<T>, code: &str) {
    match result {
        Ok(value) => panic!("Expected the error {}, the operation returned {:?}", code, value),
        Err(error) => assert_eq!(error_code(&error), Some(code), "Unexpected error: {:#}", error),
    }
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        let result = { $($code)+ };
        log::set_max_level(level);
        result
    }};
}
