use evalkit_core::{ClientError, Error, ErrorContext, IsolationLevel, Result, TransactionOptions};
use std::{env, time::Duration};
use url::Url;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const LOG_QUERIES: &str = "EVALKIT_LOG_QUERIES";
pub const TRANSACTION_MAX_WAIT_MS: &str = "EVALKIT_TRANSACTION_MAX_WAIT_MS";
pub const TRANSACTION_TIMEOUT_MS: &str = "EVALKIT_TRANSACTION_TIMEOUT_MS";
pub const ISOLATION_LEVEL: &str = "EVALKIT_ISOLATION_LEVEL";

fn initialization(message: String) -> Error {
    let error = ClientError::Initialization(message);
    log::error!("{}", error);
    error.into()
}

/// Connection URL, query logging and interactive transaction defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// `<driver>://<location>[?parameters]`, for example `sqlite://data.sqlite?mode=rwc`.
    pub url: String,
    /// Log every generated statement at `debug` under the `evalkit::query` target.
    pub log_queries: bool,
    pub transaction: TransactionOptions,
}

impl ClientOptions {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self {
            url,
            log_queries: false,
            transaction: Default::default(),
        })
    }

    /// Reads `DATABASE_URL` and the `EVALKIT_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`ClientOptions::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let Some(url) = lookup(DATABASE_URL) else {
            return Err(initialization(format!(
                "The environment variable `{}` is not set",
                DATABASE_URL
            )));
        };
        let mut result = Self::new(url)?;
        if let Some(value) = lookup(LOG_QUERIES) {
            result.log_queries = parse_flag(&value).ok_or_else(|| {
                initialization(format!(
                    "`{}` must be a boolean, found `{}`",
                    LOG_QUERIES, value
                ))
            })?;
        }
        if let Some(value) = lookup(TRANSACTION_MAX_WAIT_MS) {
            result.transaction.max_wait = parse_millis(TRANSACTION_MAX_WAIT_MS, &value)?;
        }
        if let Some(value) = lookup(TRANSACTION_TIMEOUT_MS) {
            result.transaction.timeout = parse_millis(TRANSACTION_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ISOLATION_LEVEL) {
            result.transaction.isolation_level = Some(
                value
                    .parse::<IsolationLevel>()
                    .with_context(|| format!("While reading `{}`", ISOLATION_LEVEL))?,
            );
        }
        Ok(result)
    }

    pub fn log_queries(mut self, log_queries: bool) -> Self {
        self.log_queries = log_queries;
        self
    }

    pub fn transaction(mut self, transaction: TransactionOptions) -> Self {
        self.transaction = transaction;
        self
    }

    /// Driver name, the part before `://`.
    pub fn scheme(&self) -> &str {
        self.url.split_once("://").map_or("", |(scheme, _)| scheme)
    }
}

/// `scheme://location` where the location may be a relative path or `:memory:`,
/// the URL is checked in its opaque form `scheme:location`.
fn validate_url(url: &str) -> Result<()> {
    let Some((scheme, location)) = url.split_once("://") else {
        return Err(initialization(format!(
            "Invalid database URL `{}`, expected `<driver>://<location>`",
            url
        )));
    };
    if location.is_empty() {
        return Err(initialization(format!(
            "Invalid database URL `{}`, the location is empty",
            url
        )));
    }
    match Url::parse(&format!("{}:{}", scheme, location)) {
        Ok(parsed) if parsed.scheme().eq_ignore_ascii_case(scheme) => Ok(()),
        Ok(..) => Err(initialization(format!(
            "Invalid database URL `{}`, malformed driver name",
            url
        ))),
        Err(e) => Err(initialization(format!(
            "Invalid database URL `{}`: {}",
            url, e
        ))),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| {
            initialization(format!(
                "`{}` must be a number of milliseconds, found `{}`: {}",
                name, value, e
            ))
        })
}
