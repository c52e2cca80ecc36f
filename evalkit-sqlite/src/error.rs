use evalkit_core::{
    ClientError, Error, FOREIGN_KEY_CONSTRAINT_FAILED, NULL_CONSTRAINT_VIOLATION,
    TRANSACTION_API_ERROR, UNIQUE_CONSTRAINT_FAILED,
};
use libsqlite3_sys::{
    SQLITE_BUSY, SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_NOTNULL,
    SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE, SQLITE_CORRUPT, SQLITE_FULL,
    SQLITE_IOERR, SQLITE_NOMEM, SQLITE_NOTADB, sqlite3, sqlite3_errmsg, sqlite3_extended_errcode,
};
use std::ffi::{CStr, c_char, c_int};

pub(crate) fn error_message_from_ptr<'a>(ptr: *const c_char) -> &'a str {
    unsafe {
        if !ptr.is_null() {
            CStr::from_ptr(ptr)
                .to_str()
                .unwrap_or("Unknown error (the error message was not a valid C string)")
        } else {
            "Unknown error (could not extract the error message)"
        }
    }
}

/// Maps an extended result code to the client error taxonomy.
///
/// `deadline` tells whether the statement ran under a transaction deadline, a
/// lock still held by another connection when it expires is `P2028`.
pub(crate) fn classify(code: c_int, message: String, deadline: bool) -> ClientError {
    match code {
        _ if deadline && code & 0xff == SQLITE_BUSY => ClientError::known(
            TRANSACTION_API_ERROR,
            format!(
                "Transaction already closed: the deadline expired while waiting for a lock ({})",
                message
            ),
        ),
        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
            ClientError::known(UNIQUE_CONSTRAINT_FAILED, message)
        }
        SQLITE_CONSTRAINT_FOREIGNKEY => ClientError::known(FOREIGN_KEY_CONSTRAINT_FAILED, message),
        SQLITE_CONSTRAINT_NOTNULL => ClientError::known(NULL_CONSTRAINT_VIOLATION, message),
        _ if matches!(
            code & 0xff,
            SQLITE_CORRUPT | SQLITE_NOTADB | SQLITE_NOMEM | SQLITE_IOERR | SQLITE_FULL
        ) =>
        {
            ClientError::EnginePanic(message)
        }
        _ => ClientError::UnknownRequest(format!("{} (sqlite code {})", message, code)),
    }
}

/// The last error of the connection, logged.
pub(crate) fn engine_error(connection: *mut sqlite3) -> Error {
    engine_error_within(connection, false)
}

pub(crate) fn engine_error_within(connection: *mut sqlite3, deadline: bool) -> Error {
    let (code, message) = unsafe {
        (
            sqlite3_extended_errcode(connection),
            error_message_from_ptr(sqlite3_errmsg(connection)).to_string(),
        )
    };
    let error = classify(code, message, deadline);
    log::error!("{}", error);
    error.into()
}

#[cfg(test)]
mod tests {
    use super::classify;
    use evalkit_core::ClientError;
    use libsqlite3_sys::{
        SQLITE_BUSY, SQLITE_BUSY_SNAPSHOT, SQLITE_CONSTRAINT_CHECK, SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_PRIMARYKEY,
        SQLITE_CONSTRAINT_UNIQUE, SQLITE_IOERR_READ,
    };

    #[test]
    fn constraint_codes() {
        assert_eq!(
            classify(SQLITE_CONSTRAINT_UNIQUE, "dup".into(), false).code(),
            Some("P2002")
        );
        assert_eq!(
            classify(SQLITE_CONSTRAINT_PRIMARYKEY, "dup".into(), false).code(),
            Some("P2002")
        );
        assert_eq!(
            classify(SQLITE_CONSTRAINT_FOREIGNKEY, "fk".into(), false).code(),
            Some("P2003")
        );
        assert!(matches!(
            classify(SQLITE_CONSTRAINT_CHECK, "check".into(), false),
            ClientError::UnknownRequest(..)
        ));
        assert!(matches!(
            classify(SQLITE_IOERR_READ, "io".into(), false),
            ClientError::EnginePanic(..)
        ));
    }

    #[test]
    fn busy_under_deadline() {
        assert_eq!(
            classify(SQLITE_BUSY, "database is locked".into(), true).code(),
            Some("P2028")
        );
        assert_eq!(
            classify(SQLITE_BUSY_SNAPSHOT, "database is locked".into(), true).code(),
            Some("P2028")
        );
        assert!(matches!(
            classify(SQLITE_BUSY, "database is locked".into(), false),
            ClientError::UnknownRequest(..)
        ));
    }
}
