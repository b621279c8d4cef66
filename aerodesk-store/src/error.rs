use aerodesk_core::StoreError;
use sqlx::error::ErrorKind;

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => classify_database_error(
            db_err.kind(),
            db_err.code().as_deref(),
            db_err.constraint(),
            db_err.message(),
        ),
        _ => StoreError::Backend(err.to_string()),
    }
}

/// Sorts a database error by the kind sqlx derived from its SQLSTATE.
/// Integrity violations keep the constraint name; anything else is a
/// backend failure.
pub fn classify_database_error(
    kind: ErrorKind,
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> StoreError {
    let constraint = constraint.unwrap_or_default().to_string();
    let message = message.to_string();
    match (kind, code) {
        (ErrorKind::UniqueViolation, _) => StoreError::UniqueViolation { constraint, message },
        (ErrorKind::ForeignKeyViolation, _) => StoreError::ForeignKeyViolation { constraint, message },
        (ErrorKind::CheckViolation, _) => StoreError::CheckViolation { constraint, message },
        (_, Some(code)) => StoreError::Backend(format!("{} (SQLSTATE {})", message, code)),
        (_, None) => StoreError::Backend(message),
    }
}
