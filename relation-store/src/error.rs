use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Confirm a mutating statement touched at least one row
///
/// A statement that ran without a driver error but matched nothing is a
/// NotFound-class failure, distinct from a database error.
pub fn check_rows_affected(rows: u64, what: &str) -> Result<()> {
    if rows == 0 {
        return Err(StoreError::NotFound(what.to_string()));
    }
    Ok(())
}

/// Map a unique-constraint violation (SQLSTATE 23505) on insert to
/// [`StoreError::AlreadyExists`]
pub(crate) fn map_insert_error(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::AlreadyExists(what.to_string());
        }
    }
    StoreError::Sqlx(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rows_affected() {
        assert!(check_rows_affected(1, "x").is_ok());
        assert!(matches!(
            check_rows_affected(0, "subject abc"),
            Err(StoreError::NotFound(msg)) if msg == "subject abc"
        ));
    }
}
