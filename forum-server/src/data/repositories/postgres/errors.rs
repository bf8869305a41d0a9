use crate::domain::error::DomainError;

/// Classification of a failed statement, based on the SQLSTATE class only.
pub(super) enum DbFailure<'a> {
    UniqueViolation { constraint: Option<&'a str> },
    ForeignKeyViolation { constraint: Option<&'a str> },
    Other,
}

pub(super) fn classify(err: &sqlx::Error) -> DbFailure<'_> {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            return DbFailure::UniqueViolation {
                constraint: db_err.constraint(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return DbFailure::ForeignKeyViolation {
                constraint: db_err.constraint(),
            };
        }
    }
    DbFailure::Other
}

pub(super) fn unexpected(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
