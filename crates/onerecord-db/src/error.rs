use onerecord_core::AppError;

pub(crate) fn db_error(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(e.to_string())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
