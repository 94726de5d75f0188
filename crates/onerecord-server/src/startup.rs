use onerecord_core::AppError;
use onerecord_db::Database;

/// Result of the one-shot database check run at startup.
#[derive(Debug)]
pub enum DatabaseCheck {
    Ready,
    Unreachable(AppError),
    MigrationFailed(AppError),
}

/// Connect once, then apply migrations. Not retried.
pub async fn check_database(db: &Database) -> DatabaseCheck {
    if let Err(e) = db.health_check().await {
        return DatabaseCheck::Unreachable(e);
    }
    match db.migrate().await {
        Ok(()) => DatabaseCheck::Ready,
        Err(e) => DatabaseCheck::MigrationFailed(e),
    }
}

/// Log the outcome of [`check_database`].
pub fn log_database_check(check: &DatabaseCheck) {
    match check {
        DatabaseCheck::Ready => tracing::info!("Connected correctly to database"),
        DatabaseCheck::Unreachable(e) => {
            tracing::error!(error = %e, "Could not connect to database")
        }
        DatabaseCheck::MigrationFailed(e) => {
            tracing::error!(error = %e, "Connected to database but migrations failed")
        }
    }
}
