use std::borrow::Cow;

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use vault_core::repository::error::DataLayerError;

pub(crate) fn to_data_layer_error(e: DbErr) -> DataLayerError {
    if is_transient(&e) {
        return DataLayerError::Transient(e.into());
    }

    // SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_TRIGGER (deferred or `RESTRICT` checks)
    if database_error_code(&e).is_some_and(|code| code == "787" || code == "1811") {
        return DataLayerError::IncorrectParameters;
    }

    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DataLayerError::AlreadyExists,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => DataLayerError::IncorrectParameters,
        Some(_) | None => DataLayerError::Db(e.into()),
    }
}

pub(crate) fn to_update_data_layer_error(err: DbErr) -> DataLayerError {
    match err {
        DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => DataLayerError::RecordNotUpdated,
        e => to_data_layer_error(e),
    }
}

/// Connection level failures, the statement itself may succeed when repeated
fn is_transient(e: &DbErr) -> bool {
    match e {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(RuntimeErr::SqlxError(_)) => true,
        DbErr::Exec(RuntimeErr::SqlxError(error)) | DbErr::Query(RuntimeErr::SqlxError(error)) => {
            matches!(
                error,
                sea_orm::sqlx::Error::PoolTimedOut
                    | sea_orm::sqlx::Error::PoolClosed
                    | sea_orm::sqlx::Error::Io(_)
            ) || database_error_code(e)
                // SQLITE_BUSY, SQLITE_LOCKED
                .is_some_and(|code| code == "5" || code == "6")
        }
        _ => false,
    }
}

fn database_error_code(e: &DbErr) -> Option<Cow<'_, str>> {
    match e {
        DbErr::Exec(RuntimeErr::SqlxError(error)) | DbErr::Query(RuntimeErr::SqlxError(error)) => {
            error.as_database_error().and_then(|error| error.code())
        }
        _ => None,
    }
}
