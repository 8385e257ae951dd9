use thiserror::Error;

use crate::service::error::{ErrorCode, ErrorCodeMixin};
use crate::util::retry::TransientError;

#[derive(Debug, Error)]
pub enum DataLayerError {
    #[error("Already exists")]
    AlreadyExists,

    #[error("Wrong parameters")]
    IncorrectParameters,

    #[error("Record not updated")]
    RecordNotUpdated,

    #[error("Record not found")]
    RecordNotFound,

    #[error("Response could not be mapped")]
    MappingError,

    #[error("Missing required relation {relation} for {id}")]
    MissingRequiredRelation { relation: &'static str, id: String },

    #[error("Transient database error: {0}")]
    Transient(anyhow::Error),

    #[error("Database error: {0}")]
    Db(#[from] anyhow::Error),
}

impl TransientError for DataLayerError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl ErrorCodeMixin for DataLayerError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Db(_) | Self::Transient(_) => ErrorCode::BR_0054,
            Self::AlreadyExists | Self::RecordNotUpdated => ErrorCode::BR_0020,
            Self::IncorrectParameters
            | Self::RecordNotFound
            | Self::MappingError
            | Self::MissingRequiredRelation { .. } => ErrorCode::BR_0000,
        }
    }
}

impl From<uuid::Error> for DataLayerError {
    fn from(_: uuid::Error) -> Self {
        Self::MappingError
    }
}
