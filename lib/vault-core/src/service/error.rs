use serde::Serialize;
use shared_types::{CertificateRequestId, TrustGroupId};
use strum::Display;
use thiserror::Error;

use super::permission::Role;
use crate::config::ConfigValidationError;
use crate::model::certificate_request::{CertificateRequestState, CertificateRequestType};
use crate::provider::key_vault::error::KeyVaultError;
use crate::repository::error::DataLayerError;
use crate::util::x509::CertificateFormatError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    EntityNotFound(#[from] EntityNotFoundError),

    #[error("Missing permission, one of {0:?} required")]
    Forbidden(Vec<Role>),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    #[error("Trust group `{group_id}` has a broken parent chain at `{broken_at}`")]
    CorruptHierarchy {
        group_id: TrustGroupId,
        broken_at: TrustGroupId,
    },

    #[error("Key material of certificate request `{0}` is no longer available")]
    Gone(CertificateRequestId),

    #[error("Cryptographic operation failed: {0}")]
    Failure(String),

    #[error("Config validation error `{0}`")]
    ConfigValidation(#[from] ConfigValidationError),

    #[error("Key vault error `{0}`")]
    KeyVault(KeyVaultError),

    #[error(transparent)]
    Repository(DataLayerError),

    #[error("Mapping error: `{0}`")]
    MappingError(String),
}

#[derive(Debug, Error)]
pub enum EntityNotFoundError {
    #[error("Trust group `{0}` not found")]
    TrustGroup(TrustGroupId),

    #[error("Parent trust group `{0}` not found")]
    ParentTrustGroup(TrustGroupId),

    #[error("Certificate request `{0}` not found")]
    CertificateRequest(CertificateRequestId),
}

#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("Record was modified concurrently")]
    ConcurrentModification,

    #[error("Another operation on `{0}` is in progress")]
    OperationInProgress(String),

    #[error("Cannot {action} a certificate request in state {state}")]
    InvalidTransition {
        state: CertificateRequestState,
        action: &'static str,
    },

    #[error("Trust group `{0}` still has child groups")]
    HasChildGroups(TrustGroupId),

    #[error("Record already exists")]
    AlreadyExists,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid subject name: `{0}`")]
    InvalidSubjectName(#[from] CertificateFormatError),

    #[error("Missing value for `{0}`")]
    MissingValue(&'static str),

    #[error("Unsupported signature algorithm or key size: `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("Invalid lifetime: {0}")]
    InvalidLifetime(String),

    #[error("Invalid key size: {0}")]
    InvalidKeySize(String),

    #[error("Invalid domain name `{0}`")]
    InvalidDomainName(String),

    #[error("Invalid certificate signing request: {0}")]
    InvalidCsr(String),

    #[error("Invalid page token")]
    InvalidPageToken,

    #[error("Certificate request `{id}` is a {actual}, not a {expected}")]
    RequestTypeMismatch {
        id: CertificateRequestId,
        expected: CertificateRequestType,
        actual: CertificateRequestType,
    },
}

#[derive(Debug, Error)]
pub enum InvalidStateError {
    #[error("Trust group `{0}` has no issuer certificate")]
    MissingIssuer(TrustGroupId),

    #[error("Issuer certificate of trust group `{0}` is not valid")]
    IssuerExpired(TrustGroupId),
}

/// Coarse failure category returned to callers
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    InvalidConfiguration,
    InvalidState,
    CorruptHierarchy,
    Gone,
    Failure,
    Internal,
}

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display, Serialize)]
pub enum ErrorCode {
    BR_0000,
    BR_0020,
    BR_0054,

    BR_0100,
    BR_0101,
    BR_0102,
    BR_0110,
    BR_0120,
    BR_0121,
    BR_0122,

    BR_0130,
    BR_0131,
    BR_0132,
    BR_0133,
    BR_0134,
    BR_0135,
    BR_0136,
    BR_0137,
    BR_0138,

    BR_0140,
    BR_0141,
    BR_0150,
    BR_0160,
    BR_0170,
    BR_0180,
    BR_0190,
}

impl ErrorCode {
    pub const fn msg(&self) -> &'static str {
        match self {
            ErrorCode::BR_0000 => "Unmapped error code",
            ErrorCode::BR_0020 => "Concurrent modification",
            ErrorCode::BR_0054 => "Database error",

            ErrorCode::BR_0100 => "Trust group not found",
            ErrorCode::BR_0101 => "Certificate request not found",
            ErrorCode::BR_0102 => "Parent trust group not found",
            ErrorCode::BR_0110 => "Missing permission",
            ErrorCode::BR_0120 => "Invalid certificate request state",
            ErrorCode::BR_0121 => "Trust group has child groups",
            ErrorCode::BR_0122 => "Operation already in progress",

            ErrorCode::BR_0130 => "Invalid subject name",
            ErrorCode::BR_0131 => "Invalid certificate signing request",
            ErrorCode::BR_0132 => "Unsupported signature algorithm",
            ErrorCode::BR_0133 => "Invalid lifetime",
            ErrorCode::BR_0134 => "Invalid key size",
            ErrorCode::BR_0135 => "Invalid page token",
            ErrorCode::BR_0136 => "Certificate request type mismatch",
            ErrorCode::BR_0137 => "Missing value",
            ErrorCode::BR_0138 => "Invalid domain name",

            ErrorCode::BR_0140 => "Trust group has no issuer certificate",
            ErrorCode::BR_0141 => "Issuer certificate not valid",
            ErrorCode::BR_0150 => "Corrupt trust group hierarchy",
            ErrorCode::BR_0160 => "Key material no longer available",
            ErrorCode::BR_0170 => "Cryptographic operation failed",
            ErrorCode::BR_0180 => "Key vault error",
            ErrorCode::BR_0190 => "Configuration validation error",
        }
    }
}

pub trait ErrorCodeMixin {
    fn error_code(&self) -> ErrorCode;
}

/// The only failure shape exposed to callers
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EntityNotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) | Self::ConfigValidation(_) => ErrorKind::InvalidConfiguration,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::CorruptHierarchy { .. } => ErrorKind::CorruptHierarchy,
            Self::Gone(_) => ErrorKind::Gone,
            Self::Failure(_) => ErrorKind::Failure,
            Self::KeyVault(error) => match error {
                KeyVaultError::Forbidden => ErrorKind::Forbidden,
                KeyVaultError::UnsupportedAlgorithm { .. } | KeyVaultError::InvalidCsr(_) => {
                    ErrorKind::InvalidConfiguration
                }
                KeyVaultError::KeyNotFound(_) => ErrorKind::Gone,
                KeyVaultError::Transient(_) | KeyVaultError::Failed(_) => ErrorKind::Failure,
            },
            Self::Repository(error) => match error {
                DataLayerError::RecordNotUpdated | DataLayerError::AlreadyExists => {
                    ErrorKind::Conflict
                }
                _ => ErrorKind::Internal,
            },
            Self::MappingError(_) => ErrorKind::Internal,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code(),
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl ErrorCodeMixin for ServiceError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EntityNotFound(error) => error.error_code(),
            Self::Forbidden(_) => ErrorCode::BR_0110,
            Self::Conflict(error) => error.error_code(),
            Self::Validation(error) => error.error_code(),
            Self::InvalidState(error) => error.error_code(),
            Self::CorruptHierarchy { .. } => ErrorCode::BR_0150,
            Self::Gone(_) => ErrorCode::BR_0160,
            Self::Failure(_) => ErrorCode::BR_0170,
            Self::ConfigValidation(_) => ErrorCode::BR_0190,
            Self::KeyVault(error) => error.error_code(),
            Self::Repository(error) => error.error_code(),
            Self::MappingError(_) => ErrorCode::BR_0000,
        }
    }
}

impl ErrorCodeMixin for EntityNotFoundError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::TrustGroup(_) => ErrorCode::BR_0100,
            Self::CertificateRequest(_) => ErrorCode::BR_0101,
            Self::ParentTrustGroup(_) => ErrorCode::BR_0102,
        }
    }
}

impl ErrorCodeMixin for ConflictError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConcurrentModification | Self::AlreadyExists => ErrorCode::BR_0020,
            Self::InvalidTransition { .. } => ErrorCode::BR_0120,
            Self::HasChildGroups(_) => ErrorCode::BR_0121,
            Self::OperationInProgress(_) => ErrorCode::BR_0122,
        }
    }
}

impl ErrorCodeMixin for ValidationError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidSubjectName(_) => ErrorCode::BR_0130,
            Self::InvalidCsr(_) => ErrorCode::BR_0131,
            Self::UnsupportedAlgorithm(_) => ErrorCode::BR_0132,
            Self::InvalidLifetime(_) => ErrorCode::BR_0133,
            Self::InvalidKeySize(_) => ErrorCode::BR_0134,
            Self::InvalidPageToken => ErrorCode::BR_0135,
            Self::RequestTypeMismatch { .. } => ErrorCode::BR_0136,
            Self::MissingValue(_) => ErrorCode::BR_0137,
            Self::InvalidDomainName(_) => ErrorCode::BR_0138,
        }
    }
}

impl ErrorCodeMixin for InvalidStateError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingIssuer(_) => ErrorCode::BR_0140,
            Self::IssuerExpired(_) => ErrorCode::BR_0141,
        }
    }
}

impl From<DataLayerError> for ServiceError {
    fn from(value: DataLayerError) -> Self {
        match value {
            DataLayerError::RecordNotUpdated => {
                ServiceError::Conflict(ConflictError::ConcurrentModification)
            }
            DataLayerError::AlreadyExists => ServiceError::Conflict(ConflictError::AlreadyExists),
            value => ServiceError::Repository(value),
        }
    }
}

impl From<KeyVaultError> for ServiceError {
    fn from(value: KeyVaultError) -> Self {
        match value {
            KeyVaultError::UnsupportedAlgorithm { .. } => {
                ServiceError::Validation(ValidationError::UnsupportedAlgorithm(value.to_string()))
            }
            KeyVaultError::InvalidCsr(reason) => {
                ServiceError::Validation(ValidationError::InvalidCsr(reason))
            }
            value => ServiceError::KeyVault(value),
        }
    }
}
