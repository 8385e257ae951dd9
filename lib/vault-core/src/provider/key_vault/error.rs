//! Enumerates errors related to the key vault.

use shared_types::KeyHandle;
use thiserror::Error;

use crate::model::trust_group::SignatureAlgorithm;
use crate::service::error::{ErrorCode, ErrorCodeMixin};
use crate::util::retry::TransientError;

#[derive(Debug, Error)]
pub enum KeyVaultError {
    #[error("Key vault temporarily unavailable: `{0}`")]
    Transient(String),
    #[error("Operation not permitted by the key vault")]
    Forbidden,
    #[error("Unsupported algorithm `{algorithm}` with key size {key_size}")]
    UnsupportedAlgorithm {
        algorithm: SignatureAlgorithm,
        key_size: u32,
    },
    #[error("Invalid certificate signing request: `{0}`")]
    InvalidCsr(String),
    #[error("Key `{0}` not found")]
    KeyNotFound(KeyHandle),
    #[error("Key vault error: `{0}`")]
    Failed(String),
}

impl TransientError for KeyVaultError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl ErrorCodeMixin for KeyVaultError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedAlgorithm { .. } => ErrorCode::BR_0132,
            Self::InvalidCsr(_) => ErrorCode::BR_0131,
            Self::KeyNotFound(_) => ErrorCode::BR_0160,
            Self::Forbidden | Self::Transient(_) | Self::Failed(_) => ErrorCode::BR_0180,
        }
    }
}

impl From<rcgen::Error> for KeyVaultError {
    fn from(value: rcgen::Error) -> Self {
        Self::Failed(value.to_string())
    }
}
