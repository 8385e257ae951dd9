use serde::{Deserialize, Serialize};
use shared_types::{CertificateRequestId, EntityId, KeyHandle, TrustGroupId};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::common::OperationStamp;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificateRequest {
    pub id: CertificateRequestId,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
    pub entity_id: EntityId,
    pub group_id: TrustGroupId,
    pub request_type: CertificateRequestType,
    pub state: CertificateRequestState,
    pub subject_name: Option<String>,
    pub domain_names: Vec<String>,
    /// DER encoded CSR of a signing request
    pub csr: Option<Vec<u8>>,
    pub private_key_format: Option<PrivateKeyFormat>,
    pub error_info: Option<String>,
    /// DER encoded certificate, present once approved
    pub certificate: Option<Vec<u8>>,
    /// Version of the group issuer that signed `certificate`
    pub issuer_version: Option<u32>,
    pub private_key_handle: Option<KeyHandle>,
    pub key_material_available: bool,
    pub submitted: OperationStamp,
    pub approved: Option<OperationStamp>,
    pub accepted: Option<OperationStamp>,
    pub revoked: Option<OperationStamp>,
    pub version: u32,
    pub sort_key: i64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateRequestType {
    SigningRequest,
    KeyPairRequest,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateRequestState {
    New,
    Approved,
    Rejected,
    Completed,
    Accepted,
    Failure,
}

impl CertificateRequestState {
    /// Terminal states without outgoing transitions
    pub fn is_absorbing(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Failure)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivateKeyFormat {
    #[default]
    Pem,
    Der,
}

/// Conditional write of a state transition.
///
/// Only applied when the stored record still has `expected_state` and `expected_version`,
/// the version is incremented on success.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateCertificateRequestState {
    pub expected_state: CertificateRequestState,
    pub expected_version: u32,
    pub state: CertificateRequestState,
    pub error_info: Option<String>,
    pub certificate: Option<Vec<u8>>,
    pub issuer_version: Option<u32>,
    pub private_key_handle: Option<Option<KeyHandle>>,
    pub key_material_available: Option<bool>,
    pub approved: Option<OperationStamp>,
    pub accepted: Option<OperationStamp>,
    pub revoked: Option<OperationStamp>,
}

impl UpdateCertificateRequestState {
    pub fn transition(
        request: &CertificateRequest,
        state: CertificateRequestState,
    ) -> UpdateCertificateRequestState {
        Self {
            expected_state: request.state,
            expected_version: request.version,
            state,
            error_info: None,
            certificate: None,
            issuer_version: None,
            private_key_handle: None,
            key_material_available: None,
            approved: None,
            accepted: None,
            revoked: None,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CertificateRequestFilter {
    pub entity_id: Option<EntityId>,
    pub group_id: Option<TrustGroupId>,
    pub state: Option<CertificateRequestState>,
}
