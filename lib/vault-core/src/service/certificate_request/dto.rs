use one_dto_mapper::From;
use secrecy::SecretSlice;
use shared_types::{CertificateRequestId, EntityId, TrustGroupId};
use time::OffsetDateTime;

use crate::model::certificate_request::{
    CertificateRequest, CertificateRequestState, CertificateRequestType, PrivateKeyFormat,
};
use crate::model::common::OperationStamp;
use crate::model::list_query::GetListResponse;

#[derive(Clone, Debug)]
pub struct StartSigningRequestDTO {
    pub entity_id: EntityId,
    pub group_id: TrustGroupId,
    /// PKCS#10 request, PEM or DER encoded
    pub certificate_request: Vec<u8>,
    /// Taken from the request subject when empty
    pub subject_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StartKeyPairRequestDTO {
    pub entity_id: EntityId,
    pub group_id: TrustGroupId,
    pub subject_name: String,
    pub domain_names: Vec<String>,
    pub private_key_format: Option<PrivateKeyFormat>,
}

#[derive(Clone, Debug, Eq, PartialEq, From)]
#[from(CertificateRequest)]
pub struct GetCertificateRequestResponseDTO {
    pub id: CertificateRequestId,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
    pub entity_id: EntityId,
    pub group_id: TrustGroupId,
    pub request_type: CertificateRequestType,
    pub state: CertificateRequestState,
    pub subject_name: Option<String>,
    pub domain_names: Vec<String>,
    pub private_key_format: Option<PrivateKeyFormat>,
    pub error_info: Option<String>,
    pub certificate: Option<Vec<u8>>,
    pub issuer_version: Option<u32>,
    pub key_material_available: bool,
    pub submitted: OperationStamp,
    pub approved: Option<OperationStamp>,
    pub accepted: Option<OperationStamp>,
    pub revoked: Option<OperationStamp>,
    pub version: u32,
}

pub type GetCertificateRequestListResponseDTO = GetListResponse<GetCertificateRequestResponseDTO>;

/// Artifact is only present once the request has been approved
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinishSigningRequestResponseDTO {
    pub request_id: CertificateRequestId,
    pub state: CertificateRequestState,
    pub certificate: Option<Vec<u8>>,
    pub error_info: Option<String>,
}

#[derive(Debug)]
pub struct FinishKeyPairRequestResponseDTO {
    pub request_id: CertificateRequestId,
    pub state: CertificateRequestState,
    pub certificate: Option<Vec<u8>>,
    pub private_key: Option<SecretSlice<u8>>,
    pub private_key_format: PrivateKeyFormat,
    pub error_info: Option<String>,
}
