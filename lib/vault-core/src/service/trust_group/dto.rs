use one_dto_mapper::{From, convert_inner};
use shared_types::TrustGroupId;
use time::OffsetDateTime;

use crate::model::list_query::GetListResponse;
use crate::model::trust_group::{
    CertificateType, SignatureAlgorithm, TrustGroup,
};
use crate::service::issuer_chain::dto::IssuerCertificateVersionDTO;

/// Parameters left out are taken from the configured group defaults
#[derive(Clone, Debug)]
pub struct CreateTrustGroupRequestDTO {
    pub name: String,
    pub certificate_type: CertificateType,
    pub subject_name: String,
    pub lifetime: Option<u32>,
    pub key_size: Option<u32>,
    pub signature_algorithm: Option<SignatureAlgorithm>,
    pub issued_lifetime: Option<u32>,
    pub issued_key_size: Option<u32>,
    pub issued_signature_algorithm: Option<SignatureAlgorithm>,
}

/// The name applies immediately, issuer parameters take effect with the next
/// renewal and issued parameters with the next approval
#[derive(Clone, Debug, Default)]
pub struct UpdateTrustGroupRequestDTO {
    /// Rejects the update if the group moved past this version
    pub expected_version: Option<u32>,
    pub name: Option<String>,
    pub subject_name: Option<String>,
    pub lifetime: Option<u32>,
    pub key_size: Option<u32>,
    pub signature_algorithm: Option<SignatureAlgorithm>,
    pub issued_lifetime: Option<u32>,
    pub issued_key_size: Option<u32>,
    pub issued_signature_algorithm: Option<SignatureAlgorithm>,
}

#[derive(Clone, Debug, Eq, PartialEq, From)]
#[from(TrustGroup)]
pub struct GetTrustGroupResponseDTO {
    pub id: TrustGroupId,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
    pub parent_id: Option<TrustGroupId>,
    pub name: String,
    pub certificate_type: CertificateType,
    pub subject_name: String,
    pub lifetime: u32,
    pub key_size: u32,
    pub signature_algorithm: SignatureAlgorithm,
    pub issued_lifetime: u32,
    pub issued_key_size: u32,
    pub issued_signature_algorithm: SignatureAlgorithm,
    pub version: u32,
    #[from(with_fn = convert_inner)]
    pub issuer: Option<IssuerCertificateVersionDTO>,
}

pub type GetTrustGroupListResponseDTO = GetListResponse<GetTrustGroupResponseDTO>;
