use shared_types::{CertificateRequestId, EntityId, TrustGroupId};

use crate::model::list_query::GetListResponse;

/// Certificate issued to a trusted entity together with its issuer chain
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustedCertificateDTO {
    pub entity_id: EntityId,
    pub request_id: CertificateRequestId,
    pub group_id: TrustGroupId,
    /// DER encoded leaf certificate
    pub certificate: Vec<u8>,
    /// DER encoded issuer certificates, root last. Empty if the issuing group is gone.
    pub issuer_chain: Vec<Vec<u8>>,
}

pub type GetTrustedCertificateListResponseDTO = GetListResponse<TrustedCertificateDTO>;
