use one_dto_mapper::From;
use shared_types::TrustGroupId;
use time::OffsetDateTime;

use crate::model::trust_group::TrustGroupIssuer;

#[derive(Clone, Debug, Eq, PartialEq, From)]
#[from(TrustGroupIssuer)]
pub struct IssuerCertificateVersionDTO {
    pub group_id: TrustGroupId,
    pub version: u32,
    pub created_date: OffsetDateTime,
    pub serial_number: String,
    pub certificate: Vec<u8>,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}
