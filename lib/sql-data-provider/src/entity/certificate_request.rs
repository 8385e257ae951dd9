use one_dto_mapper::{From, Into};
use sea_orm::entity::prelude::*;
use shared_types::{CertificateRequestId, EntityId, KeyHandle, TrustGroupId};
use time::OffsetDateTime;
use vault_core::model;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "certificate_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: CertificateRequestId,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
    pub entity_id: EntityId,
    pub group_id: TrustGroupId,
    pub request_type: CertificateRequestType,
    pub state: CertificateRequestState,
    pub subject_name: Option<String>,
    /// JSON array
    #[sea_orm(column_type = "Text")]
    pub domain_names: String,
    #[sea_orm(column_type = "Blob", nullable)]
    pub csr: Option<Vec<u8>>,
    pub private_key_format: Option<PrivateKeyFormat>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_info: Option<String>,
    #[sea_orm(column_type = "Blob", nullable)]
    pub certificate: Option<Vec<u8>>,
    pub issuer_version: Option<u32>,
    pub private_key_handle: Option<KeyHandle>,
    pub key_material_available: bool,
    pub submitted_by: String,
    pub submitted_date: OffsetDateTime,
    pub approved_by: Option<String>,
    pub approved_date: Option<OffsetDateTime>,
    pub accepted_by: Option<String>,
    pub accepted_date: Option<OffsetDateTime>,
    pub revoked_by: Option<String>,
    pub revoked_date: Option<OffsetDateTime>,
    pub version: u32,
    pub sort_key: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, From, Into)]
#[from(model::certificate_request::CertificateRequestType)]
#[into(model::certificate_request::CertificateRequestType)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "certificate_request_type"
)]
pub enum CertificateRequestType {
    #[sea_orm(string_value = "SIGNING_REQUEST")]
    SigningRequest,
    #[sea_orm(string_value = "KEY_PAIR_REQUEST")]
    KeyPairRequest,
}

#[derive(Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, From, Into)]
#[from(model::certificate_request::CertificateRequestState)]
#[into(model::certificate_request::CertificateRequestState)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "certificate_request_state"
)]
pub enum CertificateRequestState {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "FAILURE")]
    Failure,
}

#[derive(Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, From, Into)]
#[from(model::certificate_request::PrivateKeyFormat)]
#[into(model::certificate_request::PrivateKeyFormat)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "private_key_format")]
pub enum PrivateKeyFormat {
    #[sea_orm(string_value = "PEM")]
    Pem,
    #[sea_orm(string_value = "DER")]
    Der,
}
