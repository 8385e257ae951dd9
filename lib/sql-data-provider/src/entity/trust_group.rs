use one_dto_mapper::{From, Into};
use sea_orm::entity::prelude::*;
use shared_types::TrustGroupId;
use time::OffsetDateTime;
use vault_core::model;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trust_group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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
    pub sort_key: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Parent,
    #[sea_orm(has_many = "super::trust_group_issuer::Entity")]
    TrustGroupIssuer,
}

impl Related<super::trust_group_issuer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrustGroupIssuer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, From, Into)]
#[from(model::trust_group::CertificateType)]
#[into(model::trust_group::CertificateType)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "trust_group_certificate_type"
)]
pub enum CertificateType {
    #[sea_orm(string_value = "APPLICATION_INSTANCE_CERTIFICATE")]
    ApplicationInstanceCertificate,
    #[sea_orm(string_value = "HTTPS_CERTIFICATE")]
    HttpsCertificate,
    #[sea_orm(string_value = "USER_CREDENTIAL_CERTIFICATE")]
    UserCredentialCertificate,
}

#[derive(Clone, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, From, Into)]
#[from(model::trust_group::SignatureAlgorithm)]
#[into(model::trust_group::SignatureAlgorithm)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "signature_algorithm")]
pub enum SignatureAlgorithm {
    #[sea_orm(string_value = "RSA_SHA256")]
    RsaSha256,
    #[sea_orm(string_value = "RSA_SHA384")]
    RsaSha384,
    #[sea_orm(string_value = "RSA_SHA512")]
    RsaSha512,
    #[sea_orm(string_value = "ECDSA_P256_SHA256")]
    EcdsaP256Sha256,
    #[sea_orm(string_value = "ECDSA_P384_SHA384")]
    EcdsaP384Sha384,
    #[sea_orm(string_value = "EDDSA")]
    Eddsa,
}
