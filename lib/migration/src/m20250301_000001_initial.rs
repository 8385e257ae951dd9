use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::{
    big_integer, boolean, string, string_null, text, text_null, unsigned, unsigned_null,
};

use crate::datatype::{blob, blob_null, timestamp, timestamp_null, uuid_char, uuid_char_null};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrustGroup::Table)
                    .col(uuid_char(TrustGroup::Id).primary_key())
                    .col(timestamp(TrustGroup::CreatedDate, manager))
                    .col(timestamp(TrustGroup::LastModified, manager))
                    .col(uuid_char_null(TrustGroup::ParentId))
                    .col(string(TrustGroup::Name))
                    .col(string(TrustGroup::CertificateType))
                    .col(string(TrustGroup::SubjectName))
                    .col(unsigned(TrustGroup::Lifetime))
                    .col(unsigned(TrustGroup::KeySize))
                    .col(string(TrustGroup::SignatureAlgorithm))
                    .col(unsigned(TrustGroup::IssuedLifetime))
                    .col(unsigned(TrustGroup::IssuedKeySize))
                    .col(string(TrustGroup::IssuedSignatureAlgorithm))
                    .col(unsigned(TrustGroup::Version))
                    .col(big_integer(TrustGroup::SortKey))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-TrustGroup-ParentId")
                            .from_tbl(TrustGroup::Table)
                            .from_col(TrustGroup::ParentId)
                            .to_tbl(TrustGroup::Table)
                            .to_col(TrustGroup::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("index-TrustGroup-SortKey-Id")
                    .table(TrustGroup::Table)
                    .col(TrustGroup::SortKey)
                    .col(TrustGroup::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("index-TrustGroup-ParentId")
                    .table(TrustGroup::Table)
                    .col(TrustGroup::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrustGroupIssuer::Table)
                    .col(uuid_char(TrustGroupIssuer::GroupId))
                    .col(unsigned(TrustGroupIssuer::Version))
                    .col(timestamp(TrustGroupIssuer::CreatedDate, manager))
                    .col(string(TrustGroupIssuer::SerialNumber))
                    .col(blob(TrustGroupIssuer::Certificate, manager))
                    .col(blob(TrustGroupIssuer::Crl, manager))
                    .col(string(TrustGroupIssuer::KeyHandle))
                    .col(timestamp(TrustGroupIssuer::NotBefore, manager))
                    .col(timestamp(TrustGroupIssuer::NotAfter, manager))
                    .col(unsigned_null(TrustGroupIssuer::ParentVersion))
                    .col(unsigned(TrustGroupIssuer::CrlNumber))
                    .primary_key(
                        Index::create()
                            .name("pk-TrustGroupIssuer")
                            .col(TrustGroupIssuer::GroupId)
                            .col(TrustGroupIssuer::Version),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-TrustGroupIssuer-GroupId")
                            .from_tbl(TrustGroupIssuer::Table)
                            .from_col(TrustGroupIssuer::GroupId)
                            .to_tbl(TrustGroup::Table)
                            .to_col(TrustGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // no foreign key on the group, issued certificates outlive their group
        manager
            .create_table(
                Table::create()
                    .table(CertificateRequest::Table)
                    .col(uuid_char(CertificateRequest::Id).primary_key())
                    .col(timestamp(CertificateRequest::CreatedDate, manager))
                    .col(timestamp(CertificateRequest::LastModified, manager))
                    .col(string(CertificateRequest::EntityId))
                    .col(uuid_char(CertificateRequest::GroupId))
                    .col(string(CertificateRequest::RequestType))
                    .col(string(CertificateRequest::State))
                    .col(string_null(CertificateRequest::SubjectName))
                    .col(text(CertificateRequest::DomainNames))
                    .col(blob_null(CertificateRequest::Csr, manager))
                    .col(string_null(CertificateRequest::PrivateKeyFormat))
                    .col(text_null(CertificateRequest::ErrorInfo))
                    .col(blob_null(CertificateRequest::Certificate, manager))
                    .col(unsigned_null(CertificateRequest::IssuerVersion))
                    .col(string_null(CertificateRequest::PrivateKeyHandle))
                    .col(boolean(CertificateRequest::KeyMaterialAvailable))
                    .col(string(CertificateRequest::SubmittedBy))
                    .col(timestamp(CertificateRequest::SubmittedDate, manager))
                    .col(string_null(CertificateRequest::ApprovedBy))
                    .col(timestamp_null(CertificateRequest::ApprovedDate, manager))
                    .col(string_null(CertificateRequest::AcceptedBy))
                    .col(timestamp_null(CertificateRequest::AcceptedDate, manager))
                    .col(string_null(CertificateRequest::RevokedBy))
                    .col(timestamp_null(CertificateRequest::RevokedDate, manager))
                    .col(unsigned(CertificateRequest::Version))
                    .col(big_integer(CertificateRequest::SortKey))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("index-CertificateRequest-SortKey-Id")
                    .table(CertificateRequest::Table)
                    .col(CertificateRequest::SortKey)
                    .col(CertificateRequest::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("index-CertificateRequest-EntityId")
                    .table(CertificateRequest::Table)
                    .col(CertificateRequest::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrustRelationship::Table)
                    .col(string(TrustRelationship::EntityId))
                    .col(string(TrustRelationship::TrustedEntityId))
                    .col(timestamp(TrustRelationship::CreatedDate, manager))
                    .primary_key(
                        Index::create()
                            .name("pk-TrustRelationship")
                            .col(TrustRelationship::EntityId)
                            .col(TrustRelationship::TrustedEntityId),
                    )
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum TrustGroup {
    Table,
    Id,
    CreatedDate,
    LastModified,
    ParentId,
    Name,
    CertificateType,
    SubjectName,
    Lifetime,
    KeySize,
    SignatureAlgorithm,
    IssuedLifetime,
    IssuedKeySize,
    IssuedSignatureAlgorithm,
    Version,
    SortKey,
}

#[derive(Iden)]
pub enum TrustGroupIssuer {
    Table,
    GroupId,
    Version,
    CreatedDate,
    SerialNumber,
    Certificate,
    Crl,
    KeyHandle,
    NotBefore,
    NotAfter,
    ParentVersion,
    CrlNumber,
}

#[derive(Iden)]
pub enum CertificateRequest {
    Table,
    Id,
    CreatedDate,
    LastModified,
    EntityId,
    GroupId,
    RequestType,
    State,
    SubjectName,
    DomainNames,
    Csr,
    PrivateKeyFormat,
    ErrorInfo,
    Certificate,
    IssuerVersion,
    PrivateKeyHandle,
    KeyMaterialAvailable,
    SubmittedBy,
    SubmittedDate,
    ApprovedBy,
    ApprovedDate,
    AcceptedBy,
    AcceptedDate,
    RevokedBy,
    RevokedDate,
    Version,
    SortKey,
}

#[derive(Iden)]
pub enum TrustRelationship {
    Table,
    EntityId,
    TrustedEntityId,
    CreatedDate,
}
