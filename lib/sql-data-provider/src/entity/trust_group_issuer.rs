use sea_orm::entity::prelude::*;
use shared_types::{KeyHandle, TrustGroupId};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trust_group_issuer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: TrustGroupId,
    #[sea_orm(primary_key, auto_increment = false)]
    pub version: u32,
    pub created_date: OffsetDateTime,
    pub serial_number: String,
    #[sea_orm(column_type = "Blob")]
    pub certificate: Vec<u8>,
    #[sea_orm(column_type = "Blob")]
    pub crl: Vec<u8>,
    pub key_handle: KeyHandle,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub parent_version: Option<u32>,
    pub crl_number: u32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trust_group::Entity",
        from = "Column::GroupId",
        to = "super::trust_group::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    TrustGroup,
}

impl Related<super::trust_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrustGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
