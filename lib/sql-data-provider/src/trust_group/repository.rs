use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use shared_types::TrustGroupId;
use time::OffsetDateTime;
use vault_core::model::list_query::PageCursor;
use vault_core::model::trust_group::{
    TrustGroup, TrustGroupIssuer, TrustGroupParentFilter, UpdateTrustGroupRequest,
};
use vault_core::repository::error::DataLayerError;
use vault_core::repository::trust_group_repository::TrustGroupRepository;

use super::TrustGroupProvider;
use crate::entity::{trust_group, trust_group_issuer};
use crate::list_query::SelectAfterCursor;
use crate::mapper::{to_data_layer_error, to_update_data_layer_error};

#[async_trait]
impl TrustGroupRepository for TrustGroupProvider {
    async fn create(&self, group: TrustGroup) -> Result<TrustGroupId, DataLayerError> {
        let issuer = group
            .issuer
            .clone()
            .ok_or(DataLayerError::MissingRequiredRelation {
                relation: "trust_group-issuer",
                id: group.id.to_string(),
            })?;
        let id = group.id;

        let txn = self.db.begin().await.map_err(to_data_layer_error)?;

        trust_group::Entity::insert(trust_group::ActiveModel::from(group))
            .exec_without_returning(&txn)
            .await
            .map_err(to_data_layer_error)?;

        trust_group_issuer::Entity::insert(trust_group_issuer::ActiveModel::from(issuer))
            .exec_without_returning(&txn)
            .await
            .map_err(to_data_layer_error)?;

        txn.commit().await.map_err(to_data_layer_error)?;

        Ok(id)
    }

    async fn get(&self, id: TrustGroupId) -> Result<Option<TrustGroup>, DataLayerError> {
        let Some(model) = trust_group::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(to_data_layer_error)?
        else {
            return Ok(None);
        };

        let issuer = trust_group_issuer::Entity::find()
            .filter(trust_group_issuer::Column::GroupId.eq(id))
            .order_by_desc(trust_group_issuer::Column::Version)
            .one(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        let mut group = TrustGroup::from(model);
        group.issuer = issuer.map(Into::into);
        Ok(Some(group))
    }

    async fn get_issuer_history(
        &self,
        id: TrustGroupId,
    ) -> Result<Vec<TrustGroupIssuer>, DataLayerError> {
        let issuers = trust_group_issuer::Entity::find()
            .filter(trust_group_issuer::Column::GroupId.eq(id))
            .order_by_desc(trust_group_issuer::Column::Version)
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(issuers.into_iter().map(Into::into).collect())
    }

    async fn get_issuer(
        &self,
        id: TrustGroupId,
        version: u32,
    ) -> Result<Option<TrustGroupIssuer>, DataLayerError> {
        let issuer = trust_group_issuer::Entity::find_by_id((id, version))
            .one(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(issuer.map(Into::into))
    }

    async fn update_issuer_crl(
        &self,
        id: TrustGroupId,
        version: u32,
        expected_crl_number: u32,
        crl: Vec<u8>,
    ) -> Result<(), DataLayerError> {
        let update_model = trust_group_issuer::ActiveModel {
            crl: Set(crl),
            crl_number: Set(expected_crl_number + 1),
            ..Default::default()
        };

        let result = trust_group_issuer::Entity::update_many()
            .set(update_model)
            .filter(trust_group_issuer::Column::GroupId.eq(id))
            .filter(trust_group_issuer::Column::Version.eq(version))
            .filter(trust_group_issuer::Column::CrlNumber.eq(expected_crl_number))
            .exec(&self.db)
            .await
            .map_err(to_update_data_layer_error)?;

        if result.rows_affected == 0 {
            return Err(DataLayerError::RecordNotUpdated);
        }

        Ok(())
    }

    async fn update(
        &self,
        id: TrustGroupId,
        expected_version: u32,
        request: UpdateTrustGroupRequest,
    ) -> Result<(), DataLayerError> {
        let update_model = trust_group::ActiveModel {
            last_modified: Set(OffsetDateTime::now_utc()),
            version: Set(expected_version + 1),
            name: request.name.map(Set).unwrap_or_default(),
            subject_name: request.subject_name.map(Set).unwrap_or_default(),
            lifetime: request.lifetime.map(Set).unwrap_or_default(),
            key_size: request.key_size.map(Set).unwrap_or_default(),
            signature_algorithm: request
                .signature_algorithm
                .map(|algorithm| Set(algorithm.into()))
                .unwrap_or_default(),
            issued_lifetime: request.issued_lifetime.map(Set).unwrap_or_default(),
            issued_key_size: request.issued_key_size.map(Set).unwrap_or_default(),
            issued_signature_algorithm: request
                .issued_signature_algorithm
                .map(|algorithm| Set(algorithm.into()))
                .unwrap_or_default(),
            ..Default::default()
        };

        let result = trust_group::Entity::update_many()
            .set(update_model)
            .filter(trust_group::Column::Id.eq(id))
            .filter(trust_group::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(to_update_data_layer_error)?;

        if result.rows_affected == 0 {
            return Err(DataLayerError::RecordNotUpdated);
        }

        Ok(())
    }

    async fn add_issuer(&self, issuer: TrustGroupIssuer) -> Result<(), DataLayerError> {
        // (group_id, version) is the primary key, a concurrent renewal of the same version fails
        trust_group_issuer::Entity::insert(trust_group_issuer::ActiveModel::from(issuer))
            .exec_without_returning(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(())
    }

    async fn has_children(&self, id: TrustGroupId) -> Result<bool, DataLayerError> {
        let children = trust_group::Entity::find()
            .filter(trust_group::Column::ParentId.eq(id))
            .count(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(children > 0)
    }

    async fn delete(&self, id: TrustGroupId) -> Result<(), DataLayerError> {
        let result = trust_group::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        if result.rows_affected == 0 {
            return Err(DataLayerError::RecordNotFound);
        }

        Ok(())
    }

    async fn list(
        &self,
        filter: TrustGroupParentFilter,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Result<Vec<TrustGroup>, DataLayerError> {
        let query = trust_group::Entity::find();
        let query = match filter {
            TrustGroupParentFilter::Any => query,
            TrustGroupParentFilter::Roots => query.filter(trust_group::Column::ParentId.is_null()),
            TrustGroupParentFilter::Children(parent_id) => {
                query.filter(trust_group::Column::ParentId.eq(parent_id))
            }
        };

        let models = query
            .after_cursor(
                trust_group::Column::SortKey,
                trust_group::Column::Id,
                after,
                limit,
            )
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        if models.is_empty() {
            return Ok(vec![]);
        }

        let mut current_issuers: HashMap<TrustGroupId, trust_group_issuer::Model> = HashMap::new();
        for issuer in trust_group_issuer::Entity::find()
            .filter(trust_group_issuer::Column::GroupId.is_in(models.iter().map(|model| model.id)))
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?
        {
            match current_issuers.get(&issuer.group_id) {
                Some(current) if current.version >= issuer.version => {}
                _ => {
                    current_issuers.insert(issuer.group_id, issuer);
                }
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let issuer = current_issuers.remove(&model.id).map(Into::into);
                TrustGroup {
                    issuer,
                    ..TrustGroup::from(model)
                }
            })
            .collect())
    }
}
