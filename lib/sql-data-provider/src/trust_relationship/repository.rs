use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use shared_types::EntityId;
use vault_core::model::trust_relationship::TrustRelationship;
use vault_core::repository::error::DataLayerError;
use vault_core::repository::trust_relationship_repository::TrustRelationshipRepository;

use super::TrustRelationshipProvider;
use crate::entity::trust_relationship;
use crate::mapper::to_data_layer_error;

#[async_trait]
impl TrustRelationshipRepository for TrustRelationshipProvider {
    async fn add(&self, relationship: TrustRelationship) -> Result<(), DataLayerError> {
        trust_relationship::Entity::insert(trust_relationship::ActiveModel {
            entity_id: Set(relationship.entity_id),
            trusted_entity_id: Set(relationship.trusted_entity_id),
            created_date: Set(relationship.created_date),
        })
        .on_conflict(
            OnConflict::columns([
                trust_relationship::Column::EntityId,
                trust_relationship::Column::TrustedEntityId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .map_err(to_data_layer_error)?;

        Ok(())
    }

    async fn remove(
        &self,
        entity_id: EntityId,
        trusted_entity_id: EntityId,
    ) -> Result<(), DataLayerError> {
        trust_relationship::Entity::delete_many()
            .filter(trust_relationship::Column::EntityId.eq(entity_id))
            .filter(trust_relationship::Column::TrustedEntityId.eq(trusted_entity_id))
            .exec(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(())
    }

    async fn list_trusted(&self, entity_id: EntityId) -> Result<Vec<EntityId>, DataLayerError> {
        trust_relationship::Entity::find()
            .select_only()
            .column(trust_relationship::Column::TrustedEntityId)
            .filter(trust_relationship::Column::EntityId.eq(entity_id))
            .order_by_asc(trust_relationship::Column::TrustedEntityId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)
    }
}
