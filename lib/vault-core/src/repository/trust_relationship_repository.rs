use shared_types::EntityId;

use super::error::DataLayerError;
use crate::model::trust_relationship::TrustRelationship;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait TrustRelationshipRepository: Send + Sync {
    /// Succeeds if the edge already exists
    async fn add(&self, relationship: TrustRelationship) -> Result<(), DataLayerError>;

    /// Succeeds if the edge does not exist
    async fn remove(
        &self,
        entity_id: EntityId,
        trusted_entity_id: EntityId,
    ) -> Result<(), DataLayerError>;

    /// Targets of the outgoing edges of `entity_id`
    async fn list_trusted(&self, entity_id: EntityId) -> Result<Vec<EntityId>, DataLayerError>;
}
