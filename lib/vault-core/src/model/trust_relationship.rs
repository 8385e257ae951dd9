use shared_types::EntityId;
use time::OffsetDateTime;

/// Directed edge: `entity_id` trusts the certificates issued to `trusted_entity_id`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustRelationship {
    pub entity_id: EntityId,
    pub trusted_entity_id: EntityId,
    pub created_date: OffsetDateTime,
}
