use std::collections::HashMap;
use std::collections::hash_map::Entry;

use shared_types::{EntityId, TrustGroupId};
use time::OffsetDateTime;

use super::TrustRelationshipService;
use super::dto::{GetTrustedCertificateListResponseDTO, TrustedCertificateDTO};
use crate::common_mapper::{decode_page_token, to_list_response};
use crate::model::list_query::{GetListResponse, ListQuery};
use crate::model::trust_relationship::TrustRelationship;
use crate::service::certificate_request::mapper::request_cursor;
use crate::service::certificate_request::validator::validate_entity_id;
use crate::service::error::ServiceError;
use crate::service::permission::{Role, Session, permission_check};
use crate::util::retry::retry_transient;

impl TrustRelationshipService {
    /// `entity_id` starts trusting certificates issued to `trusted_entity_id`. Idempotent.
    pub async fn add_trust_relationship(
        &self,
        session: &Session,
        entity_id: EntityId,
        trusted_entity_id: EntityId,
    ) -> Result<(), ServiceError> {
        permission_check(session, &[Role::Writer, Role::Manager])?;

        validate_entity_id(&entity_id)?;
        validate_entity_id(&trusted_entity_id)?;

        // an entity implicitly trusts itself
        if entity_id == trusted_entity_id {
            return Ok(());
        }

        self.trust_relationship_repository
            .add(TrustRelationship {
                entity_id: entity_id.clone(),
                trusted_entity_id: trusted_entity_id.clone(),
                created_date: OffsetDateTime::now_utc(),
            })
            .await?;

        tracing::info!("Entity {entity_id} trusts {trusted_entity_id}");
        Ok(())
    }

    /// Idempotent, removing a missing edge succeeds
    pub async fn remove_trust_relationship(
        &self,
        session: &Session,
        entity_id: EntityId,
        untrusted_entity_id: EntityId,
    ) -> Result<(), ServiceError> {
        permission_check(session, &[Role::Writer, Role::Manager])?;

        validate_entity_id(&entity_id)?;
        validate_entity_id(&untrusted_entity_id)?;

        if entity_id == untrusted_entity_id {
            return Ok(());
        }

        self.trust_relationship_repository
            .remove(entity_id.clone(), untrusted_entity_id.clone())
            .await?;

        tracing::info!("Entity {entity_id} no longer trusts {untrusted_entity_id}");
        Ok(())
    }

    /// Direct trust edges of `entity_id`
    pub async fn list_trusted_entities(
        &self,
        entity_id: EntityId,
    ) -> Result<Vec<EntityId>, ServiceError> {
        self.load_trusted(&entity_id).await
    }

    /// Certificates issued to the entities `entity_id` trusts directly, in issuance order.
    /// Trust does not propagate: entities trusted by a trusted entity are not included.
    pub async fn list_trusted_certificates(
        &self,
        entity_id: EntityId,
        query: ListQuery,
    ) -> Result<GetTrustedCertificateListResponseDTO, ServiceError> {
        let after = decode_page_token(query.page_token.as_deref())?;
        let page_size = self.config.pagination.page_size(query.page_size);

        let trusted = self.load_trusted(&entity_id).await?;
        if trusted.is_empty() {
            return Ok(GetListResponse {
                values: vec![],
                next_page_token: None,
            });
        }

        let requests = retry_transient(&self.config.retry, "list issued certificates", || {
            self.certificate_request_repository.list_issued_certificates(
                trusted.clone(),
                after.clone(),
                u64::from(page_size) + 1,
            )
        })
        .await?;
        let page = to_list_response(requests, page_size, request_cursor)?;

        let mut chains: HashMap<(TrustGroupId, Option<u32>), Vec<Vec<u8>>> = HashMap::new();
        let mut values = Vec::with_capacity(page.values.len());
        for request in page.values {
            let Some(certificate) = request.certificate else {
                continue;
            };

            let issuer_chain = match chains.entry((request.group_id, request.issuer_version)) {
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => entry
                    .insert(
                        self.issuer_chain(request.group_id, request.issuer_version)
                            .await?,
                    )
                    .clone(),
            };

            values.push(TrustedCertificateDTO {
                entity_id: request.entity_id,
                request_id: request.id,
                group_id: request.group_id,
                certificate,
                issuer_chain,
            });
        }

        Ok(GetListResponse {
            values,
            next_page_token: page.next_page_token,
        })
    }

    async fn load_trusted(&self, entity_id: &EntityId) -> Result<Vec<EntityId>, ServiceError> {
        let mut trusted = retry_transient(&self.config.retry, "list trusted entities", || {
            self.trust_relationship_repository
                .list_trusted(entity_id.clone())
        })
        .await?;

        trusted.retain(|trusted| trusted != entity_id);
        Ok(trusted)
    }

    /// Chain of the issuer version that signed the certificate. Certificates of deleted
    /// groups are still listed, without a chain.
    async fn issuer_chain(
        &self,
        group_id: TrustGroupId,
        issuer_version: Option<u32>,
    ) -> Result<Vec<Vec<u8>>, ServiceError> {
        match self
            .issuer_chain_service
            .resolve_certificate_chain_for_issuer(group_id, issuer_version)
            .await
        {
            Err(ServiceError::EntityNotFound(_)) => {
                tracing::debug!("Issuing trust group {group_id} no longer exists");
                Ok(vec![])
            }
            result => result,
        }
    }
}
