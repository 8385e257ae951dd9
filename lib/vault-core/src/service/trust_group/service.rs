use shared_types::TrustGroupId;
use time::OffsetDateTime;

use super::TrustGroupService;
use super::dto::{
    CreateTrustGroupRequestDTO, GetTrustGroupListResponseDTO, GetTrustGroupResponseDTO,
    UpdateTrustGroupRequestDTO,
};
use super::mapper::{
    GroupParameters, group_cursor, issuer_from_generated, trust_group_from_parameters,
    update_request_from,
};
use super::validator::{validate_algorithm, validate_group_parameters, validate_issuer_material};
use crate::common_mapper::{decode_page_token, list_response_into, to_list_response};
use crate::model::list_query::ListQuery;
use crate::model::trust_group::{TrustGroup, TrustGroupIssuer, TrustGroupParentFilter};
use crate::provider::key_vault::guard::{KeyHandleGuard, purge_key};
use crate::provider::key_vault::model::{GeneratedIssuer, IssuerKeyRequest, IssuerReference};
use crate::repository::error::DataLayerError;
use crate::service::error::{ConflictError, EntityNotFoundError, ServiceError, ValidationError};
use crate::service::permission::{Role, Session, permission_check};
use crate::util::retry::retry_transient;
use crate::util::validity::validity_period;
use crate::util::x509::DistinguishedName;

impl TrustGroupService {
    /// Creates a group with a self-signed issuer certificate
    pub async fn create_root(
        &self,
        session: &Session,
        request: CreateTrustGroupRequestDTO,
    ) -> Result<TrustGroupId, ServiceError> {
        self.create_group(session, None, request).await
    }

    /// Creates a group whose issuer certificate is signed by the current issuer of `parent_id`
    pub async fn create_sub_group(
        &self,
        session: &Session,
        parent_id: TrustGroupId,
        request: CreateTrustGroupRequestDTO,
    ) -> Result<TrustGroupId, ServiceError> {
        self.create_group(session, Some(parent_id), request).await
    }

    #[tracing::instrument(level = "debug", skip(self, session, request), err(Debug))]
    pub async fn create_group(
        &self,
        session: &Session,
        parent_id: Option<TrustGroupId>,
        request: CreateTrustGroupRequestDTO,
    ) -> Result<TrustGroupId, ServiceError> {
        permission_check(session, &[Role::Manager])?;

        let parameters = GroupParameters::from_request(&request, &self.config.trust_group);
        let subject = validate_group_parameters(&parameters, &self.config.trust_group)?;

        let now = OffsetDateTime::now_utc();
        let parent_issuer = match parent_id {
            None => None,
            Some(parent_id) => {
                let parent = self
                    .load_group(parent_id)
                    .await?
                    .ok_or(EntityNotFoundError::ParentTrustGroup(parent_id))?;
                Some(validate_issuer_material(&parent, now)?.to_owned())
            }
        };

        let generated = self
            .generate_issuer(subject, &parameters, parent_issuer.as_ref(), now)
            .await?;
        let guard = KeyHandleGuard::new(self.key_vault.clone(), generated.key_handle.clone());

        let id = TrustGroupId::new_v4();
        let parent_version = parent_issuer.as_ref().map(|issuer| issuer.version);
        let issuer = issuer_from_generated(id, 1, parent_version, generated, now);
        let group = trust_group_from_parameters(
            id,
            parent_id,
            request.certificate_type,
            parameters,
            issuer,
            now,
        );

        match self.trust_group_repository.create(group).await {
            Ok(id) => {
                guard.disarm();
                tracing::info!("Created trust group {id} (parent: {parent_id:?})");
                Ok(id)
            }
            Err(err) => {
                guard.discard().await;
                Err(match (err, parent_id) {
                    // parent deleted in the meantime
                    (DataLayerError::IncorrectParameters, Some(parent_id)) => {
                        EntityNotFoundError::ParentTrustGroup(parent_id).into()
                    }
                    (err, _) => err.into(),
                })
            }
        }
    }

    pub async fn get_group(
        &self,
        group_id: TrustGroupId,
    ) -> Result<GetTrustGroupResponseDTO, ServiceError> {
        let group = self
            .load_group(group_id)
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(group_id))?;

        Ok(group.into())
    }

    pub async fn list_groups(
        &self,
        filter: TrustGroupParentFilter,
        query: ListQuery,
    ) -> Result<GetTrustGroupListResponseDTO, ServiceError> {
        let after = decode_page_token(query.page_token.as_deref())?;
        let page_size = self.config.pagination.page_size(query.page_size);

        let groups = retry_transient(&self.config.retry, "list trust groups", || {
            self.trust_group_repository
                .list(filter.clone(), after.clone(), u64::from(page_size) + 1)
        })
        .await?;

        let response = to_list_response(groups, page_size, group_cursor)?;
        Ok(list_response_into(response))
    }

    /// Changes parameters of future issuance, the current issuer certificate stays untouched
    pub async fn update_group(
        &self,
        session: &Session,
        group_id: TrustGroupId,
        request: UpdateTrustGroupRequestDTO,
    ) -> Result<(), ServiceError> {
        permission_check(session, &[Role::Manager])?;

        let group = self
            .load_group(group_id)
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(group_id))?;

        if request
            .expected_version
            .is_some_and(|expected| expected != group.version)
        {
            return Err(ConflictError::ConcurrentModification.into());
        }

        let parameters = GroupParameters::with_update(&group, &request);
        validate_group_parameters(&parameters, &self.config.trust_group)?;

        self.trust_group_repository
            .update(
                group_id,
                group.version,
                update_request_from(&request, parameters),
            )
            .await?;

        tracing::info!("Updated trust group {group_id}");
        Ok(())
    }

    /// Rotates the issuer key pair and certificate, returns the new issuer version.
    /// Older issuer versions stay resolvable until the group is deleted.
    #[tracing::instrument(level = "debug", skip(self, session), err(Debug))]
    pub async fn renew_issuer_certificate(
        &self,
        session: &Session,
        group_id: TrustGroupId,
    ) -> Result<u32, ServiceError> {
        permission_check(session, &[Role::Manager])?;

        let _lock = self.group_locks.lock(&group_id).await;

        let group = self
            .load_group(group_id)
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(group_id))?;

        validate_algorithm(
            &self.config.trust_group,
            group.signature_algorithm,
            group.key_size,
        )?;
        let subject =
            DistinguishedName::parse(&group.subject_name).map_err(ValidationError::from)?;

        let now = OffsetDateTime::now_utc();
        let parent_issuer = match group.parent_id {
            None => None,
            Some(parent_id) => {
                let parent = self.load_group(parent_id).await?.ok_or(
                    ServiceError::CorruptHierarchy {
                        group_id,
                        broken_at: parent_id,
                    },
                )?;
                Some(validate_issuer_material(&parent, now)?.to_owned())
            }
        };

        let parameters = GroupParameters::with_update(&group, &Default::default());
        let generated = self
            .generate_issuer(subject, &parameters, parent_issuer.as_ref(), now)
            .await?;
        let guard = KeyHandleGuard::new(self.key_vault.clone(), generated.key_handle.clone());

        let version = group
            .issuer
            .as_ref()
            .map_or(1, |issuer| issuer.version + 1);
        let parent_version = parent_issuer.as_ref().map(|issuer| issuer.version);

        if let Err(err) = self
            .trust_group_repository
            .add_issuer(issuer_from_generated(
                group_id,
                version,
                parent_version,
                generated,
                now,
            ))
            .await
        {
            guard.discard().await;
            return Err(err.into());
        }
        guard.disarm();

        tracing::info!("Renewed issuer of trust group {group_id}, version {version}");
        Ok(version)
    }

    /// Removes the group and purges the key material of all of its issuer versions.
    /// Child groups have to be deleted first.
    #[tracing::instrument(level = "debug", skip(self, session), err(Debug))]
    pub async fn delete_group(
        &self,
        session: &Session,
        group_id: TrustGroupId,
    ) -> Result<(), ServiceError> {
        permission_check(session, &[Role::Manager])?;

        let _lock = self.group_locks.lock(&group_id).await;

        self.load_group(group_id)
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(group_id))?;

        if self.trust_group_repository.has_children(group_id).await? {
            return Err(ConflictError::HasChildGroups(group_id).into());
        }

        let history = self
            .trust_group_repository
            .get_issuer_history(group_id)
            .await?;

        self.trust_group_repository
            .delete(group_id)
            .await
            .map_err(|err| match err {
                // a child was created concurrently
                DataLayerError::IncorrectParameters => {
                    ConflictError::HasChildGroups(group_id).into()
                }
                DataLayerError::RecordNotFound => EntityNotFoundError::TrustGroup(group_id).into(),
                err => ServiceError::from(err),
            })?;

        for issuer in history {
            purge_key(self.key_vault.as_ref(), issuer.key_handle).await;
        }

        tracing::info!("Deleted trust group {group_id}");
        Ok(())
    }

    async fn load_group(&self, group_id: TrustGroupId) -> Result<Option<TrustGroup>, ServiceError> {
        Ok(
            retry_transient(&self.config.retry, "get trust group", || {
                self.trust_group_repository.get(group_id)
            })
            .await?,
        )
    }

    async fn generate_issuer(
        &self,
        subject: DistinguishedName,
        parameters: &GroupParameters,
        parent_issuer: Option<&TrustGroupIssuer>,
        now: OffsetDateTime,
    ) -> Result<GeneratedIssuer, ServiceError> {
        let lifetime = parameters.lifetime;
        let (not_before, not_after) = validity_period(
            now,
            lifetime,
            parent_issuer.map(|issuer| issuer.not_after),
        )
        .ok_or_else(|| {
            ValidationError::InvalidLifetime(format!(
                "no validity left for a {lifetime} months issuer certificate"
            ))
        })?;

        let request = IssuerKeyRequest {
            subject,
            signature_algorithm: parameters.signature_algorithm,
            key_size: parameters.key_size,
            not_before,
            not_after,
        };
        let parent: Option<IssuerReference> = parent_issuer.map(Into::into);

        retry_transient(&self.config.retry, "generate issuer", || {
            self.key_vault
                .generate_issuer(request.clone(), parent.clone())
        })
        .await
        .map_err(|err| {
            tracing::warn!("Failed to generate issuer certificate: {err}");
            err.into()
        })
    }
}
