use secrecy::SecretSlice;
use shared_types::{CertificateRequestId, KeyHandle, TrustGroupId};
use time::{Duration, OffsetDateTime};

use super::CertificateRequestService;
use super::dto::{
    FinishKeyPairRequestResponseDTO, FinishSigningRequestResponseDTO,
    GetCertificateRequestListResponseDTO, GetCertificateRequestResponseDTO,
    StartKeyPairRequestDTO, StartSigningRequestDTO,
};
use super::mapper::{key_pair_request_from_dto, request_cursor, signing_request_from_dto};
use super::state_machine::{WorkflowAction, transition};
use super::validator::{validate_domain_names, validate_entity_id};
use crate::common_mapper::{decode_page_token, list_response_into, to_list_response};
use crate::model::certificate_request::{
    CertificateRequest, CertificateRequestFilter, CertificateRequestState,
    CertificateRequestType, UpdateCertificateRequestState,
};
use crate::model::common::OperationStamp;
use crate::model::list_query::ListQuery;
use crate::model::trust_group::{TrustGroup, TrustGroupIssuer};
use crate::provider::key_vault::error::KeyVaultError;
use crate::provider::key_vault::guard::{KeyHandleGuard, purge_key};
use crate::provider::key_vault::model::{
    CrlRequest, IssuerReference, KeyPairRequest, RevokedCertificate, SignRequest,
};
use crate::repository::error::DataLayerError;
use crate::service::error::{
    ConflictError, EntityNotFoundError, InvalidStateError, ServiceError, ValidationError,
};
use crate::service::permission::{Role, Session, permission_check};
use crate::service::trust_group::validator::validate_issuer_material;
use crate::util::retry::retry_transient;
use crate::util::validity::validity_period;
use crate::util::x509::{DistinguishedName, certificate_serial, parse_csr};

/// Output of the cryptographic step of an approval
struct IssuedArtifact {
    certificate: Vec<u8>,
    key_handle: Option<KeyHandle>,
}

impl CertificateRequestService {
    #[tracing::instrument(level = "debug", skip(self, session, request), err(Debug))]
    pub async fn start_signing_request(
        &self,
        session: &Session,
        request: StartSigningRequestDTO,
    ) -> Result<CertificateRequestId, ServiceError> {
        permission_check(session, &[Role::Writer, Role::Manager])?;

        validate_entity_id(&request.entity_id)?;
        let csr = parse_csr(&request.certificate_request)
            .map_err(|err| ValidationError::InvalidCsr(err.to_string()))?;

        let subject_name = match request
            .subject_name
            .as_deref()
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
        {
            Some(subject) => {
                DistinguishedName::parse(subject).map_err(ValidationError::from)?;
                Some(subject.to_owned())
            }
            None => Some(csr.subject).filter(|subject| !subject.is_empty()),
        };

        self.load_signing_group(request.group_id).await?;

        let request = signing_request_from_dto(request, csr.der, subject_name, session);
        self.submit(request).await
    }

    #[tracing::instrument(level = "debug", skip(self, session, request), err(Debug))]
    pub async fn start_new_key_pair_request(
        &self,
        session: &Session,
        request: StartKeyPairRequestDTO,
    ) -> Result<CertificateRequestId, ServiceError> {
        permission_check(session, &[Role::Writer, Role::Manager])?;

        validate_entity_id(&request.entity_id)?;
        if request.subject_name.trim().is_empty() {
            return Err(ValidationError::MissingValue("subject_name").into());
        }
        DistinguishedName::parse(request.subject_name.trim()).map_err(ValidationError::from)?;
        validate_domain_names(&request.domain_names)?;

        self.load_signing_group(request.group_id).await?;

        let request = key_pair_request_from_dto(request, session);
        self.submit(request).await
    }

    /// Issues the certificate (and key pair) and moves the request to `Approved`.
    ///
    /// The artifact is committed together with the state change. If the commit fails the
    /// artifact is discarded and the request stays `New`.
    #[tracing::instrument(level = "debug", skip(self, session), err(Debug))]
    pub async fn approve(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
    ) -> Result<(), ServiceError> {
        permission_check(session, WorkflowAction::Approve.allowed_roles())?;

        let Some(_lock) = self.approval_locks.try_lock(&request_id) else {
            return Err(ConflictError::OperationInProgress(request_id.to_string()).into());
        };

        let request = self.load_request(request_id).await?;
        let next_state = transition(WorkflowAction::Approve, &request)?;

        let group = self
            .load_group(request.group_id)
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(request.group_id))?;
        let now = OffsetDateTime::now_utc();
        let issuer = validate_issuer_material(&group, now)?;

        let artifact = match self.issue(&request, &group, issuer, now).await {
            Ok(artifact) => artifact,
            Err(err @ (KeyVaultError::Forbidden | KeyVaultError::Transient(_))) => {
                return Err(err.into());
            }
            Err(err) => return Err(self.record_failure(session, &request, err).await),
        };

        let guard = artifact
            .key_handle
            .clone()
            .map(|handle| KeyHandleGuard::new(self.key_vault.clone(), handle));

        let update = UpdateCertificateRequestState {
            certificate: Some(artifact.certificate),
            issuer_version: Some(issuer.version),
            private_key_handle: Some(artifact.key_handle.clone()),
            key_material_available: Some(artifact.key_handle.is_some()),
            approved: Some(OperationStamp::now(&session.user_id)),
            ..UpdateCertificateRequestState::transition(&request, next_state)
        };

        if let Err(err) = self
            .certificate_request_repository
            .update_state(request_id, update)
            .await
        {
            tracing::warn!("Discarding certificate of request {request_id}: {err}");
            if let Some(guard) = guard {
                guard.discard().await;
            }
            return Err(err.into());
        }
        if let Some(guard) = guard {
            guard.disarm();
        }

        tracing::info!("Approved certificate request {request_id}");
        Ok(())
    }

    pub async fn reject(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
    ) -> Result<(), ServiceError> {
        permission_check(session, WorkflowAction::Reject.allowed_roles())?;

        let request = self.load_request(request_id).await?;
        let next_state = transition(WorkflowAction::Reject, &request)?;

        self.certificate_request_repository
            .update_state(
                request_id,
                UpdateCertificateRequestState {
                    approved: Some(OperationStamp::now(&session.user_id)),
                    ..UpdateCertificateRequestState::transition(&request, next_state)
                },
            )
            .await?;

        tracing::info!("Rejected certificate request {request_id}");
        Ok(())
    }

    /// Returns the issued certificate. Repeatable until the request is accepted.
    pub async fn finish_signing_request(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
    ) -> Result<FinishSigningRequestResponseDTO, ServiceError> {
        let (request, _) = self
            .finish(session, request_id, CertificateRequestType::SigningRequest)
            .await?;

        Ok(FinishSigningRequestResponseDTO {
            request_id,
            state: request.state,
            certificate: request.certificate,
            error_info: request.error_info,
        })
    }

    /// Returns the issued certificate with its private key. Repeatable until the
    /// request is accepted, afterwards the key is gone.
    pub async fn finish_new_key_pair_request(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
    ) -> Result<FinishKeyPairRequestResponseDTO, ServiceError> {
        let (request, private_key) = self
            .finish(session, request_id, CertificateRequestType::KeyPairRequest)
            .await?;

        Ok(FinishKeyPairRequestResponseDTO {
            request_id,
            state: request.state,
            certificate: request.certificate,
            private_key,
            private_key_format: request.private_key_format.unwrap_or_default(),
            error_info: request.error_info,
        })
    }

    /// Confirms the caller holds the artifact, the private key is purged afterwards
    pub async fn accept_request(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
    ) -> Result<(), ServiceError> {
        permission_check(session, WorkflowAction::Accept.allowed_roles())?;

        let request = self.load_request(request_id).await?;
        let next_state = transition(WorkflowAction::Accept, &request)?;

        self.certificate_request_repository
            .update_state(
                request_id,
                UpdateCertificateRequestState {
                    private_key_handle: Some(None),
                    key_material_available: Some(false),
                    accepted: Some(OperationStamp::now(&session.user_id)),
                    ..UpdateCertificateRequestState::transition(&request, next_state)
                },
            )
            .await?;

        if let Some(handle) = request.private_key_handle {
            purge_key(self.key_vault.as_ref(), handle).await;
        }

        tracing::info!("Accepted certificate request {request_id}");
        Ok(())
    }

    /// Marks the issued certificate as revoked and republishes the CRL of the issuer
    /// version that signed it with an incremented CRL number. The request keeps its state,
    /// remaining key material is purged. Repeating a revocation only republishes the CRL.
    #[tracing::instrument(level = "debug", skip(self, session), err(Debug))]
    pub async fn revoke_certificate(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
    ) -> Result<(), ServiceError> {
        permission_check(session, WorkflowAction::Revoke.allowed_roles())?;

        let request = self.load_request(request_id).await?;
        let state = transition(WorkflowAction::Revoke, &request)?;
        if request.certificate.is_none() {
            return Err(ConflictError::InvalidTransition {
                state,
                action: WorkflowAction::Revoke.into(),
            }
            .into());
        }

        let _lock = self.crl_locks.lock(&request.group_id).await;

        if request.revoked.is_none() {
            self.certificate_request_repository
                .update_state(
                    request_id,
                    UpdateCertificateRequestState {
                        private_key_handle: Some(None),
                        key_material_available: Some(false),
                        revoked: Some(OperationStamp::now(&session.user_id)),
                        ..UpdateCertificateRequestState::transition(&request, state)
                    },
                )
                .await?;

            if let Some(handle) = request.private_key_handle {
                purge_key(self.key_vault.as_ref(), handle).await;
            }
        }

        let crl_number = self
            .publish_crl(request.group_id, request.issuer_version)
            .await?;

        tracing::info!(
            "Revoked certificate of request {request_id}, CRL {crl_number} of group {}",
            request.group_id
        );
        Ok(())
    }

    pub async fn get_request(
        &self,
        request_id: CertificateRequestId,
    ) -> Result<GetCertificateRequestResponseDTO, ServiceError> {
        Ok(self.load_request(request_id).await?.into())
    }

    /// Requests in submission order
    pub async fn query_requests(
        &self,
        filter: CertificateRequestFilter,
        query: ListQuery,
    ) -> Result<GetCertificateRequestListResponseDTO, ServiceError> {
        let after = decode_page_token(query.page_token.as_deref())?;
        let page_size = self.config.pagination.page_size(query.page_size);

        let requests = retry_transient(&self.config.retry, "list certificate requests", || {
            self.certificate_request_repository.list(
                filter.clone(),
                after.clone(),
                u64::from(page_size) + 1,
            )
        })
        .await?;

        let response = to_list_response(requests, page_size, request_cursor)?;
        Ok(list_response_into(response))
    }

    /// Physically removes the request in any state, including its key material
    pub async fn delete_request(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
    ) -> Result<(), ServiceError> {
        permission_check(session, &[Role::Manager])?;

        let request = self.load_request(request_id).await?;

        self.certificate_request_repository
            .delete(request_id)
            .await
            .map_err(|err| match err {
                DataLayerError::RecordNotFound => {
                    EntityNotFoundError::CertificateRequest(request_id).into()
                }
                err => ServiceError::from(err),
            })?;

        if let Some(handle) = request.private_key_handle {
            purge_key(self.key_vault.as_ref(), handle).await;
        }

        tracing::info!("Deleted certificate request {request_id}");
        Ok(())
    }

    async fn submit(
        &self,
        request: CertificateRequest,
    ) -> Result<CertificateRequestId, ServiceError> {
        let (request_type, entity_id) = (request.request_type, request.entity_id.clone());

        let id = self.certificate_request_repository.create(request).await?;

        tracing::info!("Submitted {request_type} {id} for entity {entity_id}");
        Ok(id)
    }

    async fn finish(
        &self,
        session: &Session,
        request_id: CertificateRequestId,
        expected_type: CertificateRequestType,
    ) -> Result<(CertificateRequest, Option<SecretSlice<u8>>), ServiceError> {
        permission_check(session, WorkflowAction::Finish.allowed_roles())?;

        let mut request = self.load_request(request_id).await?;
        if request.request_type != expected_type {
            return Err(ValidationError::RequestTypeMismatch {
                id: request_id,
                expected: expected_type,
                actual: request.request_type,
            }
            .into());
        }

        let next_state = transition(WorkflowAction::Finish, &request)?;
        if next_state != CertificateRequestState::Completed {
            return Ok((request, None));
        }

        let private_key = match request.request_type {
            CertificateRequestType::KeyPairRequest => {
                Some(self.fetch_private_key(&request).await?)
            }
            CertificateRequestType::SigningRequest => None,
        };

        if request.state == CertificateRequestState::Approved {
            self.certificate_request_repository
                .update_state(
                    request_id,
                    UpdateCertificateRequestState::transition(&request, next_state),
                )
                .await?;

            request.state = next_state;
            request.version += 1;
            tracing::info!("Completed certificate request {request_id}");
        }

        Ok((request, private_key))
    }

    async fn fetch_private_key(
        &self,
        request: &CertificateRequest,
    ) -> Result<SecretSlice<u8>, ServiceError> {
        let handle = request
            .private_key_handle
            .as_ref()
            .filter(|_| request.key_material_available)
            .ok_or(ServiceError::Gone(request.id))?;
        let format = request.private_key_format.unwrap_or_default();

        retry_transient(&self.config.retry, "fetch private key", || {
            self.key_vault.fetch_private_key(handle.clone(), format)
        })
        .await
        .map_err(|err| match err {
            KeyVaultError::KeyNotFound(_) => ServiceError::Gone(request.id),
            err => err.into(),
        })
    }

    async fn issue(
        &self,
        request: &CertificateRequest,
        group: &TrustGroup,
        issuer: &TrustGroupIssuer,
        now: OffsetDateTime,
    ) -> Result<IssuedArtifact, KeyVaultError> {
        let (not_before, not_after) =
            validity_period(now, group.issued_lifetime, Some(issuer.not_after)).ok_or_else(
                || KeyVaultError::Failed(format!("issuer of group {} expires now", group.id)),
            )?;
        let issuer = IssuerReference::from(issuer);

        match request.request_type {
            CertificateRequestType::SigningRequest => {
                let sign_request = SignRequest {
                    csr: request
                        .csr
                        .clone()
                        .ok_or_else(|| KeyVaultError::InvalidCsr("missing request".to_owned()))?,
                    certificate_type: group.certificate_type,
                    not_before,
                    not_after,
                };

                let certificate = retry_transient(&self.config.retry, "sign certificate", || {
                    self.key_vault.sign(sign_request.clone(), issuer.clone())
                })
                .await?;

                Ok(IssuedArtifact {
                    certificate,
                    key_handle: None,
                })
            }
            CertificateRequestType::KeyPairRequest => {
                let subject =
                    DistinguishedName::parse(request.subject_name.as_deref().unwrap_or_default())
                        .map_err(|err| KeyVaultError::Failed(err.to_string()))?;
                let key_pair_request = KeyPairRequest {
                    subject,
                    domain_names: request.domain_names.clone(),
                    certificate_type: group.certificate_type,
                    signature_algorithm: group.issued_signature_algorithm,
                    key_size: group.issued_key_size,
                    not_before,
                    not_after,
                };

                let generated = retry_transient(&self.config.retry, "generate key pair", || {
                    self.key_vault
                        .generate_key_pair(key_pair_request.clone(), issuer.clone())
                })
                .await?;

                Ok(IssuedArtifact {
                    certificate: generated.certificate,
                    key_handle: Some(generated.key_handle),
                })
            }
        }
    }

    /// Signs the CRL of one issuer version over all of its revoked certificates,
    /// returns the new CRL number
    async fn publish_crl(
        &self,
        group_id: TrustGroupId,
        issuer_version: Option<u32>,
    ) -> Result<u32, ServiceError> {
        let group = self
            .load_group(group_id)
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(group_id))?;
        let current = group
            .issuer
            .ok_or(InvalidStateError::MissingIssuer(group_id))?;

        let issuer = match issuer_version {
            Some(version) if version != current.version => {
                retry_transient(&self.config.retry, "get issuer version", || {
                    self.trust_group_repository.get_issuer(group_id, version)
                })
                .await?
                .ok_or(ServiceError::CorruptHierarchy {
                    group_id,
                    broken_at: group_id,
                })?
            }
            _ => current,
        };

        let revoked = retry_transient(&self.config.retry, "list revoked certificates", || {
            self.certificate_request_repository
                .list_revoked(group_id, issuer.version)
        })
        .await?
        .into_iter()
        .filter_map(|request| Some((request.certificate?, request.revoked?)))
        .map(|(certificate, revoked)| {
            Ok(RevokedCertificate {
                serial_number: certificate_serial(&certificate)
                    .map_err(|err| ServiceError::MappingError(err.to_string()))?,
                revocation_time: revoked.time,
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

        let now = OffsetDateTime::now_utc();
        let crl_number = issuer.crl_number + 1;
        let crl_request = CrlRequest {
            crl_number,
            this_update: now,
            // lists of expired issuers stay well-formed
            next_update: issuer.not_after.max(now + Duration::days(1)),
            revoked,
        };
        let reference = IssuerReference::from(&issuer);

        let crl = retry_transient(&self.config.retry, "update crl", || {
            self.key_vault
                .update_crl(crl_request.clone(), reference.clone())
        })
        .await?;

        self.trust_group_repository
            .update_issuer_crl(group_id, issuer.version, issuer.crl_number, crl)
            .await?;

        Ok(crl_number)
    }

    /// Moves the request to the terminal `Failure` state
    async fn record_failure(
        &self,
        session: &Session,
        request: &CertificateRequest,
        error: KeyVaultError,
    ) -> ServiceError {
        tracing::warn!("Certificate request {} failed: {error}", request.id);

        let next_state = match transition(WorkflowAction::Fail, request) {
            Ok(state) => state,
            Err(err) => return err,
        };

        let update = UpdateCertificateRequestState {
            error_info: Some(error.to_string()),
            approved: Some(OperationStamp::now(&session.user_id)),
            ..UpdateCertificateRequestState::transition(request, next_state)
        };
        if let Err(err) = self
            .certificate_request_repository
            .update_state(request.id, update)
            .await
        {
            return err.into();
        }

        ServiceError::Failure(error.to_string())
    }

    async fn load_request(
        &self,
        request_id: CertificateRequestId,
    ) -> Result<CertificateRequest, ServiceError> {
        retry_transient(&self.config.retry, "get certificate request", || {
            self.certificate_request_repository.get(request_id)
        })
        .await?
        .ok_or(EntityNotFoundError::CertificateRequest(request_id).into())
    }

    async fn load_group(
        &self,
        group_id: TrustGroupId,
    ) -> Result<Option<TrustGroup>, ServiceError> {
        Ok(
            retry_transient(&self.config.retry, "get trust group", || {
                self.trust_group_repository.get(group_id)
            })
            .await?,
        )
    }

    /// The group has to exist and hold issuer material that can sign now
    async fn load_signing_group(
        &self,
        group_id: TrustGroupId,
    ) -> Result<TrustGroup, ServiceError> {
        let group = self
            .load_group(group_id)
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(group_id))?;

        validate_issuer_material(&group, OffsetDateTime::now_utc())?;
        Ok(group)
    }
}
