use std::collections::HashSet;

use shared_types::TrustGroupId;

use super::IssuerChainService;
use super::dto::IssuerCertificateVersionDTO;
use crate::common_mapper::vector_into;
use crate::model::trust_group::TrustGroupIssuer;
use crate::service::error::{EntityNotFoundError, ServiceError};
use crate::util::retry::retry_transient;

impl IssuerChainService {
    /// DER encoded issuer certificates from `group_id` up to its root, root last
    pub async fn resolve_certificate_chain(
        &self,
        group_id: TrustGroupId,
    ) -> Result<Vec<Vec<u8>>, ServiceError> {
        self.resolve_certificate_chain_for_issuer(group_id, None)
            .await
    }

    /// Chain of a certificate signed by `issuer_version` of the group, which need not be
    /// the current one. Each ancestor contributes the version that signed its child.
    pub async fn resolve_certificate_chain_for_issuer(
        &self,
        group_id: TrustGroupId,
        issuer_version: Option<u32>,
    ) -> Result<Vec<Vec<u8>>, ServiceError> {
        Ok(self
            .resolve_issuers(group_id, issuer_version)
            .await?
            .into_iter()
            .map(|issuer| issuer.certificate)
            .collect())
    }

    /// DER encoded CRLs of the current issuers from `group_id` up to its root, root last
    pub async fn resolve_crl_chain(
        &self,
        group_id: TrustGroupId,
    ) -> Result<Vec<Vec<u8>>, ServiceError> {
        Ok(self
            .resolve_issuers(group_id, None)
            .await?
            .into_iter()
            .map(|issuer| issuer.crl)
            .collect())
    }

    /// All issuer certificates the group ever had, newest first
    pub async fn get_issuer_certificate_versions(
        &self,
        group_id: TrustGroupId,
    ) -> Result<Vec<IssuerCertificateVersionDTO>, ServiceError> {
        let history = retry_transient(&self.config.retry, "get issuer history", || {
            self.trust_group_repository.get_issuer_history(group_id)
        })
        .await?;

        if history.is_empty() {
            // a stored group always has at least one issuer version
            retry_transient(&self.config.retry, "get trust group", || {
                self.trust_group_repository.get(group_id)
            })
            .await?
            .ok_or(EntityNotFoundError::TrustGroup(group_id))?;
        }

        Ok(vector_into(history))
    }

    /// Issuers along the parent chain, starting at `version` of `group_id` (the current
    /// one if `None`) and following the recorded parent versions. A missing ancestor or
    /// issuer version, an ancestor without issuer material or a loop means the stored
    /// hierarchy is broken.
    pub(crate) async fn resolve_issuers(
        &self,
        group_id: TrustGroupId,
        version: Option<u32>,
    ) -> Result<Vec<TrustGroupIssuer>, ServiceError> {
        let mut chain = vec![];
        let mut visited = HashSet::new();
        let mut next = Some((group_id, version));

        while let Some((current_id, version)) = next {
            let corrupt = || {
                tracing::warn!("Broken trust group hierarchy for {group_id} at {current_id}");
                ServiceError::CorruptHierarchy {
                    group_id,
                    broken_at: current_id,
                }
            };

            if !visited.insert(current_id) {
                return Err(corrupt());
            }

            let group = retry_transient(&self.config.retry, "get trust group", || {
                self.trust_group_repository.get(current_id)
            })
            .await?;

            let Some(group) = group else {
                if current_id == group_id {
                    return Err(EntityNotFoundError::TrustGroup(group_id).into());
                }
                return Err(corrupt());
            };

            let current = group.issuer.ok_or_else(corrupt)?;
            let issuer = match version {
                Some(version) if version != current.version => {
                    retry_transient(&self.config.retry, "get issuer version", || {
                        self.trust_group_repository.get_issuer(current_id, version)
                    })
                    .await?
                    .ok_or_else(corrupt)?
                }
                _ => current,
            };

            next = group
                .parent_id
                .map(|parent_id| (parent_id, issuer.parent_version));
            chain.push(issuer);
        }

        Ok(chain)
    }
}
