use shared_types::{CertificateRequestId, EntityId, TrustGroupId};

use super::error::DataLayerError;
use crate::model::certificate_request::{
    CertificateRequest, CertificateRequestFilter, UpdateCertificateRequestState,
};
use crate::model::list_query::PageCursor;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait CertificateRequestRepository: Send + Sync {
    async fn create(
        &self,
        request: CertificateRequest,
    ) -> Result<CertificateRequestId, DataLayerError>;

    async fn get(
        &self,
        id: CertificateRequestId,
    ) -> Result<Option<CertificateRequest>, DataLayerError>;

    /// Compare-and-swap on `(id, expected_state, expected_version)`.
    /// Fails with [`DataLayerError::RecordNotUpdated`] if the record moved on in the meantime.
    async fn update_state(
        &self,
        id: CertificateRequestId,
        update: UpdateCertificateRequestState,
    ) -> Result<(), DataLayerError>;

    async fn delete(&self, id: CertificateRequestId) -> Result<(), DataLayerError>;

    /// Requests in submission order, starting after `after`
    async fn list(
        &self,
        filter: CertificateRequestFilter,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Result<Vec<CertificateRequest>, DataLayerError>;

    /// Requests of the given entities carrying an issued, unrevoked certificate,
    /// in submission order
    async fn list_issued_certificates(
        &self,
        entity_ids: Vec<EntityId>,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Result<Vec<CertificateRequest>, DataLayerError>;

    /// Revoked certificates signed by one issuer version of the group
    async fn list_revoked(
        &self,
        group_id: TrustGroupId,
        issuer_version: u32,
    ) -> Result<Vec<CertificateRequest>, DataLayerError>;
}
