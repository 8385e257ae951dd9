use shared_types::TrustGroupId;

use super::error::DataLayerError;
use crate::model::list_query::PageCursor;
use crate::model::trust_group::{
    TrustGroup, TrustGroupIssuer, TrustGroupParentFilter, UpdateTrustGroupRequest,
};

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait TrustGroupRepository: Send + Sync {
    /// Stores the group together with its first issuer version (`group.issuer` is required)
    async fn create(&self, group: TrustGroup) -> Result<TrustGroupId, DataLayerError>;

    /// Loads the group with its current issuer
    async fn get(&self, id: TrustGroupId) -> Result<Option<TrustGroup>, DataLayerError>;

    /// All issuer versions, newest first
    async fn get_issuer_history(
        &self,
        id: TrustGroupId,
    ) -> Result<Vec<TrustGroupIssuer>, DataLayerError>;

    async fn get_issuer(
        &self,
        id: TrustGroupId,
        version: u32,
    ) -> Result<Option<TrustGroupIssuer>, DataLayerError>;

    /// Replaces the CRL of one issuer version and increments its CRL number.
    /// Fails with [`DataLayerError::RecordNotUpdated`] if the stored CRL number differs.
    async fn update_issuer_crl(
        &self,
        id: TrustGroupId,
        version: u32,
        expected_crl_number: u32,
        crl: Vec<u8>,
    ) -> Result<(), DataLayerError>;

    /// Fails with [`DataLayerError::RecordNotUpdated`] if the stored version differs
    async fn update(
        &self,
        id: TrustGroupId,
        expected_version: u32,
        request: UpdateTrustGroupRequest,
    ) -> Result<(), DataLayerError>;

    /// Appends a new issuer version, which becomes the current one
    async fn add_issuer(&self, issuer: TrustGroupIssuer) -> Result<(), DataLayerError>;

    async fn has_children(&self, id: TrustGroupId) -> Result<bool, DataLayerError>;

    /// Removes the group and all of its issuer versions
    async fn delete(&self, id: TrustGroupId) -> Result<(), DataLayerError>;

    /// Groups in creation order, starting after `after`
    async fn list(
        &self,
        filter: TrustGroupParentFilter,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Result<Vec<TrustGroup>, DataLayerError>;
}
