use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use shared_types::{CertificateRequestId, EntityId, TrustGroupId};
use time::OffsetDateTime;
use vault_core::model::certificate_request::{
    CertificateRequest, CertificateRequestFilter, UpdateCertificateRequestState,
};
use vault_core::model::list_query::PageCursor;
use vault_core::repository::certificate_request_repository::CertificateRequestRepository;
use vault_core::repository::error::DataLayerError;

use super::CertificateRequestProvider;
use super::mapper::from_stamp;
use crate::entity::certificate_request;
use crate::list_query::SelectAfterCursor;
use crate::mapper::{to_data_layer_error, to_update_data_layer_error};

#[async_trait]
impl CertificateRequestRepository for CertificateRequestProvider {
    async fn create(
        &self,
        request: CertificateRequest,
    ) -> Result<CertificateRequestId, DataLayerError> {
        let id = request.id;

        certificate_request::Entity::insert(certificate_request::ActiveModel::try_from(request)?)
            .exec_without_returning(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(id)
    }

    async fn get(
        &self,
        id: CertificateRequestId,
    ) -> Result<Option<CertificateRequest>, DataLayerError> {
        certificate_request::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(to_data_layer_error)?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn update_state(
        &self,
        id: CertificateRequestId,
        update: UpdateCertificateRequestState,
    ) -> Result<(), DataLayerError> {
        let mut update_model = certificate_request::ActiveModel {
            last_modified: Set(OffsetDateTime::now_utc()),
            state: Set(update.state.into()),
            version: Set(update.expected_version + 1),
            error_info: update.error_info.map(|info| Set(Some(info))).unwrap_or_default(),
            certificate: update
                .certificate
                .map(|certificate| Set(Some(certificate)))
                .unwrap_or_default(),
            private_key_handle: update.private_key_handle.map(Set).unwrap_or_default(),
            key_material_available: update.key_material_available.map(Set).unwrap_or_default(),
            issuer_version: update
                .issuer_version
                .map(|version| Set(Some(version)))
                .unwrap_or_default(),
            ..Default::default()
        };

        if update.approved.is_some() {
            let (approved_by, approved_date) = from_stamp(update.approved);
            update_model.approved_by = Set(approved_by);
            update_model.approved_date = Set(approved_date);
        }
        if update.accepted.is_some() {
            let (accepted_by, accepted_date) = from_stamp(update.accepted);
            update_model.accepted_by = Set(accepted_by);
            update_model.accepted_date = Set(accepted_date);
        }
        if update.revoked.is_some() {
            let (revoked_by, revoked_date) = from_stamp(update.revoked);
            update_model.revoked_by = Set(revoked_by);
            update_model.revoked_date = Set(revoked_date);
        }

        let expected_state: certificate_request::CertificateRequestState =
            update.expected_state.into();
        let result = certificate_request::Entity::update_many()
            .set(update_model)
            .filter(certificate_request::Column::Id.eq(id))
            .filter(certificate_request::Column::State.eq(expected_state))
            .filter(certificate_request::Column::Version.eq(update.expected_version))
            .exec(&self.db)
            .await
            .map_err(to_update_data_layer_error)?;

        if result.rows_affected == 0 {
            return Err(DataLayerError::RecordNotUpdated);
        }

        Ok(())
    }

    async fn delete(&self, id: CertificateRequestId) -> Result<(), DataLayerError> {
        let result = certificate_request::Entity::delete_by_id(id)
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
        filter: CertificateRequestFilter,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Result<Vec<CertificateRequest>, DataLayerError> {
        let mut condition = Condition::all();
        if let Some(entity_id) = filter.entity_id {
            condition = condition.add(certificate_request::Column::EntityId.eq(entity_id));
        }
        if let Some(group_id) = filter.group_id {
            condition = condition.add(certificate_request::Column::GroupId.eq(group_id));
        }
        if let Some(state) = filter.state {
            condition = condition.add(
                certificate_request::Column::State
                    .eq(certificate_request::CertificateRequestState::from(state)),
            );
        }

        self.list_matching(condition, after, limit).await
    }

    async fn list_issued_certificates(
        &self,
        entity_ids: Vec<EntityId>,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Result<Vec<CertificateRequest>, DataLayerError> {
        if entity_ids.is_empty() {
            return Ok(vec![]);
        }

        let condition = Condition::all()
            .add(certificate_request::Column::EntityId.is_in(entity_ids))
            .add(certificate_request::Column::Certificate.is_not_null())
            .add(certificate_request::Column::RevokedDate.is_null());

        self.list_matching(condition, after, limit).await
    }

    async fn list_revoked(
        &self,
        group_id: TrustGroupId,
        issuer_version: u32,
    ) -> Result<Vec<CertificateRequest>, DataLayerError> {
        certificate_request::Entity::find()
            .filter(certificate_request::Column::GroupId.eq(group_id))
            .filter(certificate_request::Column::IssuerVersion.eq(issuer_version))
            .filter(certificate_request::Column::RevokedDate.is_not_null())
            .order_by_asc(certificate_request::Column::SortKey)
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }
}

impl CertificateRequestProvider {
    async fn list_matching(
        &self,
        condition: Condition,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Result<Vec<CertificateRequest>, DataLayerError> {
        certificate_request::Entity::find()
            .filter(condition)
            .after_cursor(
                certificate_request::Column::SortKey,
                certificate_request::Column::Id,
                after,
                limit,
            )
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }
}
