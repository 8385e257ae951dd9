use sea_orm::Set;
use time::OffsetDateTime;
use vault_core::model::certificate_request::CertificateRequest;
use vault_core::model::common::OperationStamp;
use vault_core::repository::error::DataLayerError;

use crate::entity::certificate_request;

impl TryFrom<certificate_request::Model> for CertificateRequest {
    type Error = DataLayerError;

    fn try_from(value: certificate_request::Model) -> Result<Self, DataLayerError> {
        Ok(Self {
            id: value.id,
            created_date: value.created_date,
            last_modified: value.last_modified,
            entity_id: value.entity_id,
            group_id: value.group_id,
            request_type: value.request_type.into(),
            state: value.state.into(),
            subject_name: value.subject_name,
            domain_names: serde_json::from_str(&value.domain_names)
                .map_err(|_| DataLayerError::MappingError)?,
            csr: value.csr,
            private_key_format: value.private_key_format.map(Into::into),
            error_info: value.error_info,
            certificate: value.certificate,
            issuer_version: value.issuer_version,
            private_key_handle: value.private_key_handle,
            key_material_available: value.key_material_available,
            submitted: OperationStamp {
                authority_id: value.submitted_by,
                time: value.submitted_date,
            },
            approved: to_stamp(value.approved_by, value.approved_date),
            accepted: to_stamp(value.accepted_by, value.accepted_date),
            revoked: to_stamp(value.revoked_by, value.revoked_date),
            version: value.version,
            sort_key: value.sort_key,
        })
    }
}

impl TryFrom<CertificateRequest> for certificate_request::ActiveModel {
    type Error = DataLayerError;

    fn try_from(value: CertificateRequest) -> Result<Self, DataLayerError> {
        let (approved_by, approved_date) = from_stamp(value.approved);
        let (accepted_by, accepted_date) = from_stamp(value.accepted);
        let (revoked_by, revoked_date) = from_stamp(value.revoked);

        Ok(Self {
            id: Set(value.id),
            created_date: Set(value.created_date),
            last_modified: Set(value.last_modified),
            entity_id: Set(value.entity_id),
            group_id: Set(value.group_id),
            request_type: Set(value.request_type.into()),
            state: Set(value.state.into()),
            subject_name: Set(value.subject_name),
            domain_names: Set(serde_json::to_string(&value.domain_names)
                .map_err(|_| DataLayerError::MappingError)?),
            csr: Set(value.csr),
            private_key_format: Set(value.private_key_format.map(Into::into)),
            error_info: Set(value.error_info),
            certificate: Set(value.certificate),
            issuer_version: Set(value.issuer_version),
            private_key_handle: Set(value.private_key_handle),
            key_material_available: Set(value.key_material_available),
            submitted_by: Set(value.submitted.authority_id),
            submitted_date: Set(value.submitted.time),
            approved_by: Set(approved_by),
            approved_date: Set(approved_date),
            accepted_by: Set(accepted_by),
            accepted_date: Set(accepted_date),
            revoked_by: Set(revoked_by),
            revoked_date: Set(revoked_date),
            version: Set(value.version),
            sort_key: Set(value.sort_key),
        })
    }
}

fn to_stamp(
    authority_id: Option<String>,
    time: Option<OffsetDateTime>,
) -> Option<OperationStamp> {
    Some(OperationStamp {
        authority_id: authority_id?,
        time: time?,
    })
}

pub(super) fn from_stamp(stamp: Option<OperationStamp>) -> (Option<String>, Option<OffsetDateTime>) {
    match stamp {
        Some(stamp) => (Some(stamp.authority_id), Some(stamp.time)),
        None => (None, None),
    }
}
