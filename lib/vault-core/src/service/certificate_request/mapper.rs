use shared_types::CertificateRequestId;
use time::OffsetDateTime;

use super::dto::{StartKeyPairRequestDTO, StartSigningRequestDTO};
use crate::model::certificate_request::{
    CertificateRequest, CertificateRequestState, CertificateRequestType,
};
use crate::model::common::OperationStamp;
use crate::model::list_query::PageCursor;
use crate::service::permission::Session;
use crate::util::sort_key::next_sort_key;

pub(super) fn signing_request_from_dto(
    request: StartSigningRequestDTO,
    csr: Vec<u8>,
    subject_name: Option<String>,
    session: &Session,
) -> CertificateRequest {
    let now = OffsetDateTime::now_utc();
    CertificateRequest {
        id: CertificateRequestId::new_v4(),
        created_date: now,
        last_modified: now,
        entity_id: request.entity_id,
        group_id: request.group_id,
        request_type: CertificateRequestType::SigningRequest,
        state: CertificateRequestState::New,
        subject_name,
        domain_names: vec![],
        csr: Some(csr),
        private_key_format: None,
        error_info: None,
        certificate: None,
        issuer_version: None,
        private_key_handle: None,
        key_material_available: false,
        submitted: OperationStamp {
            authority_id: session.user_id.to_owned(),
            time: now,
        },
        approved: None,
        accepted: None,
        revoked: None,
        version: 0,
        sort_key: next_sort_key(now),
    }
}

pub(super) fn key_pair_request_from_dto(
    request: StartKeyPairRequestDTO,
    session: &Session,
) -> CertificateRequest {
    let now = OffsetDateTime::now_utc();
    CertificateRequest {
        id: CertificateRequestId::new_v4(),
        created_date: now,
        last_modified: now,
        entity_id: request.entity_id,
        group_id: request.group_id,
        request_type: CertificateRequestType::KeyPairRequest,
        state: CertificateRequestState::New,
        subject_name: Some(request.subject_name.trim().to_owned()),
        domain_names: request
            .domain_names
            .into_iter()
            .map(|name| name.trim().to_ascii_lowercase())
            .collect(),
        csr: None,
        private_key_format: Some(request.private_key_format.unwrap_or_default()),
        error_info: None,
        certificate: None,
        issuer_version: None,
        private_key_handle: None,
        key_material_available: false,
        submitted: OperationStamp {
            authority_id: session.user_id.to_owned(),
            time: now,
        },
        approved: None,
        accepted: None,
        revoked: None,
        version: 0,
        sort_key: next_sort_key(now),
    }
}

pub(crate) fn request_cursor(request: &CertificateRequest) -> PageCursor {
    PageCursor {
        sort_key: request.sort_key,
        id: request.id.to_string(),
    }
}
