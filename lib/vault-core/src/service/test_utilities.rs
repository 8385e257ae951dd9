use std::time::Duration;

use shared_types::{CertificateRequestId, EntityId, KeyHandle, TrustGroupId};
use time::OffsetDateTime;

use crate::config::core_config::{CoreConfig, RetryConfig};
use crate::model::certificate_request::{
    CertificateRequest, CertificateRequestState, CertificateRequestType,
};
use crate::model::common::OperationStamp;
use crate::model::trust_group::{
    CertificateType, SignatureAlgorithm, TrustGroup, TrustGroupIssuer,
};
use crate::service::permission::{Role, Session};

pub fn generic_config() -> CoreConfig {
    CoreConfig {
        retry: RetryConfig {
            max_attempts: 3,
            delay: Duration::ZERO,
        },
        ..Default::default()
    }
}

pub fn session(roles: impl IntoIterator<Item = Role>) -> Session {
    Session::new("test-user", roles)
}

pub fn dummy_issuer(group_id: TrustGroupId, version: u32) -> TrustGroupIssuer {
    let now = OffsetDateTime::now_utc();
    TrustGroupIssuer {
        group_id,
        version,
        parent_version: None,
        created_date: now,
        serial_number: format!("{version:032x}"),
        certificate: format!("certificate-{group_id}-{version}").into_bytes(),
        crl: format!("crl-{group_id}-{version}").into_bytes(),
        crl_number: 1,
        key_handle: KeyHandle::from(format!("issuer-key-{group_id}-{version}")),
        not_before: now - time::Duration::days(1),
        not_after: now + time::Duration::days(365),
    }
}

pub fn dummy_trust_group(parent_id: Option<TrustGroupId>) -> TrustGroup {
    let id = TrustGroupId::new_v4();
    let now = OffsetDateTime::now_utc();
    TrustGroup {
        id,
        created_date: now,
        last_modified: now,
        parent_id,
        name: format!("group-{id}"),
        certificate_type: CertificateType::ApplicationInstanceCertificate,
        subject_name: "CN=Test CA, O=Acme".to_owned(),
        lifetime: 60,
        key_size: 2048,
        signature_algorithm: SignatureAlgorithm::RsaSha256,
        issued_lifetime: 24,
        issued_key_size: 2048,
        issued_signature_algorithm: SignatureAlgorithm::RsaSha256,
        version: 0,
        sort_key: 0,
        issuer: Some(dummy_issuer(id, 1)),
    }
}

pub fn dummy_request(
    group_id: TrustGroupId,
    request_type: CertificateRequestType,
    state: CertificateRequestState,
) -> CertificateRequest {
    let now = OffsetDateTime::now_utc();
    CertificateRequest {
        id: CertificateRequestId::new_v4(),
        created_date: now,
        last_modified: now,
        entity_id: EntityId::from("entity-1"),
        group_id,
        request_type,
        state,
        subject_name: Some("CN=device-1".to_owned()),
        domain_names: vec![],
        csr: None,
        private_key_format: None,
        error_info: None,
        certificate: None,
        issuer_version: None,
        private_key_handle: None,
        key_material_available: false,
        submitted: OperationStamp::now("writer"),
        approved: None,
        accepted: None,
        revoked: None,
        version: 0,
        sort_key: 0,
    }
}
