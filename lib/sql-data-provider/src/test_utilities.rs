use shared_types::{CertificateRequestId, EntityId, TrustGroupId};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;
use vault_core::model::certificate_request::{
    CertificateRequest, CertificateRequestState, CertificateRequestType,
};
use vault_core::model::common::OperationStamp;
use vault_core::model::trust_group::{
    CertificateType, SignatureAlgorithm, TrustGroup, TrustGroupIssuer,
};

use crate::{DataLayer, db_conn};

pub fn get_dummy_date() -> OffsetDateTime {
    datetime!(2005-04-02 21:37 +1)
}

pub async fn setup_test_data_layer_and_connection_with_custom_url(database_url: &str) -> DataLayer {
    let db_conn = db_conn(database_url).await.unwrap();
    DataLayer::build(db_conn).await.unwrap()
}

pub async fn setup_test_data_layer_and_connection() -> DataLayer {
    setup_test_data_layer_and_connection_with_custom_url("sqlite::memory:").await
}

pub fn dummy_issuer(group_id: TrustGroupId, version: u32) -> TrustGroupIssuer {
    let now = get_dummy_date();
    TrustGroupIssuer {
        group_id,
        version,
        created_date: now,
        serial_number: format!("0{version}"),
        certificate: vec![version as u8; 4],
        crl: vec![],
        key_handle: format!("key-{group_id}-{version}").into(),
        not_before: now,
        not_after: now + Duration::days(365),
        parent_version: None,
        crl_number: 1,
    }
}

pub fn dummy_trust_group(parent_id: Option<TrustGroupId>, sort_key: i64) -> TrustGroup {
    let id: TrustGroupId = Uuid::new_v4().into();
    let now = get_dummy_date();
    TrustGroup {
        id,
        created_date: now,
        last_modified: now,
        parent_id,
        name: format!("group {sort_key}"),
        certificate_type: CertificateType::ApplicationInstanceCertificate,
        subject_name: "CN=Test Issuer,O=Procivis".to_string(),
        lifetime: 24,
        key_size: 256,
        signature_algorithm: SignatureAlgorithm::EcdsaP256Sha256,
        issued_lifetime: 12,
        issued_key_size: 2048,
        issued_signature_algorithm: SignatureAlgorithm::RsaSha256,
        version: 0,
        sort_key,
        issuer: Some(dummy_issuer(id, 1)),
    }
}

pub fn dummy_request(
    entity_id: &str,
    group_id: TrustGroupId,
    state: CertificateRequestState,
    sort_key: i64,
) -> CertificateRequest {
    let id: CertificateRequestId = Uuid::new_v4().into();
    let now = get_dummy_date();
    CertificateRequest {
        id,
        created_date: now,
        last_modified: now,
        entity_id: EntityId::from(entity_id),
        group_id,
        request_type: CertificateRequestType::SigningRequest,
        state,
        subject_name: Some(format!("CN={entity_id}")),
        domain_names: vec![format!("{entity_id}.example.com")],
        csr: Some(vec![1, 2, 3]),
        private_key_format: None,
        error_info: None,
        certificate: None,
        issuer_version: None,
        private_key_handle: None,
        key_material_available: false,
        submitted: OperationStamp {
            authority_id: "writer".to_string(),
            time: now,
        },
        approved: None,
        accepted: None,
        revoked: None,
        version: 0,
        sort_key,
    }
}
