use std::sync::Arc;

use secrecy::ExposeSecret;
use similar_asserts::assert_eq;
use sql_data_provider::DataLayer;
use tempfile::TempDir;
use shared_types::{CertificateRequestId, TrustGroupId};
use vault_core::VaultCore;
use vault_core::config::core_config::CoreConfig;
use vault_core::model::certificate_request::{CertificateRequestState, PrivateKeyFormat};
use vault_core::model::list_query::ListQuery;
use vault_core::model::trust_group::{CertificateType, SignatureAlgorithm};
use vault_core::provider::key_vault::internal::InternalKeyVault;
use vault_core::service::certificate_request::dto::StartKeyPairRequestDTO;
use vault_core::service::error::ServiceError;
use vault_core::service::permission::{Role, Session};
use vault_core::service::trust_group::dto::CreateTrustGroupRequestDTO;
use x509_parser::prelude::{CertificateRevocationList, FromDer, X509Certificate};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn start_core(directory: &TempDir) -> VaultCore {
    VaultCore::new(
        Arc::new(open(directory).await),
        Arc::new(InternalKeyVault::new()),
        CoreConfig::default(),
    )
    .unwrap()
}

fn group_request(name: &str, subject_name: &str, lifetime: u32) -> CreateTrustGroupRequestDTO {
    CreateTrustGroupRequestDTO {
        name: name.to_string(),
        certificate_type: CertificateType::ApplicationInstanceCertificate,
        subject_name: subject_name.to_string(),
        lifetime: Some(lifetime),
        key_size: Some(256),
        signature_algorithm: Some(SignatureAlgorithm::EcdsaP256Sha256),
        issued_lifetime: Some(6),
        issued_key_size: Some(256),
        issued_signature_algorithm: Some(SignatureAlgorithm::EcdsaP256Sha256),
    }
}

async fn open(directory: &TempDir) -> DataLayer {
    let path = directory.path().join("vault.sqlite");
    DataLayer::create(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .unwrap()
}

fn assert_issued_by(certificate: &[u8], issuer: &[u8]) {
    let (_, certificate) = X509Certificate::from_der(certificate).unwrap();
    let (_, issuer) = X509Certificate::from_der(issuer).unwrap();

    assert_eq!(certificate.issuer(), issuer.subject());
    certificate
        .verify_signature(Some(issuer.public_key()))
        .unwrap();
}

#[tokio::test]
async fn test_key_pair_request_lifecycle_on_sqlite() {
    init_logging();

    let directory = tempfile::tempdir().unwrap();
    let data_layer = open(&directory).await;
    let core = VaultCore::new(
        Arc::new(data_layer),
        Arc::new(InternalKeyVault::new()),
        CoreConfig::default(),
    )
    .unwrap();

    let manager = Session::new("manager", [Role::Manager]);
    let writer = Session::new("writer", [Role::Writer]);
    let approver = Session::new("approver", [Role::Approver]);

    // hierarchy
    let root_id = core
        .trust_group_service
        .create_root(&manager, group_request("root", "CN=Root CA,O=Procivis", 24))
        .await
        .unwrap();
    let sub_id = core
        .trust_group_service
        .create_sub_group(
            &manager,
            root_id,
            group_request("apps", "CN=App CA,O=Procivis", 12),
        )
        .await
        .unwrap();

    let chain = core
        .issuer_chain_service
        .resolve_certificate_chain(sub_id)
        .await
        .unwrap();
    assert_eq!(chain.len(), 2);
    assert_issued_by(&chain[0], &chain[1]);
    assert_issued_by(&chain[1], &chain[1]);

    // workflow
    let request_id = core
        .certificate_request_service
        .start_new_key_pair_request(
            &writer,
            StartKeyPairRequestDTO {
                entity_id: "app-b".into(),
                group_id: sub_id,
                subject_name: "CN=app-b,O=Procivis".to_string(),
                domain_names: vec!["app-b.example.com".to_string()],
                private_key_format: Some(PrivateKeyFormat::Der),
            },
        )
        .await
        .unwrap();

    core.certificate_request_service
        .approve(&approver, request_id)
        .await
        .unwrap();

    let finished = core
        .certificate_request_service
        .finish_new_key_pair_request(&writer, request_id)
        .await
        .unwrap();
    assert_eq!(finished.state, CertificateRequestState::Completed);
    let certificate = finished.certificate.unwrap();
    assert_issued_by(&certificate, &chain[0]);
    assert_eq!(finished.private_key.unwrap().expose_secret()[0], 0x30);

    // trust
    core.trust_relationship_service
        .add_trust_relationship(&writer, "app-a".into(), "app-b".into())
        .await
        .unwrap();
    let trusted = core
        .trust_relationship_service
        .list_trusted_certificates("app-a".into(), ListQuery::default())
        .await
        .unwrap();
    assert_eq!(trusted.values.len(), 1);
    assert_eq!(trusted.values[0].certificate, certificate);
    assert_eq!(trusted.values[0].issuer_chain, chain);

    core.certificate_request_service
        .accept_request(&writer, request_id)
        .await
        .unwrap();
    let result = core
        .certificate_request_service
        .finish_new_key_pair_request(&writer, request_id)
        .await;
    assert!(matches!(result, Err(ServiceError::Gone(id)) if id == request_id));

    // state survives a reconnect
    let reopened = VaultCore::new(
        Arc::new(open(&directory).await),
        Arc::new(InternalKeyVault::new()),
        CoreConfig::default(),
    )
    .unwrap();
    let stored = reopened
        .certificate_request_service
        .get_request(request_id)
        .await
        .unwrap();
    assert_eq!(stored.state, CertificateRequestState::Accepted);
    assert!(!stored.key_material_available);
    assert_eq!(stored.certificate, Some(certificate));
}

#[tokio::test]
async fn test_group_with_children_cannot_be_deleted() {
    init_logging();

    let directory = tempfile::tempdir().unwrap();
    let core = VaultCore::new(
        Arc::new(open(&directory).await),
        Arc::new(InternalKeyVault::new()),
        CoreConfig::default(),
    )
    .unwrap();
    let manager = Session::new("manager", [Role::Manager]);

    let root_id = core
        .trust_group_service
        .create_root(&manager, group_request("root", "CN=Root CA", 24))
        .await
        .unwrap();
    let sub_id = core
        .trust_group_service
        .create_sub_group(&manager, root_id, group_request("sub", "CN=Sub CA", 12))
        .await
        .unwrap();

    let result = core.trust_group_service.delete_group(&manager, root_id).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    core.trust_group_service
        .delete_group(&manager, sub_id)
        .await
        .unwrap();
    core.trust_group_service
        .delete_group(&manager, root_id)
        .await
        .unwrap();

    let result = core.trust_group_service.get_group(root_id).await;
    assert!(matches!(result, Err(ServiceError::EntityNotFound(_))));
}

async fn issue_key_pair(
    core: &VaultCore,
    group_id: TrustGroupId,
    entity_id: &str,
) -> (CertificateRequestId, Vec<u8>) {
    let writer = Session::new("writer", [Role::Writer]);
    let approver = Session::new("approver", [Role::Approver]);

    let request_id = core
        .certificate_request_service
        .start_new_key_pair_request(
            &writer,
            StartKeyPairRequestDTO {
                entity_id: entity_id.into(),
                group_id,
                subject_name: format!("CN={entity_id},O=Procivis"),
                domain_names: vec![format!("{entity_id}.example.com")],
                private_key_format: Some(PrivateKeyFormat::Der),
            },
        )
        .await
        .unwrap();
    core.certificate_request_service
        .approve(&approver, request_id)
        .await
        .unwrap();
    let finished = core
        .certificate_request_service
        .finish_new_key_pair_request(&writer, request_id)
        .await
        .unwrap();

    (request_id, finished.certificate.unwrap())
}

#[tokio::test]
async fn test_renewals_keep_issued_chains_verifiable() {
    init_logging();

    let directory = tempfile::tempdir().unwrap();
    let core = start_core(&directory).await;
    let manager = Session::new("manager", [Role::Manager]);
    let writer = Session::new("writer", [Role::Writer]);

    let root_id = core
        .trust_group_service
        .create_root(&manager, group_request("root", "CN=Root CA", 24))
        .await
        .unwrap();
    let sub_id = core
        .trust_group_service
        .create_sub_group(&manager, root_id, group_request("apps", "CN=App CA", 12))
        .await
        .unwrap();
    let (_, certificate) = issue_key_pair(&core, sub_id, "app-b").await;
    core.trust_relationship_service
        .add_trust_relationship(&writer, "app-a".into(), "app-b".into())
        .await
        .unwrap();

    // leaf issued before the renewal of its group
    let renewed = core
        .trust_group_service
        .renew_issuer_certificate(&manager, sub_id)
        .await
        .unwrap();
    assert_eq!(renewed, 2);

    let trusted = core
        .trust_relationship_service
        .list_trusted_certificates("app-a".into(), ListQuery::default())
        .await
        .unwrap();
    let leaf_chain = &trusted.values[0].issuer_chain;
    assert_eq!(leaf_chain.len(), 2);
    assert_issued_by(&certificate, &leaf_chain[0]);
    assert_issued_by(&leaf_chain[0], &leaf_chain[1]);

    // sub group issuer signed before the renewal of the root
    let renewed = core
        .trust_group_service
        .renew_issuer_certificate(&manager, root_id)
        .await
        .unwrap();
    assert_eq!(renewed, 2);

    let chain = core
        .issuer_chain_service
        .resolve_certificate_chain(sub_id)
        .await
        .unwrap();
    assert_issued_by(&chain[0], &chain[1]);
    assert_issued_by(&chain[1], &chain[1]);

    let (_, certificate) = issue_key_pair(&core, sub_id, "app-c").await;
    assert_issued_by(&certificate, &chain[0]);

    // groups created afterwards are signed by the renewed root
    let late_id = core
        .trust_group_service
        .create_sub_group(&manager, root_id, group_request("late", "CN=Late CA", 12))
        .await
        .unwrap();
    let late_chain = core
        .issuer_chain_service
        .resolve_certificate_chain(late_id)
        .await
        .unwrap();
    assert_issued_by(&late_chain[0], &late_chain[1]);
    assert_ne!(late_chain[1], chain[1]);
}

#[tokio::test]
async fn test_revoked_certificate_is_listed_in_crl() {
    init_logging();

    let directory = tempfile::tempdir().unwrap();
    let core = start_core(&directory).await;
    let manager = Session::new("manager", [Role::Manager]);
    let writer = Session::new("writer", [Role::Writer]);

    let root_id = core
        .trust_group_service
        .create_root(&manager, group_request("root", "CN=Root CA", 24))
        .await
        .unwrap();
    let (request_id, certificate) = issue_key_pair(&core, root_id, "app-b").await;
    let (_, kept) = issue_key_pair(&core, root_id, "app-b").await;
    core.trust_relationship_service
        .add_trust_relationship(&writer, "app-a".into(), "app-b".into())
        .await
        .unwrap();

    core.certificate_request_service
        .revoke_certificate(&manager, request_id)
        .await
        .unwrap();

    let crls = core
        .issuer_chain_service
        .resolve_crl_chain(root_id)
        .await
        .unwrap();
    let chain = core
        .issuer_chain_service
        .resolve_certificate_chain(root_id)
        .await
        .unwrap();
    let (_, crl) = CertificateRevocationList::from_der(&crls[0]).unwrap();
    let (_, issuer) = X509Certificate::from_der(&chain[0]).unwrap();
    let (_, revoked) = X509Certificate::from_der(&certificate).unwrap();
    crl.verify_signature(issuer.public_key()).unwrap();
    assert_eq!(crl.crl_number().unwrap().to_string(), "2");
    assert_eq!(
        crl.iter_revoked_certificates()
            .map(|entry| entry.raw_serial().to_vec())
            .collect::<Vec<_>>(),
        vec![revoked.raw_serial().to_vec()]
    );

    let stored = core
        .certificate_request_service
        .get_request(request_id)
        .await
        .unwrap();
    assert_eq!(stored.state, CertificateRequestState::Completed);
    assert!(stored.revoked.is_some());
    assert!(!stored.key_material_available);

    let trusted = core
        .trust_relationship_service
        .list_trusted_certificates("app-a".into(), ListQuery::default())
        .await
        .unwrap();
    assert_eq!(trusted.values.len(), 1);
    assert_eq!(trusted.values[0].certificate, kept);
}
