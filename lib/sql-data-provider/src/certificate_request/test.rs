use sea_orm::{DatabaseConnection, EntityTrait};
use shared_types::EntityId;
use similar_asserts::assert_eq;
use uuid::Uuid;
use vault_core::model::certificate_request::{
    CertificateRequest, CertificateRequestFilter, CertificateRequestState, CertificateRequestType,
    PrivateKeyFormat, UpdateCertificateRequestState,
};
use vault_core::model::common::OperationStamp;
use vault_core::model::list_query::PageCursor;
use vault_core::repository::certificate_request_repository::CertificateRequestRepository;
use vault_core::repository::error::DataLayerError;

use super::CertificateRequestProvider;
use crate::entity;
use crate::test_utilities::{dummy_request, get_dummy_date, setup_test_data_layer_and_connection};

struct TestSetup {
    pub db: DatabaseConnection,
    pub provider: CertificateRequestProvider,
}

async fn setup() -> TestSetup {
    let data_layer = setup_test_data_layer_and_connection().await;
    let db = data_layer.db;

    TestSetup {
        db: db.clone(),
        provider: CertificateRequestProvider { db },
    }
}

#[tokio::test]
async fn test_create_and_get_request() {
    // given
    let setup = setup().await;
    let request = CertificateRequest {
        request_type: CertificateRequestType::KeyPairRequest,
        csr: None,
        private_key_format: Some(PrivateKeyFormat::Der),
        domain_names: vec!["a.example.com".to_string(), "b.example.com".to_string()],
        ..dummy_request("app-a", Uuid::new_v4().into(), CertificateRequestState::New, 1)
    };

    // when
    let id = setup.provider.create(request.clone()).await.unwrap();

    // then
    assert_eq!(id, request.id);
    assert_eq!(setup.provider.get(id).await.unwrap(), Some(request));
}

#[tokio::test]
async fn test_create_request_twice() {
    let setup = setup().await;
    let request = dummy_request("app-a", Uuid::new_v4().into(), CertificateRequestState::New, 1);

    setup.provider.create(request.clone()).await.unwrap();
    let result = setup.provider.create(request).await;

    assert!(matches!(result, Err(DataLayerError::AlreadyExists)));
}

#[tokio::test]
async fn test_get_missing_request() {
    let setup = setup().await;

    let result = setup.provider.get(Uuid::new_v4().into()).await.unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_update_state_applies_once() {
    // given
    let setup = setup().await;
    let request = dummy_request("app-a", Uuid::new_v4().into(), CertificateRequestState::New, 1);
    setup.provider.create(request.clone()).await.unwrap();

    let approved = OperationStamp {
        authority_id: "approver".to_string(),
        time: get_dummy_date(),
    };
    let update = UpdateCertificateRequestState {
        certificate: Some(vec![0x30, 0x03]),
        private_key_handle: Some(Some("key-1".into())),
        key_material_available: Some(true),
        approved: Some(approved.clone()),
        ..UpdateCertificateRequestState::transition(&request, CertificateRequestState::Approved)
    };

    // when
    setup
        .provider
        .update_state(request.id, update.clone())
        .await
        .unwrap();
    let second = setup.provider.update_state(request.id, update).await;

    // then
    assert!(matches!(second, Err(DataLayerError::RecordNotUpdated)));

    let stored = setup.provider.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.state, CertificateRequestState::Approved);
    assert_eq!(stored.version, request.version + 1);
    assert_eq!(stored.certificate, Some(vec![0x30, 0x03]));
    assert_eq!(stored.private_key_handle, Some("key-1".into()));
    assert!(stored.key_material_available);
    assert_eq!(stored.approved, Some(approved));
    assert_eq!(stored.accepted, None);
    assert_eq!(stored.submitted, request.submitted);
}

#[tokio::test]
async fn test_update_state_clears_key_handle() {
    // given
    let setup = setup().await;
    let request = CertificateRequest {
        certificate: Some(vec![1]),
        private_key_handle: Some("key-1".into()),
        key_material_available: true,
        ..dummy_request(
            "app-a",
            Uuid::new_v4().into(),
            CertificateRequestState::Completed,
            1,
        )
    };
    setup.provider.create(request.clone()).await.unwrap();

    // when
    setup
        .provider
        .update_state(
            request.id,
            UpdateCertificateRequestState {
                private_key_handle: Some(None),
                key_material_available: Some(false),
                accepted: Some(OperationStamp {
                    authority_id: "writer".to_string(),
                    time: get_dummy_date(),
                }),
                ..UpdateCertificateRequestState::transition(
                    &request,
                    CertificateRequestState::Accepted,
                )
            },
        )
        .await
        .unwrap();

    // then
    let stored = setup.provider.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.state, CertificateRequestState::Accepted);
    assert_eq!(stored.private_key_handle, None);
    assert!(!stored.key_material_available);
    assert_eq!(stored.certificate, Some(vec![1]));
}

#[tokio::test]
async fn test_update_state_with_wrong_expected_state() {
    let setup = setup().await;
    let request = dummy_request("app-a", Uuid::new_v4().into(), CertificateRequestState::New, 1);
    setup.provider.create(request.clone()).await.unwrap();

    let result = setup
        .provider
        .update_state(
            request.id,
            UpdateCertificateRequestState {
                expected_state: CertificateRequestState::Approved,
                ..UpdateCertificateRequestState::transition(
                    &request,
                    CertificateRequestState::Completed,
                )
            },
        )
        .await;

    assert!(matches!(result, Err(DataLayerError::RecordNotUpdated)));
    let stored = setup.provider.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.state, CertificateRequestState::New);
}

#[tokio::test]
async fn test_delete_request() {
    let setup = setup().await;
    let request = dummy_request("app-a", Uuid::new_v4().into(), CertificateRequestState::New, 1);
    setup.provider.create(request.clone()).await.unwrap();

    setup.provider.delete(request.id).await.unwrap();
    let again = setup.provider.delete(request.id).await;

    assert!(matches!(again, Err(DataLayerError::RecordNotFound)));
    assert!(
        entity::certificate_request::Entity::find()
            .all(&setup.db)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_list_requests_with_filter() {
    // given
    let setup = setup().await;
    let group_id = Uuid::new_v4().into();
    let requests = [
        dummy_request("app-a", group_id, CertificateRequestState::New, 1),
        dummy_request("app-b", group_id, CertificateRequestState::New, 2),
        dummy_request("app-a", group_id, CertificateRequestState::Rejected, 3),
        dummy_request("app-a", Uuid::new_v4().into(), CertificateRequestState::New, 4),
    ];
    for request in &requests {
        setup.provider.create(request.clone()).await.unwrap();
    }

    // when
    let of_entity = setup
        .provider
        .list(
            CertificateRequestFilter {
                entity_id: Some(EntityId::from("app-a")),
                ..Default::default()
            },
            None,
            10,
        )
        .await
        .unwrap();
    let new_in_group = setup
        .provider
        .list(
            CertificateRequestFilter {
                group_id: Some(group_id),
                state: Some(CertificateRequestState::New),
                ..Default::default()
            },
            None,
            10,
        )
        .await
        .unwrap();

    // then
    assert_eq!(
        of_entity.iter().map(|request| request.id).collect::<Vec<_>>(),
        vec![requests[0].id, requests[2].id, requests[3].id]
    );
    assert_eq!(
        new_in_group
            .iter()
            .map(|request| request.id)
            .collect::<Vec<_>>(),
        vec![requests[0].id, requests[1].id]
    );
}

#[tokio::test]
async fn test_list_requests_after_cursor_with_equal_sort_keys() {
    // given
    let setup = setup().await;
    let group_id = Uuid::new_v4().into();
    let mut requests: Vec<_> = (0..3)
        .map(|_| dummy_request("app-a", group_id, CertificateRequestState::New, 7))
        .collect();
    for request in &requests {
        setup.provider.create(request.clone()).await.unwrap();
    }
    requests.sort_by_key(|request| request.id.to_string());

    // when
    let first = setup
        .provider
        .list(CertificateRequestFilter::default(), None, 1)
        .await
        .unwrap();
    let rest = setup
        .provider
        .list(
            CertificateRequestFilter::default(),
            Some(PageCursor {
                sort_key: 7,
                id: first[0].id.to_string(),
            }),
            10,
        )
        .await
        .unwrap();

    // then
    assert_eq!(first[0].id, requests[0].id);
    assert_eq!(
        rest.iter().map(|request| request.id).collect::<Vec<_>>(),
        vec![requests[1].id, requests[2].id]
    );
}

#[tokio::test]
async fn test_list_issued_certificates() {
    // given
    let setup = setup().await;
    let group_id = Uuid::new_v4().into();
    let issued = |entity_id: &str, sort_key: i64| CertificateRequest {
        certificate: Some(vec![sort_key as u8]),
        ..dummy_request(entity_id, group_id, CertificateRequestState::Accepted, sort_key)
    };
    let requests = [
        issued("app-b", 1),
        dummy_request("app-b", group_id, CertificateRequestState::New, 2),
        issued("app-c", 3),
        issued("app-d", 4),
        CertificateRequest {
            revoked: Some(OperationStamp {
                authority_id: "manager".to_string(),
                time: get_dummy_date(),
            }),
            ..issued("app-c", 5)
        },
    ];
    for request in &requests {
        setup.provider.create(request.clone()).await.unwrap();
    }

    // when
    let result = setup
        .provider
        .list_issued_certificates(
            vec![EntityId::from("app-b"), EntityId::from("app-c")],
            None,
            10,
        )
        .await
        .unwrap();
    let none = setup
        .provider
        .list_issued_certificates(vec![], None, 10)
        .await
        .unwrap();

    // then
    assert_eq!(
        result.iter().map(|request| request.id).collect::<Vec<_>>(),
        vec![requests[0].id, requests[2].id]
    );
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_update_state_records_revocation() {
    // given
    let setup = setup().await;
    let request = CertificateRequest {
        certificate: Some(vec![1]),
        issuer_version: Some(2),
        private_key_handle: Some("key-1".into()),
        key_material_available: true,
        ..dummy_request(
            "app-a",
            Uuid::new_v4().into(),
            CertificateRequestState::Completed,
            1,
        )
    };
    setup.provider.create(request.clone()).await.unwrap();
    let revoked = OperationStamp {
        authority_id: "manager".to_string(),
        time: get_dummy_date(),
    };

    // when
    setup
        .provider
        .update_state(
            request.id,
            UpdateCertificateRequestState {
                private_key_handle: Some(None),
                key_material_available: Some(false),
                revoked: Some(revoked.clone()),
                ..UpdateCertificateRequestState::transition(
                    &request,
                    CertificateRequestState::Completed,
                )
            },
        )
        .await
        .unwrap();

    // then
    let stored = setup.provider.get(request.id).await.unwrap().unwrap();
    assert_eq!(stored.state, CertificateRequestState::Completed);
    assert_eq!(stored.revoked, Some(revoked));
    assert_eq!(stored.issuer_version, Some(2));
    assert_eq!(stored.private_key_handle, None);
    assert_eq!(stored.version, request.version + 1);
}

#[tokio::test]
async fn test_list_revoked_of_issuer_version() {
    // given
    let setup = setup().await;
    let group_id = Uuid::new_v4().into();
    let revoked = |issuer_version: u32, sort_key: i64| CertificateRequest {
        certificate: Some(vec![sort_key as u8]),
        issuer_version: Some(issuer_version),
        revoked: Some(OperationStamp {
            authority_id: "manager".to_string(),
            time: get_dummy_date(),
        }),
        ..dummy_request("app-a", group_id, CertificateRequestState::Accepted, sort_key)
    };
    let requests = [
        revoked(1, 1),
        revoked(2, 2),
        CertificateRequest {
            revoked: None,
            ..revoked(1, 3)
        },
        revoked(1, 4),
        CertificateRequest {
            group_id: Uuid::new_v4().into(),
            ..revoked(1, 5)
        },
    ];
    for request in &requests {
        setup.provider.create(request.clone()).await.unwrap();
    }

    // when
    let result = setup.provider.list_revoked(group_id, 1).await.unwrap();

    // then
    assert_eq!(
        result.iter().map(|request| request.id).collect::<Vec<_>>(),
        vec![requests[0].id, requests[3].id]
    );
}
