use std::collections::HashMap;
use std::sync::Arc;

use shared_types::TrustGroupId;

use super::IssuerChainService;
use crate::model::trust_group::{TrustGroup, TrustGroupIssuer};
use crate::repository::error::DataLayerError;
use crate::repository::trust_group_repository::MockTrustGroupRepository;
use crate::service::error::{EntityNotFoundError, ServiceError};
use crate::service::test_utilities::{dummy_issuer, dummy_trust_group, generic_config};

fn setup_service(repository: MockTrustGroupRepository) -> IssuerChainService {
    IssuerChainService::new(Arc::new(repository), Arc::new(generic_config()))
}

fn repository_with(groups: Vec<TrustGroup>) -> MockTrustGroupRepository {
    let groups: HashMap<TrustGroupId, TrustGroup> =
        groups.into_iter().map(|group| (group.id, group)).collect();

    let mut repository = MockTrustGroupRepository::default();
    repository
        .expect_get()
        .returning(move |id| Ok(groups.get(&id).cloned()));
    repository
}

fn with_issuer_versions(
    mut repository: MockTrustGroupRepository,
    issuers: Vec<TrustGroupIssuer>,
) -> MockTrustGroupRepository {
    repository.expect_get_issuer().returning(move |id, version| {
        Ok(issuers
            .iter()
            .find(|issuer| issuer.group_id == id && issuer.version == version)
            .cloned())
    });
    repository
}

/// root <- intermediate <- leaf
fn three_level_hierarchy() -> (TrustGroup, TrustGroup, TrustGroup) {
    let root = dummy_trust_group(None);
    let intermediate = dummy_trust_group(Some(root.id));
    let leaf = dummy_trust_group(Some(intermediate.id));
    (root, intermediate, leaf)
}

#[tokio::test]
async fn test_resolve_certificate_chain_root_last() {
    let (root, intermediate, leaf) = three_level_hierarchy();
    let expected = vec![
        leaf.issuer.clone().unwrap().certificate,
        intermediate.issuer.clone().unwrap().certificate,
        root.issuer.clone().unwrap().certificate,
    ];
    let leaf_id = leaf.id;

    let service = setup_service(repository_with(vec![root, intermediate, leaf]));

    let chain = service.resolve_certificate_chain(leaf_id).await.unwrap();
    assert_eq!(chain, expected);
}

#[tokio::test]
async fn test_chain_follows_parent_version_after_parent_renewal() {
    let mut root = dummy_trust_group(None);
    let root_v1 = dummy_issuer(root.id, 1);
    root.issuer = Some(dummy_issuer(root.id, 2));
    let mut sub = dummy_trust_group(Some(root.id));
    let sub_v1 = sub.issuer.as_mut().unwrap();
    sub_v1.parent_version = Some(1);
    let expected = vec![sub_v1.certificate.clone(), root_v1.certificate.clone()];
    let sub_id = sub.id;

    let repository = with_issuer_versions(repository_with(vec![root, sub]), vec![root_v1]);
    let service = setup_service(repository);

    let chain = service.resolve_certificate_chain(sub_id).await.unwrap();
    assert_eq!(chain, expected);
}

#[tokio::test]
async fn test_chain_for_previous_issuer_version() {
    let root = dummy_trust_group(None);
    let mut sub = dummy_trust_group(Some(root.id));
    let mut sub_v1 = dummy_issuer(sub.id, 1);
    sub_v1.parent_version = Some(1);
    let mut sub_v2 = dummy_issuer(sub.id, 2);
    sub_v2.parent_version = Some(1);
    sub.issuer = Some(sub_v2.clone());
    let expected = vec![
        sub_v1.certificate.clone(),
        root.issuer.clone().unwrap().certificate,
    ];
    let sub_id = sub.id;

    let repository = with_issuer_versions(repository_with(vec![root, sub]), vec![sub_v1]);
    let service = setup_service(repository);

    let chain = service
        .resolve_certificate_chain_for_issuer(sub_id, Some(1))
        .await
        .unwrap();
    assert_eq!(chain, expected);

    let current = service
        .resolve_certificate_chain_for_issuer(sub_id, Some(2))
        .await
        .unwrap();
    assert_eq!(current[0], sub_v2.certificate);
}

#[tokio::test]
async fn test_missing_issuer_version_is_corrupt_hierarchy() {
    let mut root = dummy_trust_group(None);
    root.issuer = Some(dummy_issuer(root.id, 3));
    let root_id = root.id;

    let repository = with_issuer_versions(repository_with(vec![root]), vec![]);
    let service = setup_service(repository);

    let result = service
        .resolve_certificate_chain_for_issuer(root_id, Some(1))
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::CorruptHierarchy { broken_at, .. }) if broken_at == root_id
    ));
}

#[tokio::test]
async fn test_resolve_crl_chain() {
    let (root, intermediate, _) = three_level_hierarchy();
    let expected = vec![
        intermediate.issuer.clone().unwrap().crl,
        root.issuer.clone().unwrap().crl,
    ];
    let intermediate_id = intermediate.id;

    let service = setup_service(repository_with(vec![root, intermediate]));

    let chain = service.resolve_crl_chain(intermediate_id).await.unwrap();
    assert_eq!(chain, expected);
}

#[tokio::test]
async fn test_root_chain_has_single_element() {
    let root = dummy_trust_group(None);
    let root_id = root.id;

    let service = setup_service(repository_with(vec![root]));

    assert_eq!(
        service.resolve_certificate_chain(root_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let service = setup_service(repository_with(vec![]));
    let id = TrustGroupId::new_v4();

    let result = service.resolve_certificate_chain(id).await;
    assert!(matches!(
        result,
        Err(ServiceError::EntityNotFound(EntityNotFoundError::TrustGroup(missing))) if missing == id
    ));
}

#[tokio::test]
async fn test_missing_ancestor_is_corrupt_hierarchy() {
    let (_, intermediate, leaf) = three_level_hierarchy();
    let (leaf_id, intermediate_id) = (leaf.id, intermediate.id);

    // intermediate points to a root that is gone
    let service = setup_service(repository_with(vec![intermediate, leaf]));

    let result = service.resolve_certificate_chain(leaf_id).await;
    assert!(matches!(
        result,
        Err(ServiceError::CorruptHierarchy { group_id, .. }) if group_id == leaf_id
    ));

    let result = service.resolve_crl_chain(intermediate_id).await;
    assert!(matches!(result, Err(ServiceError::CorruptHierarchy { .. })));
}

#[tokio::test]
async fn test_ancestor_without_issuer_is_corrupt_hierarchy() {
    let (mut root, intermediate, leaf) = three_level_hierarchy();
    root.issuer = None;
    let (root_id, leaf_id) = (root.id, leaf.id);

    let service = setup_service(repository_with(vec![root, intermediate, leaf]));

    let result = service.resolve_certificate_chain(leaf_id).await;
    assert!(matches!(
        result,
        Err(ServiceError::CorruptHierarchy { broken_at, .. }) if broken_at == root_id
    ));
}

#[tokio::test]
async fn test_parent_loop_is_corrupt_hierarchy() {
    let mut first = dummy_trust_group(None);
    let second = dummy_trust_group(Some(first.id));
    first.parent_id = Some(second.id);
    let first_id = first.id;

    let service = setup_service(repository_with(vec![first, second]));

    let result = service.resolve_certificate_chain(first_id).await;
    assert!(matches!(
        result,
        Err(ServiceError::CorruptHierarchy { broken_at, .. }) if broken_at == first_id
    ));
}

#[tokio::test]
async fn test_transient_read_failure_is_retried() {
    let root = dummy_trust_group(None);
    let root_id = root.id;

    let mut repository = MockTrustGroupRepository::default();
    repository
        .expect_get()
        .once()
        .returning(|_| Err(DataLayerError::Transient(anyhow::anyhow!("pool timeout"))));
    repository
        .expect_get()
        .once()
        .returning(move |_| Ok(Some(root.clone())));

    let service = setup_service(repository);

    assert_eq!(
        service.resolve_certificate_chain(root_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_permanent_read_failure_is_not_retried() {
    let mut repository = MockTrustGroupRepository::default();
    repository
        .expect_get()
        .once()
        .returning(|_| Err(DataLayerError::Db(anyhow::anyhow!("disk I/O error"))));

    let service = setup_service(repository);

    let result = service.resolve_certificate_chain(TrustGroupId::new_v4()).await;
    assert!(matches!(
        result,
        Err(ServiceError::Repository(DataLayerError::Db(_)))
    ));
}

#[tokio::test]
async fn test_get_issuer_certificate_versions() {
    let group_id = TrustGroupId::new_v4();
    let history = vec![dummy_issuer(group_id, 2), dummy_issuer(group_id, 1)];

    let mut repository = MockTrustGroupRepository::default();
    repository
        .expect_get_issuer_history()
        .once()
        .withf(move |id| *id == group_id)
        .returning(move |_| Ok(history.clone()));

    let service = setup_service(repository);

    let versions = service
        .get_issuer_certificate_versions(group_id)
        .await
        .unwrap();
    assert_eq!(
        versions.iter().map(|v| v.version).collect::<Vec<_>>(),
        vec![2, 1]
    );
    assert_eq!(versions[0].group_id, group_id);
}

#[tokio::test]
async fn test_get_issuer_certificate_versions_unknown_group() {
    let mut repository = MockTrustGroupRepository::default();
    repository
        .expect_get_issuer_history()
        .once()
        .returning(|_| Ok(vec![]));
    repository.expect_get().once().returning(|_| Ok(None));

    let service = setup_service(repository);

    let result = service
        .get_issuer_certificate_versions(TrustGroupId::new_v4())
        .await;
    assert!(matches!(result, Err(ServiceError::EntityNotFound(_))));
}
