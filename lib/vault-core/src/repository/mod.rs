pub mod certificate_request_repository;
pub mod error;
pub mod trust_group_repository;
pub mod trust_relationship_repository;

use std::sync::Arc;

use certificate_request_repository::CertificateRequestRepository;
use trust_group_repository::TrustGroupRepository;
use trust_relationship_repository::TrustRelationshipRepository;

/// Record store consumed by the engine
pub trait DataRepository: Send + Sync {
    fn get_trust_group_repository(&self) -> Arc<dyn TrustGroupRepository>;
    fn get_certificate_request_repository(&self) -> Arc<dyn CertificateRequestRepository>;
    fn get_trust_relationship_repository(&self) -> Arc<dyn TrustRelationshipRepository>;
}
