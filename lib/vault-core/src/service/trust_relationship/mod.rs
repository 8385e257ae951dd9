use std::sync::Arc;

use crate::config::core_config;
use crate::repository::certificate_request_repository::CertificateRequestRepository;
use crate::repository::trust_relationship_repository::TrustRelationshipRepository;
use crate::service::issuer_chain::IssuerChainService;

pub mod dto;
pub mod service;


/// Directed, non-transitive trust between entities
#[derive(Clone)]
pub struct TrustRelationshipService {
    trust_relationship_repository: Arc<dyn TrustRelationshipRepository>,
    certificate_request_repository: Arc<dyn CertificateRequestRepository>,
    issuer_chain_service: IssuerChainService,
    config: Arc<core_config::CoreConfig>,
}

impl TrustRelationshipService {
    pub fn new(
        trust_relationship_repository: Arc<dyn TrustRelationshipRepository>,
        certificate_request_repository: Arc<dyn CertificateRequestRepository>,
        issuer_chain_service: IssuerChainService,
        config: Arc<core_config::CoreConfig>,
    ) -> Self {
        Self {
            trust_relationship_repository,
            certificate_request_repository,
            issuer_chain_service,
            config,
        }
    }
}
