use std::sync::Arc;

use config::ConfigValidationError;
use config::core_config::CoreConfig;
use provider::key_vault::KeyVault;
use repository::DataRepository;
use service::certificate_request::CertificateRequestService;
use service::issuer_chain::IssuerChainService;
use service::trust_group::TrustGroupService;
use service::trust_relationship::TrustRelationshipService;

pub mod common_mapper;
pub mod config;
pub mod model;
pub mod provider;
pub mod repository;
pub mod service;
pub mod util;

/// Certificate authority engine: trust group hierarchy, request workflow and trust graph
#[derive(Clone)]
pub struct VaultCore {
    pub trust_group_service: TrustGroupService,
    pub certificate_request_service: CertificateRequestService,
    pub trust_relationship_service: TrustRelationshipService,
    pub issuer_chain_service: IssuerChainService,
    pub config: Arc<CoreConfig>,
}

impl VaultCore {
    pub fn new(
        data_repository: Arc<dyn DataRepository>,
        key_vault: Arc<dyn KeyVault>,
        config: CoreConfig,
    ) -> Result<VaultCore, ConfigValidationError> {
        config.validate()?;
        let config = Arc::new(config);

        let trust_group_repository = data_repository.get_trust_group_repository();
        let certificate_request_repository = data_repository.get_certificate_request_repository();

        let issuer_chain_service =
            IssuerChainService::new(trust_group_repository.clone(), config.clone());

        Ok(VaultCore {
            trust_group_service: TrustGroupService::new(
                trust_group_repository.clone(),
                key_vault.clone(),
                config.clone(),
            ),
            certificate_request_service: CertificateRequestService::new(
                certificate_request_repository.clone(),
                trust_group_repository,
                key_vault,
                config.clone(),
            ),
            trust_relationship_service: TrustRelationshipService::new(
                data_repository.get_trust_relationship_repository(),
                certificate_request_repository,
                issuer_chain_service.clone(),
                config.clone(),
            ),
            issuer_chain_service,
            config,
        })
    }
}
