use std::sync::Arc;

use shared_types::{CertificateRequestId, TrustGroupId};

use crate::config::core_config;
use crate::provider::key_vault::KeyVault;
use crate::repository::certificate_request_repository::CertificateRequestRepository;
use crate::repository::trust_group_repository::TrustGroupRepository;
use crate::util::keyed_lock::KeyedLock;

pub mod dto;
pub mod mapper;
pub mod service;
pub mod state_machine;
pub(crate) mod validator;


/// Signing and key-pair request workflow
#[derive(Clone)]
pub struct CertificateRequestService {
    certificate_request_repository: Arc<dyn CertificateRequestRepository>,
    trust_group_repository: Arc<dyn TrustGroupRepository>,
    key_vault: Arc<dyn KeyVault>,
    config: Arc<core_config::CoreConfig>,
    approval_locks: Arc<KeyedLock<CertificateRequestId>>,
    crl_locks: Arc<KeyedLock<TrustGroupId>>,
}

impl CertificateRequestService {
    pub fn new(
        certificate_request_repository: Arc<dyn CertificateRequestRepository>,
        trust_group_repository: Arc<dyn TrustGroupRepository>,
        key_vault: Arc<dyn KeyVault>,
        config: Arc<core_config::CoreConfig>,
    ) -> Self {
        Self {
            certificate_request_repository,
            trust_group_repository,
            key_vault,
            config,
            approval_locks: Default::default(),
            crl_locks: Default::default(),
        }
    }
}
