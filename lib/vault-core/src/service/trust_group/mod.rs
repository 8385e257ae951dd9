use std::sync::Arc;

use shared_types::TrustGroupId;

use crate::config::core_config;
use crate::provider::key_vault::KeyVault;
use crate::repository::trust_group_repository::TrustGroupRepository;
use crate::util::keyed_lock::KeyedLock;

pub mod dto;
pub mod mapper;
pub mod service;
pub(crate) mod validator;


/// Store operations and lifecycle (create, renew, delete) of trust groups
#[derive(Clone)]
pub struct TrustGroupService {
    trust_group_repository: Arc<dyn TrustGroupRepository>,
    key_vault: Arc<dyn KeyVault>,
    config: Arc<core_config::CoreConfig>,
    group_locks: Arc<KeyedLock<TrustGroupId>>,
}

impl TrustGroupService {
    pub fn new(
        trust_group_repository: Arc<dyn TrustGroupRepository>,
        key_vault: Arc<dyn KeyVault>,
        config: Arc<core_config::CoreConfig>,
    ) -> Self {
        Self {
            trust_group_repository,
            key_vault,
            config,
            group_locks: Default::default(),
        }
    }
}
