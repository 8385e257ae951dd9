use std::sync::Arc;

use crate::config::core_config;
use crate::repository::trust_group_repository::TrustGroupRepository;

pub mod dto;
pub mod service;

#[cfg(test)]
mod test;

#[derive(Clone)]
pub struct IssuerChainService {
    trust_group_repository: Arc<dyn TrustGroupRepository>,
    config: Arc<core_config::CoreConfig>,
}

impl IssuerChainService {
    pub fn new(
        trust_group_repository: Arc<dyn TrustGroupRepository>,
        config: Arc<core_config::CoreConfig>,
    ) -> Self {
        Self {
            trust_group_repository,
            config,
        }
    }
}
