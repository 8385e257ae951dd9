use std::sync::Arc;

use certificate_request::CertificateRequestProvider;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use trust_group::TrustGroupProvider;
use trust_relationship::TrustRelationshipProvider;
use vault_core::repository::DataRepository;
use vault_core::repository::certificate_request_repository::CertificateRequestRepository;
use vault_core::repository::error::DataLayerError;
use vault_core::repository::trust_group_repository::TrustGroupRepository;
use vault_core::repository::trust_relationship_repository::TrustRelationshipRepository;

use crate::mapper::to_data_layer_error;

mod entity;
mod list_query;
mod mapper;

pub mod certificate_request;
pub mod trust_group;
pub mod trust_relationship;

#[cfg(test)]
mod test_utilities;

#[derive(Clone)]
pub struct DataLayer {
    // Used for tests for now
    #[allow(unused)]
    db: DatabaseConnection,
    trust_group_repository: Arc<dyn TrustGroupRepository>,
    certificate_request_repository: Arc<dyn CertificateRequestRepository>,
    trust_relationship_repository: Arc<dyn TrustRelationshipRepository>,
}

impl DataLayer {
    /// Connects to `database_url` and brings the schema up to date
    pub async fn create(database_url: &str) -> Result<Self, DataLayerError> {
        let db = db_conn(database_url).await?;
        Self::build(db).await
    }

    pub async fn build(db: DatabaseConnection) -> Result<Self, DataLayerError> {
        Migrator::up(&db, None).await.map_err(to_data_layer_error)?;
        tracing::debug!("Database schema up to date");

        Ok(Self {
            trust_group_repository: Arc::new(TrustGroupProvider { db: db.clone() }),
            certificate_request_repository: Arc::new(CertificateRequestProvider {
                db: db.clone(),
            }),
            trust_relationship_repository: Arc::new(TrustRelationshipProvider { db: db.clone() }),
            db,
        })
    }
}

pub async fn db_conn(database_url: &str) -> Result<DatabaseConnection, DataLayerError> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    sea_orm::Database::connect(options)
        .await
        .map_err(to_data_layer_error)
}

impl DataRepository for DataLayer {
    fn get_trust_group_repository(&self) -> Arc<dyn TrustGroupRepository> {
        self.trust_group_repository.clone()
    }

    fn get_certificate_request_repository(&self) -> Arc<dyn CertificateRequestRepository> {
        self.certificate_request_repository.clone()
    }

    fn get_trust_relationship_repository(&self) -> Arc<dyn TrustRelationshipRepository> {
        self.trust_relationship_repository.clone()
    }
}
