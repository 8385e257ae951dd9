use sea_orm::DatabaseConnection;

pub mod repository;

pub(crate) struct TrustRelationshipProvider {
    pub db: DatabaseConnection,
}
