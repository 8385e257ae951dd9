use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::SchemaManager;

async fn migrated() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

#[tokio::test]
async fn test_db_schema_tables() {
    let db = migrated().await;
    let manager = SchemaManager::new(&db);

    for table in [
        "trust_group",
        "trust_group_issuer",
        "certificate_request",
        "trust_relationship",
    ] {
        assert!(manager.has_table(table).await.unwrap(), "missing {table}");
    }

    for column in [
        "parent_id",
        "issued_signature_algorithm",
        "version",
        "sort_key",
    ] {
        assert!(manager.has_column("trust_group", column).await.unwrap());
    }

    for column in [
        "entity_id",
        "state",
        "domain_names",
        "private_key_handle",
        "key_material_available",
        "approved_by",
        "accepted_date",
        "issuer_version",
        "revoked_date",
        "version",
        "sort_key",
    ] {
        assert!(
            manager
                .has_column("certificate_request", column)
                .await
                .unwrap()
        );
    }

    assert!(
        manager
            .has_index("certificate_request", "index-CertificateRequest-SortKey-Id")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_db_schema_trust_group_parent_is_restricted() {
    let db = migrated().await;
    let now = "2025-03-01 00:00:00.000";
    let insert_group = |id: &str, parent: &str| {
        Statement::from_string(
            db.get_database_backend(),
            format!(
                "INSERT INTO trust_group VALUES ('{id}', '{now}', '{now}', {parent}, 'name', \
                 'HTTPS_CERTIFICATE', 'CN=x', 12, 256, 'ECDSA_P256_SHA256', 6, 256, \
                 'ECDSA_P256_SHA256', 0, 1)"
            ),
        )
    };

    let root = "00000000-0000-0000-0000-000000000001";
    let child = "00000000-0000-0000-0000-000000000002";
    db.execute(insert_group(root, "NULL")).await.unwrap();
    db.execute(insert_group(child, &format!("'{root}'")))
        .await
        .unwrap();

    let unknown_parent = insert_group(
        "00000000-0000-0000-0000-000000000003",
        "'00000000-0000-0000-0000-0000000000ff'",
    );
    assert!(db.execute(unknown_parent).await.is_err());

    let delete_root = Statement::from_string(
        db.get_database_backend(),
        format!("DELETE FROM trust_group WHERE id = '{root}'"),
    );
    assert!(db.execute(delete_root).await.is_err());
}

#[tokio::test]
async fn test_db_schema_migrations_are_idempotent() {
    let db = migrated().await;

    Migrator::up(&db, None).await.unwrap();
    assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
}
