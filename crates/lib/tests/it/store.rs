use canhoto::store::schema::{self, SCHEMA_VERSION};
use canhoto::{AuthService, ReceiptService, SqlxStore};

use crate::helpers::{invoice, sample_jpeg, test_store};

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let store = test_store().await;
    schema::initialize(&store).await.unwrap();
    schema::initialize(&store).await.unwrap();

    let (version,): (i64,) = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_newer_schema_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canhoto.db");

    let store = SqlxStore::open_sqlite(&path).await.unwrap();
    sqlx::query("UPDATE schema_version SET version = $1")
        .bind(SCHEMA_VERSION + 1)
        .execute(store.pool())
        .await
        .unwrap();
    store.close().await;

    let err = SqlxStore::open_sqlite(&path).await.unwrap_err();
    assert!(err.is_store_error());
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canhoto.db");

    {
        let store = SqlxStore::open_sqlite(&path).await.unwrap();
        AuthService::new(store.clone())
            .create_user("operador", "pw")
            .await
            .unwrap();
        ReceiptService::new(store.clone())
            .save(&invoice("100"), sample_jpeg())
            .await
            .unwrap();
        store.close().await;
    }

    let store = SqlxStore::open_sqlite(&path).await.unwrap();
    assert!(
        AuthService::new(store.clone())
            .authenticate("operador", "pw")
            .await
            .unwrap()
    );
    let receipts = ReceiptService::new(store);
    assert_eq!(receipts.count().await.unwrap(), 1);
    assert!(receipts.exists(&invoice("100")).await.unwrap());
}

#[tokio::test]
async fn test_in_memory_stores_are_isolated() {
    let a = SqlxStore::sqlite_in_memory().await.unwrap();
    let b = SqlxStore::sqlite_in_memory().await.unwrap();

    ReceiptService::new(a.clone())
        .save(&invoice("1"), sample_jpeg())
        .await
        .unwrap();

    assert_eq!(ReceiptService::new(a).count().await.unwrap(), 1);
    assert_eq!(ReceiptService::new(b).count().await.unwrap(), 0);
}
