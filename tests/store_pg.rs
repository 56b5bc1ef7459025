//! Store tests against a live local PostgreSQL.
//!
//! These are `#[ignore]`d: they need a disposable local database, e.g.
//!
//! ```text
//! export CHAINMIRROR_TEST_DATABASE_URL=postgresql://localhost/chainmirror_test
//! cargo test -- --ignored
//! ```

use chainmirror::CheckpointStore;
use chainmirror::DocumentSink;
use chainmirror::StateDocument;
use chainmirror::Store;

async fn connect() -> Store {
    let url = std::env::var("CHAINMIRROR_TEST_DATABASE_URL")
        .expect("CHAINMIRROR_TEST_DATABASE_URL must point at a local test database");
    assert!(
        url.contains("localhost") || url.contains("127.0.0.1"),
        "store tests must run against a local database"
    );

    let pool = sqlx::PgPool::connect(&url).await.unwrap();
    let store = Store::new(pool);
    store.init_schema().await.unwrap();
    store
}

#[tokio::test]
#[ignore]
async fn checkpoint_upsert_round_trip() {
    let store = connect().await;

    store
        .update_checkpoint("pg-test", "round-trip", 100)
        .await
        .unwrap();
    assert_eq!(
        store
            .get_synced_block_index("pg-test", "round-trip")
            .await
            .unwrap(),
        100
    );

    store
        .update_checkpoint("pg-test", "round-trip", 115)
        .await
        .unwrap();
    assert_eq!(
        store
            .get_synced_block_index("pg-test", "round-trip")
            .await
            .unwrap(),
        115
    );
}

#[tokio::test]
#[ignore]
async fn missing_checkpoint_is_not_found() {
    let store = connect().await;

    let err = store
        .get_synced_block_index("pg-test", "never-synced")
        .await
        .unwrap_err();
    assert!(err.is_checkpoint_not_found());
}

#[tokio::test]
#[ignore]
async fn document_upsert_is_idempotent() {
    let store = connect().await;

    let document = StateDocument {
        key: "pg-test-doc".to_string(),
        address: "0xpg-test-doc".to_string(),
        block_index: 7,
        body: serde_json::json!({ "raw": "6475313a61" }),
    };

    store
        .upsert_many("pg-test-docs", std::slice::from_ref(&document))
        .await
        .unwrap();
    store
        .upsert_many("pg-test-docs", std::slice::from_ref(&document))
        .await
        .unwrap();

    let stored = store
        .get_document("pg-test-docs", "pg-test-doc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, document);
}
