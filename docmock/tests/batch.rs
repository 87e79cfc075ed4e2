mod common;

use std::sync::Arc;

use docmock::prelude::*;
use serde_json::json;

use common::{fields, users_db};

#[tokio::test]
async fn writes_apply_only_on_commit() {
    let db = create_mock_from_json(json!({
        "docs": {
            "doc1": { "v": 1 },
            "doc2": { "v": 2 },
        },
    }))
    .await
    .unwrap();
    let doc1 = db.doc("docs/doc1").unwrap();
    let doc2 = db.doc("docs/doc2").unwrap();

    let batch = db.batch();
    batch.delete(&doc1).update(&doc2, fields(json!({ "v": 20 })));
    assert_eq!(batch.len(), 2);

    assert!(doc1.get().await.unwrap().exists());
    assert_eq!(doc2.get().await.unwrap().get("v"), Some(&Value::Integer(2)));

    batch.commit().await.unwrap();

    assert!(!doc1.get().await.unwrap().exists());
    assert_eq!(doc2.get().await.unwrap().get("v"), Some(&Value::Integer(20)));
    assert!(batch.is_empty());
}

#[tokio::test]
async fn writes_apply_in_enqueue_order() {
    let db = users_db().await;
    let dave = db.doc("users/dave").unwrap();

    let batch = db.batch();
    batch
        .set(&dave, fields(json!({ "name": "Dave", "age": 20 })))
        .update(&dave, fields(json!({ "age": 21 })))
        .set_with(&dave, fields(json!({ "city": "Rome" })), SetOptions::merge());
    batch.commit().await.unwrap();

    assert_eq!(
        dave.get().await.unwrap().data(),
        Some(fields(json!({ "name": "Dave", "age": 21, "city": "Rome" })))
    );
}

#[tokio::test]
async fn batch_is_shared_and_reusable() {
    let db = users_db().await;
    assert!(Arc::ptr_eq(&db.batch(), &db.batch()));

    db.batch().delete(&db.doc("users/alice").unwrap());
    db.batch().commit().await.unwrap();
    assert!(!db.doc("users/alice").unwrap().get().await.unwrap().exists());

    db.batch().delete(&db.doc("users/bob").unwrap());
    db.batch().commit().await.unwrap();
    assert_eq!(db.collection("users").get().await.unwrap().ids(), vec!["carol"]);
}

#[tokio::test]
async fn empty_commit_is_a_noop() {
    let db = users_db().await;

    db.batch().commit().await.unwrap();

    assert_eq!(db.collection("users").get().await.unwrap().size(), 3);
}

#[tokio::test]
async fn batched_update_of_missing_document_is_skipped() {
    let db = users_db().await;
    let ghost = db.doc("users/ghost").unwrap();
    let carol = db.doc("users/carol").unwrap();

    let batch = db.batch();
    batch.update(&ghost, fields(json!({ "age": 1 }))).delete(&carol);
    batch.commit().await.unwrap();

    assert!(!ghost.get().await.unwrap().exists());
    assert!(!carol.get().await.unwrap().exists());
}
