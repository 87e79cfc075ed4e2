#![allow(dead_code)]

use docmock::prelude::*;
use serde_json::json;
use tracing_subscriber::filter::LevelFilter;

pub fn fields(json: serde_json::Value) -> Fields {
    fields_from_json(json).unwrap()
}

/// Routes library logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

/// Three users and one nested subcollection.
pub async fn users_db() -> MockDatabase {
    init_tracing();

    create_mock_from_json(json!({
        "users": {
            "alice": { "name": "Alice", "age": 30, "tags": ["admin", "ops"] },
            "bob": { "name": "Bob", "age": 25, "tags": ["dev"] },
            "carol": { "name": "Carol", "age": 35 },
        },
        "users/alice/posts": {
            "p1": { "title": "Hello" },
            "p2": { "title": "World" },
        },
    }))
    .await
    .unwrap()
}
