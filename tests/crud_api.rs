//! HTTP-level tests for the task endpoint, backed by the in-memory store.

mod common;

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use rmdn::db::MemoryTaskStore;
use serde_json::{json, Value};

async fn server() -> (String, Client) {
    let (base, _handle) = common::start_server(Arc::new(MemoryTaskStore::new())).await;
    (base, Client::new())
}

async fn list(client: &Client, base: &str, user_id: &str) -> Vec<Value> {
    let resp = client
        .get(format!("{base}/api/crud?user_id={user_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

async fn post(client: &Client, base: &str, body: Value) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{base}/api/crud"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn list_without_user_id_is_rejected() {
    let (base, client) = server().await;

    for url in [format!("{base}/api/crud"), format!("{base}/api/crud?user_id=")] {
        let resp = client.get(url).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Missing user_id" }));
    }
}

#[tokio::test]
async fn create_update_delete_round() {
    let (base, client) = server().await;
    let payload = json!({
        "user_id": "u1", "type": "todo", "content": "read", "day": 5, "progress": 0
    });

    let (status, created) = post(&client, &base, payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let id = created[0]["id"].as_i64().unwrap();

    let rows = list(&client, &base, "u1").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["day"], 5);
    assert_eq!(rows[0]["progress"], 0);
    assert_eq!(rows[0]["type"], "todo");

    let mut update = payload;
    update["id"] = json!(id);
    update["progress"] = json!(100);
    let (status, _) = post(&client, &base, update).await;
    assert_eq!(status, StatusCode::OK);

    let rows = list(&client, &base, "u1").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id);
    assert_eq!(rows[0]["progress"], 100);

    let resp = client
        .delete(format!("{base}/api/crud?id={id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));

    assert!(list(&client, &base, "u1").await.is_empty());
}

#[tokio::test]
async fn upsert_requires_fields() {
    let (base, client) = server().await;
    let complete = json!({ "user_id": "u1", "type": "todo", "content": "read", "day": 5 });

    for field in ["user_id", "type", "content", "day"] {
        let mut body = complete.clone();
        body.as_object_mut().unwrap().remove(field);
        let (status, err) = post(&client, &base, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(err, json!({ "error": "Missing fields" }));
    }

    let mut body = complete.clone();
    body["content"] = json!("");
    let (status, _) = post(&client, &base, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = complete;
    body["day"] = Value::Null;
    let (status, _) = post(&client, &base, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upsert_does_not_validate_type_or_range() {
    let (base, client) = server().await;
    let (status, rows) = post(
        &client,
        &base,
        json!({ "user_id": "u1", "type": "sholat", "content": "isya", "day": 0, "progress": 150 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows[0]["type"], "sholat");
    assert_eq!(rows[0]["day"], 0);
    assert_eq!(rows[0]["progress"], 150);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let (base, client) = server().await;
    let resp = client
        .post(format!("{base}/api/crud"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn update_without_progress_keeps_it() {
    let (base, client) = server().await;
    let (_, created) = post(
        &client,
        &base,
        json!({ "user_id": "u1", "type": "hapalan", "content": "juz 1", "day": 2, "progress": 50 }),
    )
    .await;
    let id = created[0]["id"].as_i64().unwrap();

    let (_, updated) = post(
        &client,
        &base,
        json!({ "id": id, "user_id": "u1", "type": "hapalan", "content": "juz 2", "day": 2 }),
    )
    .await;
    assert_eq!(updated[0]["content"], "juz 2");
    assert_eq!(updated[0]["progress"], 50);
}

#[tokio::test]
async fn list_is_scoped_and_ordered() {
    let (base, client) = server().await;
    for (user, day) in [("u1", 3), ("u2", 1), ("u1", 1), ("u1", 2)] {
        post(
            &client,
            &base,
            json!({ "user_id": user, "type": "todo", "content": "x", "day": day }),
        )
        .await;
    }

    let rows = list(&client, &base, "u1").await;
    assert_eq!(rows.len(), 3);
    let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert!(rows.iter().all(|r| r["user_id"] == "u1"));
}

#[tokio::test]
async fn delete_edge_cases() {
    let (base, client) = server().await;

    let resp = client
        .delete(format!("{base}/api/crud"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Missing task id" }));

    let resp = client
        .delete(format!("{base}/api/crud?id=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .delete(format!("{base}/api/crud?id=424242"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn dashboard_stats_project_the_list() {
    let (base, client) = server().await;
    for (task_type, day, progress) in [("todo", 1, 100), ("todo", 1, 0), ("chat", 2, 50)] {
        post(
            &client,
            &base,
            json!({
                "user_id": "u1", "type": task_type, "content": "x", "day": day,
                "progress": progress
            }),
        )
        .await;
    }

    let resp = client
        .get(format!("{base}/api/dashboard/stats?user_id=u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let stats: Value = resp.json().await.unwrap();

    assert_eq!(stats["status_counts"], json!({ "not_ready": 1, "in_process": 1, "success": 1 }));
    assert_eq!(stats["categories"][0]["average"], 50);
    assert_eq!(stats["categories"][3]["average"], 50);
    assert_eq!(stats["days"].as_array().unwrap().len(), 30);
    assert_eq!(stats["days"][0]["color"], "success");
    assert_eq!(stats["days"][0]["completed"], true);
    assert_eq!(stats["days"][2]["color"], "empty");

    let resp = client
        .get(format!("{base}/api/dashboard/stats"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_probes() {
    let (base, client) = server().await;

    let resp = client
        .get(format!("{base}/health/live"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");

    let resp = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["storage"], "connected");
}

#[tokio::test]
async fn storage_failures_surface_as_server_errors() {
    let store = Arc::new(common::ControlledStore::default());
    let (base, _handle) = common::start_server(store.clone()).await;
    let client = Client::new();
    store.set_failing(true);

    let resp = client
        .get(format!("{base}/api/crud?user_id=u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "storage unavailable" }));

    let resp = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "degraded");
}
