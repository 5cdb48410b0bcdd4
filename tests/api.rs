//! HTTP integration tests.
//!
//! Starts the router on an ephemeral port over an in-memory store seeded with
//! the demo reviews and exercises it with reqwest.

use std::sync::Arc;

use review_lookup_api::api::AppState;
use review_lookup_api::build_app;
use review_lookup_api::storage::{InMemoryStore, demo_reviews};
use serde_json::{Value, json};

async fn start_server(store: InMemoryStore) -> String {
    let app = build_app(AppState::new(Arc::new(store)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn seeded() -> String {
    start_server(InMemoryStore::with_reviews(demo_reviews())).await
}

async fn get_json(url: String) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn home_and_health() {
    let base = seeded().await;

    let (status, body) = get_json(format!("{base}/")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("memory"));

    let (status, body) = get_json(format!("{base}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["total_reviews"], 6);
}

#[tokio::test]
async fn list_all_in_insertion_order() {
    let base = seeded().await;
    let (status, body) = get_json(format!("{base}/reviews")).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 6);
    assert_eq!(ids(&body), vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn get_by_id() {
    let base = seeded().await;

    let (status, body) = get_json(format!("{base}/reviews/3")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["data"],
        json!({"id": 3, "product_id": 102, "review": "Not what I expected", "rating": 2})
    );

    let (status, body) = get_json(format!("{base}/reviews/99")).await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Review not found");

    let (status, body) = get_json(format!("{base}/reviews/abc")).await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn reviews_by_product() {
    let base = seeded().await;

    let (status, body) = get_json(format!("{base}/reviews/product/101")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![1, 2, 5]);

    let (status, body) = get_json(format!("{base}/reviews/product/555")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn average_rating() {
    let base = seeded().await;

    let (status, body) = get_json(format!("{base}/reviews/product/101/average")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["data"],
        json!({"product_id": 101, "average_rating": 4.67, "total_reviews": 3})
    );

    let (status, body) = get_json(format!("{base}/reviews/product/555/average")).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Product has no reviews");
}

#[tokio::test]
async fn keyword_search() {
    let base = seeded().await;

    let (status, body) = get_json(format!("{base}/reviews/search?q=damaged")).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["product_id"], 104);

    let (_, body) = get_json(format!("{base}/reviews/search?q=GREAT")).await;
    assert_eq!(ids(&body), vec![1]);

    let (_, body) = get_json(format!("{base}/reviews/search")).await;
    assert_eq!(body["total"], 6);

    let (status, body) = get_json(format!("{base}/reviews/search?q=zzz")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn filter_by_rating() {
    let base = seeded().await;

    let (status, body) = get_json(format!("{base}/reviews/filter?rating=5")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![1, 4, 5]);

    let (status, body) = get_json(format!("{base}/reviews/filter")).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please provide ?rating=VALUE");

    let (status, _) = get_json(format!("{base}/reviews/filter?rating=five")).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn sort_by_rating() {
    let base = seeded().await;

    let (_, body) = get_json(format!("{base}/reviews/sort")).await;
    assert_eq!(ids(&body), vec![6, 3, 2, 1, 4, 5]);

    let (_, body) = get_json(format!("{base}/reviews/sort?order=desc")).await;
    assert_eq!(ids(&body), vec![1, 4, 5, 2, 3, 6]);

    let (_, body) = get_json(format!("{base}/reviews/sort?order=DESC")).await;
    assert_eq!(ids(&body), vec![6, 3, 2, 1, 4, 5]);
}

#[tokio::test]
async fn recent_reviews() {
    let base = seeded().await;

    let (_, body) = get_json(format!("{base}/reviews/recent")).await;
    assert_eq!(ids(&body), vec![4, 5, 6]);

    let (_, body) = get_json(format!("{base}/reviews/recent?limit=2")).await;
    assert_eq!(ids(&body), vec![5, 6]);

    let (_, body) = get_json(format!("{base}/reviews/recent?limit=50")).await;
    assert_eq!(body["total"], 6);

    let (status, body) = get_json(format!("{base}/reviews/recent?limit=0")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));

    let (_, body) = get_json(format!("{base}/reviews/recent?limit=-1")).await;
    assert_eq!(body["data"], json!([]));

    let (_, body) = get_json(format!("{base}/reviews/recent?limit=abc")).await;
    assert_eq!(ids(&body), vec![4, 5, 6]);
}

#[tokio::test]
async fn create_then_get() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/reviews"))
        .json(&json!({"product_id": 200, "review": "Solid build", "rating": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"],
        json!({"id": 7, "product_id": 200, "review": "Solid build", "rating": 4})
    );

    let (status, body) = get_json(format!("{base}/reviews/7")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["review"], "Solid build");
}

#[tokio::test]
async fn create_from_form_and_empty_store() {
    let base = start_server(InMemoryStore::new()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/reviews"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("product_id=9&review=Too+loud&rating=11")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["rating"], 11);
    assert_eq!(body["data"]["review"], "Too loud");
}

#[tokio::test]
async fn create_missing_fields() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/reviews"))
        .json(&json!({"review": "no product"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing fields: product_id, rating");

    let resp = client
        .post(format!("{base}/reviews"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let (_, body) = get_json(format!("{base}/reviews")).await;
    assert_eq!(body["total"], 6);
}

#[tokio::test]
async fn ids_not_reused_after_deleting_highest() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client.delete(format!("{base}/reviews/6")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{base}/reviews"))
        .json(&json!({"product_id": 104, "review": "Replacement was fine", "rating": 4}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], 7);

    client.delete(format!("{base}/reviews/2")).send().await.unwrap();
    let resp = client
        .post(format!("{base}/reviews"))
        .json(&json!({"product_id": 1, "review": "x", "rating": 1}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], 8);

    let (_, body) = get_json(format!("{base}/reviews")).await;
    assert_eq!(ids(&body), vec![1, 3, 4, 5, 7, 8]);
}

#[tokio::test]
async fn partial_update() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/reviews/2"))
        .json(&json!({"rating": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Review updated");
    assert_eq!(
        body["data"],
        json!({"id": 2, "product_id": 101, "review": "Good quality for the price", "rating": 3})
    );

    let (_, body) = get_json(format!("{base}/reviews/2")).await;
    assert_eq!(body["data"]["rating"], 3);
}

#[tokio::test]
async fn update_unknown_id() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/reviews/99"))
        .json(&json!({"rating": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let (_, body) = get_json(format!("{base}/reviews")).await;
    assert_eq!(body["data"], serde_json::to_value(demo_reviews()).unwrap());
}

#[tokio::test]
async fn delete_twice_succeeds() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let resp = client.delete(format!("{base}/reviews/4")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"success": true, "message": "Review deleted"}));
    }

    let (status, _) = get_json(format!("{base}/reviews/4")).await;
    assert_eq!(status, 404);

    let (_, body) = get_json(format!("{base}/reviews")).await;
    assert_eq!(ids(&body), vec![1, 2, 3, 5, 6]);
}

#[tokio::test]
async fn repeated_query_params_use_first_value() {
    let base = seeded().await;

    let (status, body) = get_json(format!("{base}/reviews/recent?limit=1&limit=2")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![6]);

    let (status, body) = get_json(format!("{base}/reviews/sort?order=desc&order=asc")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![1, 4, 5, 2, 3, 6]);

    let (status, body) = get_json(format!("{base}/reviews/search?q=damaged&q=great")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![6]);

    let (status, body) = get_json(format!("{base}/reviews/filter?rating=4&rating=5")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![2]);

    let (status, body) = get_json(format!("{base}/reviews/filter?rating=x&rating=5")).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_body_checked_before_lookup() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    // no body: rejected as a bad request even though id 99 does not exist
    let resp = client.put(format!("{base}/reviews/99")).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let resp = client
        .put(format!("{base}/reviews/99"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
