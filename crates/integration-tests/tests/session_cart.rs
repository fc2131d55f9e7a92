//! Session cart endpoints against an in-memory session store.

use axum::http::{StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use solebox_integration_tests::{body_json, get, json_request, session_cookie, test_app};

fn with_cookie(
    mut request: axum::http::Request<axum::body::Body>,
    cookie: &str,
) -> axum::http::Request<axum::body::Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

#[tokio::test]
async fn test_empty_cart() {
    let response = test_app().oneshot(get("/cart", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["item_count"], 0);
    assert_eq!(body["total_cents"], 0);
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_add_same_line_twice_then_count() {
    let app = test_app();
    let item = json!({
        "sku": "AS90-BKW-42",
        "name": "Air Stride 90",
        "size": "42",
        "unit_price_cents": 13999,
        "quantity": 1
    });

    let first = app
        .clone()
        .oneshot(json_request("POST", "/cart/add", &item))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let cookie = session_cookie(&first).unwrap();

    let second = app
        .clone()
        .oneshot(with_cookie(json_request("POST", "/cart/add", &item), &cookie))
        .await
        .unwrap();
    let body = body_json(second).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["total_cents"], 27998);
    assert_eq!(body["total"], "$279.98");

    let count = app
        .oneshot(with_cookie(get("/cart/count", None), &cookie))
        .await
        .unwrap();
    assert_eq!(body_json(count).await["count"], 2);
}

#[tokio::test]
async fn test_update_and_remove_lines() {
    let app = test_app();

    let added = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/cart/add",
            &json!({ "sku": "A", "name": "Runner", "size": "40", "unit_price_cents": 5000 }),
        ))
        .await
        .unwrap();
    let cookie = session_cookie(&added).unwrap();

    app.clone()
        .oneshot(with_cookie(
            json_request(
                "POST",
                "/cart/add",
                &json!({ "sku": "B", "name": "Court", "size": "41", "unit_price_cents": 7000, "quantity": 3 }),
            ),
            &cookie,
        ))
        .await
        .unwrap();

    // Zero is raised to one
    let updated = app
        .clone()
        .oneshot(with_cookie(
            json_request("POST", "/cart/update", &json!({ "key": "A:40", "quantity": 0 })),
            &cookie,
        ))
        .await
        .unwrap();
    let body = body_json(updated).await;
    assert_eq!(body["total_cents"], 26000);
    assert_eq!(body["item_count"], 4);

    let removed = app
        .oneshot(with_cookie(
            json_request("POST", "/cart/remove", &json!({ "key": "A:40" })),
            &cookie,
        ))
        .await
        .unwrap();
    let body = body_json(removed).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["sku"], "B");
    assert_eq!(body["total_cents"], 21000);
}

#[tokio::test]
async fn test_add_with_missing_fields_is_bad_request() {
    let response = test_app()
        .oneshot(json_request("POST", "/cart/add", &json!({ "sku": "A" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
