//! End-to-end tests for the `/legacy/*` routes against a mocked legacy API.

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{config, mount_token, received_on, TestGateway, API_KEY};

#[tokio::test]
async fn test_autocomplete_without_keyword_never_calls_upstream() {
    let upstream = MockServer::start().await;
    let gateway = TestGateway::start(config(&upstream)).await;

    for body in [json!({}), json!({"keyword": ""})] {
        let res = gateway.post("/legacy/autocomplete/", body).await;
        assert_eq!(res.status(), 400);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({"error": "Keyword is required"}));
    }

    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_autocomplete_uses_app_key() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/autocomplete-affiliates"))
        .and(header("app-key", API_KEY))
        .and(body_partial_json(json!({"keyword": "cancun"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"places": ["Cancun"]})))
        .expect(1)
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/autocomplete/", json!({"keyword": "cancun"})).await;

    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"places": ["Cancun"]}));
    // no token is needed for autocomplete
    assert!(received_on(&upstream, "/api/v1/oauth").await.is_empty());
}

#[tokio::test]
async fn test_quote_fetches_token_once_and_injects_rate_group() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok-1", 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "places": {}})))
        .expect(2)
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;

    let res = gateway.post("/legacy/quote/", json!({"pickup": "CUN"})).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"items": [], "places": {}}));

    let res = gateway.post("/legacy/quote/", json!({"pickup": "CUN", "rate_group": "vip"})).await;
    assert_eq!(res.status(), 200);

    assert_eq!(received_on(&upstream, "/api/v1/oauth").await.len(), 1);

    let quotes = received_on(&upstream, "/api/v1/quote").await;
    let first: Value = serde_json::from_slice(&quotes[0].body).unwrap();
    let second: Value = serde_json::from_slice(&quotes[1].body).unwrap();
    assert_eq!(first["rate_group"], "premium");
    assert_eq!(second["rate_group"], "vip");
}

#[tokio::test]
async fn test_quote_retries_once_after_401() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok-1", 1).await;
    mount_token(&upstream, "tok-2", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "expired"})))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1], "places": {}})))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/quote/", json!({})).await;

    assert_eq!(res.status(), 200);
    assert_eq!(received_on(&upstream, "/api/v1/oauth").await.len(), 2);
    assert_eq!(received_on(&upstream, "/api/v1/quote").await.len(), 2);
}

#[tokio::test]
async fn test_second_401_is_not_retried() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 10).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "denied"})))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/quote/", json!({})).await;

    assert_eq!(res.status(), 400);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Upstream client error"})
    );
    assert_eq!(received_on(&upstream, "/api/v1/quote").await.len(), 2);
    assert_eq!(received_on(&upstream, "/api/v1/oauth").await.len(), 2);
}

#[tokio::test]
async fn test_quote_missing_items_is_bad_gateway() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"places": {}})))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/quote/", json!({})).await;

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("items"));
}

#[tokio::test]
async fn test_upstream_5xx_body_is_discarded() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/quote"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Traceback: db password wrong"))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/quote/", json!({})).await;

    assert_eq!(res.status(), 502);
    let text = res.text().await.unwrap();
    assert!(!text.contains("Traceback"));
}

#[tokio::test]
async fn test_upstream_422_passes_through() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    let details = json!({"errors": {"email": ["invalid"]}});
    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .respond_with(ResponseTemplate::new(422).set_body_json(details.clone()))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/create/", json!({"email": "nope"})).await;

    assert_eq!(res.status(), 422);
    assert_eq!(res.json::<Value>().await.unwrap(), details);
}

#[tokio::test]
async fn test_create_without_payment_method() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .and(body_partial_json(json!({"site_id": 123})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reservation_id": "RES123"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/create/", json!({"first_name": "Ana"})).await;

    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"reservation_id": "RES123"}));
    assert!(received_on(&upstream, "/api/v1/reservation/payment/handler").await.is_empty());
}

#[tokio::test]
async fn test_create_with_stripe_returns_payment_link() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reservation_id": "RES123"})))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/reservation/payment/handler"))
        .and(header("authorization", "Bearer tok"))
        .and(query_param("type", "STRIPE"))
        .and(query_param("id", "RES123"))
        .and(query_param("language", "en"))
        .and(query_param("success_url", "/done"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "http://stripe.com/pay/123"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway
        .post(
            "/legacy/create/",
            json!({"payment_method": "STRIPE", "success_url": "https://shop.example.com/done"}),
        )
        .await;

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"payment_link": "http://stripe.com/pay/123"})
    );
}

#[tokio::test]
async fn test_payment_link_failure_is_bad_gateway() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reservation_id": "RES77"})))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/reservation/payment/handler"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/create/", json!({"payment_method": "paypal"})).await;

    assert_eq!(res.status(), 502);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Failed to generate payment link"})
    );
}

#[tokio::test]
async fn test_create_without_reservation_id() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/create/", json!({})).await;

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("reservation ID"));
}

#[tokio::test]
async fn test_my_booking_without_trailing_slash() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/reservation/get"))
        .and(body_partial_json(json!({"code": "ABC", "site_id": 999})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reservation": {"code": "ABC"}})))
        .expect(1)
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway
        .post("/legacy/my-booking", json!({"code": "ABC", "site_id": 999}))
        .await;

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"reservation": {"code": "ABC"}})
    );
}

#[tokio::test]
async fn test_my_booking_not_found_passes_through() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/reservation/get"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/my-booking/", json!({"code": "NOPE"})).await;

    assert_eq!(res.status(), 404);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"message": "not found"}));
}

#[tokio::test]
async fn test_token_failure_is_generic_auth_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "bad secret for svc"})))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/quote/", json!({})).await;

    assert_eq!(res.status(), 502);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Upstream authentication failed"})
    );
    assert!(received_on(&upstream, "/api/v1/quote").await.is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let upstream = MockServer::start().await;
    let mut config = config(&upstream);
    // nothing listens on the discard port
    config.legacy.base_url = "http://127.0.0.1:9".into();

    let gateway = TestGateway::start(config).await;
    let res = gateway.post("/legacy/autocomplete/", json!({"keyword": "can"})).await;

    assert_eq!(res.status(), 502);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Upstream service unreachable"})
    );
}

#[tokio::test]
async fn test_invalid_body_rejected_locally() {
    let upstream = MockServer::start().await;
    let gateway = TestGateway::start(config(&upstream)).await;

    let res = gateway
        .client
        .post(gateway.url("/legacy/quote/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let upstream = MockServer::start().await;
    let gateway = TestGateway::start(config(&upstream)).await;

    let res = gateway
        .client
        .post(gateway.url("/legacy/autocomplete/"))
        .header("x-request-id", "req-42")
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-42");

    let res = gateway.post("/legacy/autocomplete/", json!({})).await;
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_out_of_range_token_lifetime_is_auth_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/oauth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t", "expires_in": i64::MAX})))
        .mount(&upstream)
        .await;

    let gateway = TestGateway::start(config(&upstream)).await;
    let res = gateway.post("/legacy/quote/", json!({})).await;

    assert_eq!(res.status(), 502);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Upstream authentication failed"})
    );
    assert!(received_on(&upstream, "/api/v1/quote").await.is_empty());
}

#[tokio::test]
async fn test_inbound_deadline_is_json_bad_gateway() {
    let upstream = MockServer::start().await;
    mount_token(&upstream, "slow", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/create"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"reservation_id": "RES77"}))
                .set_delay(std::time::Duration::from_millis(1500)),
        )
        .mount(&upstream)
        .await;

    let mut config = config(&upstream);
    config.timeouts.request_secs = 1;
    let gateway = TestGateway::start(config).await;
    let res = gateway.post("/legacy/create/", json!({"payment_method": "STRIPE"})).await;

    assert_eq!(res.status(), 502);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Upstream service unreachable"})
    );
}
