use app::middleware::AuditMiddleware;
use app::routes;
use lattice::testing::{TestClient, TestResponse};
use lattice::{CapabilityRegistrar, Container, StaticTokenValidator, TokenValidator};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

const TOKEN: &str = "test-token";

fn client() -> TestClient {
    let registrar = CapabilityRegistrar::linked();
    let mut container = Container::new();
    registrar.register("app::business", &mut container).unwrap();
    registrar.register("app::promotions", &mut container).unwrap();
    container.bind::<dyn TokenValidator>(Arc::new(StaticTokenValidator::new([TOKEN])));

    TestClient::new(routes::register(), container).middleware(AuditMiddleware)
}

fn body(response: &TestResponse) -> Value {
    response.json()
}

#[tokio::test]
async fn lists_products() {
    let response = client().get("/api/products").send().await;

    assert_eq!(response.status(), 200);
    let body = body(&response);
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 4);
    assert_eq!(products[0]["sku"], "KB-101");
    assert_eq!(products[0]["display_price"], "$89.00");
    assert_eq!(products[0]["url"], "/api/products/1");
}

#[tokio::test]
async fn shows_one_product() {
    let client = client();

    let response = client.get("/api/products/2").send().await;
    assert_eq!(response.status(), 200);
    assert_eq!(body(&response)["product"]["name"], "Wireless mouse");

    assert_eq!(client.get("/api/products/99").send().await.status(), 404);
    assert_eq!(client.get("/api/products/abc").send().await.status(), 400);
}

#[tokio::test]
async fn quote_uses_the_overriding_pricing_and_one_audit_trail_per_request() {
    let client = client();

    let response = client
        .post("/api/quotes")
        .json(&json!({ "product_id": 2, "quantity": 10 }))
        .send()
        .await;

    assert_eq!(response.status(), 200);
    let body = body(&response);
    assert_eq!(body["pricing"], "promotional");
    assert_eq!(body["total"], 22_050);
    assert_eq!(body["display_total"], "$220.50");
    assert_eq!(
        body["audit"],
        json!(["POST /api/quotes", "catalog.find 2", "quote MS-220 x10"])
    );

    // A new request starts with a fresh trail
    let response = client
        .post("/api/quotes")
        .json(&json!({ "product_id": 4, "quantity": 1 }))
        .send()
        .await;
    assert_eq!(
        self::body(&response)["audit"],
        json!(["POST /api/quotes", "catalog.find 4", "quote CB-USB x1"])
    );
}

#[tokio::test]
async fn quote_rejects_bad_input() {
    let client = client();

    let zero = client
        .post("/api/quotes")
        .json(&json!({ "product_id": 2, "quantity": 0 }))
        .send()
        .await;
    assert_eq!(zero.status(), 400);

    let malformed = client
        .post("/api/quotes")
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await;
    assert_eq!(malformed.status(), 400);

    let unknown = client
        .post("/api/quotes")
        .json(&json!({ "product_id": 42, "quantity": 1 }))
        .send()
        .await;
    assert_eq!(unknown.status(), 404);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let response = client()
        .max_body_size(8)
        .post("/api/quotes")
        .json(&json!({ "product_id": 2, "quantity": 1 }))
        .send()
        .await;

    assert_eq!(response.status(), 413);
}

#[tokio::test]
async fn account_requires_a_bearer_token() {
    let client = client();

    let anonymous = client.get("/api/me").send().await;
    assert_eq!(anonymous.status(), 401);
    assert!(anonymous.header("www-authenticate").is_some());

    let wrong = client.get("/api/me").bearer("nope").send().await;
    assert_eq!(wrong.status(), 401);

    let response = client.get("/api/me").bearer(TOKEN).send().await;
    assert_eq!(response.status(), 200);
    assert_eq!(body(&response)["subject"], "token-10");
}

#[tokio::test]
async fn unmatched_get_serves_the_app_shell() {
    let client = client();

    let response = client.get("/dashboard/orders").send().await;
    assert_eq!(response.status(), 200);
    assert!(response.text().contains("<div id=\"app\"></div>"));

    let response = client.post("/dashboard/orders").send().await;
    assert_eq!(response.status(), 404);

    // Missing assets stay 404 instead of receiving the shell
    let response = client.get("/assets/missing.js").send().await;
    assert_eq!(response.status(), 404);
    assert!(!response.text().contains("<div id=\"app\"></div>"));
}

#[tokio::test]
async fn health_reports_ok() {
    let response = client().get("/api/health").send().await;

    assert_eq!(response.status(), 200);
    assert_eq!(body(&response)["status"], "ok");
}
