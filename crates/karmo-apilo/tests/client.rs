//! Integration tests for `ApiloClient` using wiremock HTTP mocks.

use chrono::{Duration, Utc};
use karmo_apilo::{ApiloClient, ApiloError, TokenSet};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, page_size: u32) -> ApiloClient {
    ApiloClient::new(base_url, "1", "secret", 30, page_size)
        .expect("client construction should not fail")
}

fn valid_token() -> TokenSet {
    TokenSet::new(
        "valid-access".to_string(),
        "valid-refresh".to_string(),
        Some(Utc::now() + Duration::hours(1)),
    )
}

fn expired_token() -> TokenSet {
    TokenSet::new(
        "stale-access".to_string(),
        "stale-refresh".to_string(),
        Some(Utc::now() - Duration::hours(1)),
    )
}

fn token_response(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "accessToken": access,
        "refreshToken": refresh,
        "accessTokenExpireAt": (Utc::now() + Duration::hours(1)).to_rfc3339(),
    })
}

fn product_page() -> serde_json::Value {
    serde_json::json!({
        "products": [
            {
                "id": 42,
                "sku": "A1",
                "name": "Brit Care Adult",
                "status": 1,
                "quantity": 5,
                "priceWithoutTax": 12.5,
                "categories": [{"name": "Psy / Sucha karma"}]
            }
        ],
        "totalCount": 1
    })
}

#[tokio::test]
async fn exchange_auth_code_uses_basic_auth() {
    let server = MockServer::start().await;
    // base64("1:secret")
    Mock::given(method("POST"))
        .and(path("/rest/auth/token/"))
        .and(header("authorization", "Basic MTpzZWNyZXQ="))
        .and(body_partial_json(serde_json::json!({
            "grantType": "authorization_code",
            "code": "one-time-code",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("acc", "ref")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 100);
    let token = client
        .exchange_auth_code("one-time-code")
        .await
        .expect("exchange should succeed");
    assert_eq!(token.access_token, "acc");
    assert_eq!(token.refresh_token, "ref");
    assert!(!token.is_expired(Utc::now()));
}

#[tokio::test]
async fn exchange_failure_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/auth/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad code"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 100);
    let err = client
        .exchange_auth_code("bad-code")
        .await
        .expect_err("exchange should fail");
    assert!(matches!(err, ApiloError::Auth { status: 400, .. }));
}

#[tokio::test]
async fn fetch_without_token_is_missing_token() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri(), 100);
    let err = client
        .fetch_products_page(100, 0)
        .await
        .expect_err("no token installed");
    assert!(matches!(err, ApiloError::MissingToken));
}

#[tokio::test]
async fn fetch_products_page_returns_parsed_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .and(header("authorization", "Bearer valid-access"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 100);
    client.set_token(valid_token()).await;
    let page = client
        .fetch_products_page(100, 0)
        .await
        .expect("page should parse");
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.total_count, Some(1));
    assert_eq!(page.products[0].sku.as_deref(), Some("A1"));
}

#[tokio::test]
async fn expired_token_is_refreshed_before_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/auth/token/"))
        .and(body_partial_json(serde_json::json!({
            "grantType": "refresh_token",
            "token": "stale-refresh",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response("fresh-access", "fresh-refresh")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 100);
    client.set_token(expired_token()).await;
    let page = client
        .fetch_products_page(100, 0)
        .await
        .expect("refresh then fetch should succeed");
    assert_eq!(page.products.len(), 1);
}

#[tokio::test]
async fn unauthorized_triggers_one_refresh_and_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .and(header("authorization", "Bearer valid-access"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token revoked"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/auth/token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response("fresh-access", "fresh-refresh")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 100);
    client.set_token(valid_token()).await;
    let page = client
        .fetch_products_page(100, 0)
        .await
        .expect("retry after refresh should succeed");
    assert_eq!(page.products.len(), 1);
}

#[tokio::test]
async fn failed_refresh_surfaces_the_original_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token revoked"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/auth/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("refresh token expired"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 100);
    client.set_token(valid_token()).await;
    let err = client
        .fetch_products_page(100, 0)
        .await
        .expect_err("should surface the original 401");
    match err {
        ApiloError::Auth { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "token revoked");
        }
        other => panic!("expected Auth, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_all_products_walks_pagination() {
    let server = MockServer::start().await;
    let page_one = serde_json::json!({
        "products": [
            {"id": 1, "sku": "A1", "name": "Karma A"},
            {"id": 2, "sku": "B2", "name": "Karma B"}
        ],
        "totalCount": 3
    });
    let page_two = serde_json::json!({
        "products": [
            {"id": 3, "sku": "C3", "name": "Karma C"}
        ],
        "totalCount": 3
    });
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_one))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_two))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    client.set_token(valid_token()).await;
    let products = client
        .fetch_all_products()
        .await
        .expect("pagination should complete");
    let skus: Vec<_> = products.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, vec!["A1", "B2", "C3"]);
}

#[tokio::test]
async fn fetch_all_products_skips_unusable_records() {
    let server = MockServer::start().await;
    let page = serde_json::json!({
        "products": [
            {"id": 1, "sku": "A1", "name": "Karma A"},
            {"name": "No identity at all"}
        ],
        "totalCount": 2
    });
    Mock::given(method("GET"))
        .and(path("/rest/api/warehouse/product/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 100);
    client.set_token(valid_token()).await;
    let products = client.fetch_all_products().await.expect("should succeed");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku, "A1");
}
