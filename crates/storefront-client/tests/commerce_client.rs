//! Integration tests for `CommerceClient` using wiremock HTTP mocks.

use std::net::TcpListener;
use std::time::Duration;

use rust_decimal::Decimal;
use storefront_client::{CommerceApi, CommerceClient, CommerceError, CreateBasketOptions};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CommerceClient {
    CommerceClient::new(&format!("{base_url}/api"), 1, "storefront-test/0.1")
        .expect("client construction should not fail")
}

fn basket_json(ident: &str) -> serde_json::Value {
    serde_json::json!({
        "ident": ident,
        "complete": false,
        "base_price": 10.0,
        "sales_tax": 0.0,
        "total_price": 10.0,
        "currency": "USD",
        "packages": [
            {
                "id": 7,
                "name": "VIP",
                "description": "",
                "in_basket": { "quantity": 1, "price": 10.0, "gift_username_id": null }
            }
        ],
        "links": { "checkout": format!("https://pay.example.com/{ident}") }
    })
}

#[tokio::test]
async fn list_packages_unwraps_data_envelope() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "data": [
            {
                "id": 7,
                "name": "VIP",
                "description": "<p>Rank</p>",
                "type": "single",
                "base_price": 10.0,
                "sales_price": 7.5,
                "currency": "USD",
                "category": { "id": 1, "name": "Rangos" }
            },
            {
                "id": 8,
                "name": "Starter Kit",
                "base_price": 5,
                "sales_price": null,
                "currency": "USD",
                "category": { "id": 2, "name": "Kits" }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/packages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let packages = client.list_packages().await.expect("should parse packages");

    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0].display_price(), Decimal::new(75, 1));
    assert_eq!(packages[0].discount_badge().as_deref(), Some("-25%"));
    assert_eq!(packages[1].category_id(), Some(2));
    assert!(!packages[1].has_discount());
}

#[tokio::test]
async fn list_categories_treats_null_data_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": null })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let categories = client.list_categories().await.expect("null data is valid");
    assert!(categories.is_empty());
}

#[tokio::test]
async fn create_basket_returns_wrapped_basket() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets"))
        .and(body_json(serde_json::json!({
            "complete_url": "https://shop.example.com/done"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "data": basket_json("abc") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let options = CreateBasketOptions {
        complete_url: Some("https://shop.example.com/done".to_string()),
        cancel_url: None,
    };
    let basket = client.create_basket(&options).await.expect("should create basket");

    assert_eq!(basket.ident, "abc");
    assert_eq!(
        basket.links.checkout.as_deref(),
        Some("https://pay.example.com/abc")
    );
}

#[tokio::test]
async fn add_package_posts_id_and_quantity_and_accepts_bare_basket() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/packages"))
        .and(body_json(serde_json::json!({ "package_id": 7, "quantity": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json("abc")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let basket = client.add_package("abc", 7, 1).await.expect("should add package");

    assert!(basket.contains(7));
    assert_eq!(basket.item_count(), 1);
}

#[tokio::test]
async fn add_package_accepts_wrapped_basket() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/packages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": basket_json("abc") })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let basket = client.add_package("abc", 7, 1).await.expect("should add package");
    assert_eq!(basket.ident, "abc");
}

#[tokio::test]
async fn trait_create_basket_sends_empty_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets"))
        .and(body_json(serde_json::json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json("xyz")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let basket = CommerceApi::create_basket(&client)
        .await
        .expect("should create basket");
    assert_eq!(basket.ident, "xyz");
}

#[tokio::test]
async fn not_found_maps_to_client_error_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/baskets/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({ "error": "Basket not found" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_basket("gone").await.unwrap_err();

    assert!(
        matches!(err, CommerceError::Client { status: 404, ref message } if message == "Basket not found"),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.user_message(), "Basket not found");
}

#[tokio::test]
async fn client_error_without_body_uses_status_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/coupons"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.apply_coupon("abc", "NOPE").await.unwrap_err();

    assert!(
        matches!(err, CommerceError::Client { status: 422, ref message } if message == "Unprocessable Entity"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn server_error_maps_to_server_variant() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/packages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.list_packages().await.unwrap_err();

    assert!(matches!(err, CommerceError::Server { status: 500, .. }));
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.list_categories().await.unwrap_err();
    assert!(err.is_network(), "expected network error, got {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // Bind and release a port so nothing is listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = test_client(&format!("http://{addr}"));
    let err = client.list_packages().await.unwrap_err();
    assert!(err.is_network(), "expected network error, got {err:?}");
    assert!(err.status().is_none());
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/packages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [{ "id": "x" }] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.list_packages().await.unwrap_err();
    assert!(matches!(err, CommerceError::Deserialize { ref context, .. } if context == "packages"));
}

#[tokio::test]
async fn get_webstore_reads_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/webstore"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "id": 1,
                "name": "Servidor Demo",
                "currency": "USD",
                "lang": "es"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let webstore = client.get_webstore().await.expect("should parse webstore");
    assert_eq!(webstore.name, "Servidor Demo");
    assert_eq!(webstore.lang.as_deref(), Some("es"));
}

#[tokio::test]
async fn list_categories_accepts_bare_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 1, "name": "Rangos", "description": "", "order": 0 },
            { "id": 2, "name": "Kits", "description": "", "order": 1 }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let categories = client
        .list_categories()
        .await
        .expect("bare list should be accepted");
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Rangos", "Kits"]);
}

#[tokio::test]
async fn list_categories_with_packages_sends_include_flag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(query_param("includePackages", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{
                "id": 1,
                "name": "Rangos",
                "order": 0,
                "packages": [{ "id": 7, "name": "VIP", "base_price": 10.0, "currency": "USD" }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let categories = client
        .list_categories_with_packages()
        .await
        .expect("should list categories");
    assert_eq!(categories[0].packages.len(), 1);
    assert_eq!(categories[0].packages[0].id, 7);
}

#[tokio::test]
async fn get_category_and_package_read_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/categories/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "id": 2, "name": "Kits", "order": 1 }
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/packages/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "id": 7,
                "name": "VIP",
                "base_price": 10.0,
                "sales_price": 8.0,
                "currency": "USD"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let category = client.get_category(2).await.expect("should read category");
    assert_eq!(category.name, "Kits");
    let with_packages = client
        .get_category_with_packages(2)
        .await
        .expect("should read category with packages");
    assert!(with_packages.packages.is_empty());

    let package = client.get_package(7).await.expect("should read package");
    assert_eq!(package.savings(), Some(Decimal::new(2, 0)));
}

#[tokio::test]
async fn remove_package_posts_to_remove_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/packages/remove"))
        .and(body_json(serde_json::json!({ "package_id": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ident": "abc",
            "packages": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let basket = client.remove_package("abc", 7).await.expect("should remove");
    assert!(!basket.contains(7));
}

#[tokio::test]
async fn update_package_quantity_puts_quantity_and_reads_success() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/baskets/abc/packages/7"))
        .and(body_json(serde_json::json!({ "quantity": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let updated = client
        .update_package_quantity("abc", 7, 3)
        .await
        .expect("should update quantity");
    assert!(updated);
}

#[tokio::test]
async fn basket_auth_links_pass_return_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/baskets/abc/auth"))
        .and(query_param("returnUrl", "https://shop.example.com/tienda"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "name": "Minecraft", "url": "https://auth.example.com/abc" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let links = client
        .basket_auth_links("abc", Some("https://shop.example.com/tienda"))
        .await
        .expect("should list auth links");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].name, "Minecraft");
    assert_eq!(links[0].url, "https://auth.example.com/abc");
}

#[tokio::test]
async fn coupon_endpoints_use_coupon_paths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/coupons"))
        .and(body_json(serde_json::json!({ "coupon_code": "SAVE10" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json("abc")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/coupons/remove"))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json("abc")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.apply_coupon("abc", "SAVE10").await.expect("should apply coupon");
    client.remove_coupon("abc").await.expect("should remove coupon");
}

#[tokio::test]
async fn gift_card_endpoints_use_giftcards_paths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/giftcards"))
        .and(body_json(serde_json::json!({ "card_number": "1234-5678" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json("abc")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/giftcards/remove"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": basket_json("abc") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .apply_gift_card("abc", "1234-5678")
        .await
        .expect("should apply gift card");
    client
        .remove_gift_card("abc")
        .await
        .expect("should remove gift card");
}

#[tokio::test]
async fn creator_code_endpoints_use_hyphenated_paths() {
    let server = MockServer::start().await;

    let mut with_code = basket_json("abc");
    with_code["creator_code"] = serde_json::json!("steve");

    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/creator-codes"))
        .and(body_json(serde_json::json!({ "creator_code": "steve" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&with_code))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/baskets/abc/creator-codes/remove"))
        .respond_with(ResponseTemplate::new(200).set_body_json(basket_json("abc")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let basket = client
        .apply_creator_code("abc", "steve")
        .await
        .expect("should apply creator code");
    assert_eq!(basket.creator_code.as_deref(), Some("steve"));

    let basket = client
        .remove_creator_code("abc")
        .await
        .expect("should remove creator code");
    assert!(basket.creator_code.is_none());
}

#[tokio::test]
async fn pages_and_sidebar_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "id": 1, "title": "Reglas", "slug": "reglas", "content": "<p>Sin trampas</p>" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sidebar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": null })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let pages = client.list_pages().await.expect("should list pages");
    assert_eq!(pages[0].slug, "reglas");
    let sidebar = client.list_sidebar().await.expect("should list sidebar");
    assert!(sidebar.is_empty());
}
