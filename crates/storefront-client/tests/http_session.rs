//! End-to-end checks of the session, catalog and checkout flows over real
//! HTTP against a mock backend.

use std::sync::Arc;

use serde_json::json;
use storefront_client::{
    ApiClient, CartStore, Catalog, Checkout, FileStore, HttpTransport, KeyValueStore, MemoryStore,
    ProductFilter, SessionStatus, SessionStore, TokenSlot,
};
use storefront_core::{CartItem, Money, ShippingDetails};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn api_for(server: &MockServer, store: Arc<dyn KeyValueStore>) -> ApiClient {
    let transport = HttpTransport::new(&format!("{}/api", server.uri())).unwrap();
    ApiClient::new(Arc::new(transport), TokenSlot::session(store))
}

#[tokio::test]
async fn test_login_persists_token_and_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "u1", "password": "p1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok123",
            "user": {"id": 1, "name": "U"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let session = SessionStore::new(api_for(&server, store.clone()).await);
    assert_eq!(session.bootstrap().await, SessionStatus::Anonymous);

    let user = session.login("u1", "p1").await.unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(session.user().map(|u| u.id), Some(1));
    assert_eq!(store.get("token").unwrap().as_deref(), Some("tok123"));
}

#[tokio::test]
async fn test_bad_credentials_leave_session_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let session = SessionStore::new(api_for(&server, store.clone()).await);
    session.bootstrap().await;

    let err = session.login("u1", "wrong").await.unwrap_err();

    assert_eq!(err, storefront_client::AuthError::InvalidCredentials);
    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert_eq!(store.get("token").unwrap(), None);
}

#[tokio::test]
async fn test_bootstrap_with_rejected_token_clears_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "Token has expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = Arc::new(FileStore::new(dir.path().join("session.json")));
    file.set("token", "stale").unwrap();

    let session = SessionStore::new(api_for(&server, file.clone()).await);
    assert_eq!(session.bootstrap().await, SessionStatus::Anonymous);

    // a fresh store over the same file sees the deletion
    let reopened = FileStore::new(dir.path().join("session.json"));
    assert_eq!(reopened.get("token").unwrap(), None);
}

#[tokio::test]
async fn test_bootstrap_restores_valid_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4, "email": "ann@example.com", "name": "Ann"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set("token", "good").unwrap();
    let session = Arc::new(SessionStore::new(api_for(&server, store).await));

    let waiter = {
        let session = session.clone();
        tokio::spawn(async move { session.ready().await })
    };
    session.bootstrap().await;

    assert_eq!(waiter.await.unwrap(), SessionStatus::Authenticated);
    assert_eq!(session.user().and_then(|u| u.name), Some("Ann".to_string()));
}

#[tokio::test]
async fn test_product_search_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("q", "red lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 3, "name": "Red Lamp", "price": 49.5, "discount": 0, "stock": 2,
            "colors": "red", "description": "Desk lamp",
            "category": {"id": 1, "name": "Lighting"}, "brand": {"id": 2, "name": "Lumo"},
            "images": ["/static/images/lamp.jpg", null, null]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = Catalog::new(api_for(&server, Arc::new(MemoryStore::new())).await);
    let list = catalog.products(&ProductFilter::search("red lamp"));
    let state = list.settled().await;

    assert!(state.error.is_none());
    let products = state.data.unwrap();
    assert_eq!(products[0].price, Money::from_cents(4950));
    assert_eq!(products[0].primary_image(), "/static/images/lamp.jpg");
}

#[tokio::test]
async fn test_order_round_trip_with_session_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "items": [{"product_id": 3, "quantity": 1}],
            "shipping": {"name": "Ann", "address": "1 Main St", "phone": "555"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "invoice": "f00d", "status": "Pending", "id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set("token", "tok").unwrap();
    let api = api_for(&server, store).await;
    let session = Arc::new(SessionStore::new(api.clone()));
    session.bootstrap().await;

    let cart = Arc::new(CartStore::new());
    cart.add_to_cart(CartItem {
        id: 3,
        name: "Red Lamp".into(),
        price: Money::from_cents(4950),
        image: String::new(),
        quantity: 1,
    });

    let checkout = Checkout::new(api, session, cart.clone());
    let receipt = checkout
        .place_order(&ShippingDetails {
            name: "Ann".into(),
            address: "1 Main St".into(),
            phone: "555".into(),
        })
        .await
        .unwrap();

    assert_eq!(receipt.invoice, "f00d");
    assert!(cart.is_empty());
}
