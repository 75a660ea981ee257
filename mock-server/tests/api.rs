use axum::http::{self, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use mock_server::{app, Location, MockConfig, SHORT_MENU_ITEMS};
use serde_json::Value;
use sha1::Sha1;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign `path?query` the way a client would, appending the signature last.
fn signed_uri(secret: &str, path: &str, query: &str) -> String {
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("GET\n{path}?{query}").as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());
    let encoded: String = url_encode(&signature);
    format!("{path}?{query}&signature={encoded}")
}

fn url_encode(s: &str) -> String {
    s.replace('+', "%2B").replace('/', "%2F").replace('=', "%3D")
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn demo_query(extra: &str) -> String {
    if extra.is_empty() {
        "client=demo-client&timestamp=1700000000".to_string()
    } else {
        format!("client=demo-client&{extra}&timestamp=1700000000")
    }
}

// --- signatures ---

#[tokio::test]
async fn summary_with_reference_signature_returns_200() {
    let uri = "/locations/haru-sushi/?client=demo-client&timestamp=1700000000&signature=TgbYrvSM51TaB0i44LV3zvJE3IA%3D";
    let resp = app(MockConfig::demo()).oneshot(get(uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let summary: Value = body_json(resp).await;
    assert_eq!(summary["name"], "Haru Sushi");
    assert_eq!(summary["photo_count"], 3);
}

#[tokio::test]
async fn wrong_secret_returns_401() {
    let uri = signed_uri("not-the-secret", "/locations/haru-sushi/", &demo_query(""));
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "invalid signature");
}

#[tokio::test]
async fn tampered_query_returns_401() {
    let uri = signed_uri("abc123", "/locations/haru-sushi/menus/", &demo_query(""))
        .replace("timestamp=1700000000", "timestamp=1700000001");
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_signature_returns_401() {
    let resp = app(MockConfig::demo())
        .oneshot(get("/locations/haru-sushi/?client=demo-client&timestamp=1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "missing signature");
}

#[tokio::test]
async fn unknown_client_returns_401() {
    let query = "client=someone-else&timestamp=1700000000";
    let uri = signed_uri("abc123", "/locations/haru-sushi/", query);
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "unknown client");
}

// --- locations ---

#[tokio::test]
async fn unknown_location_returns_404() {
    let uri = signed_uri("abc123", "/locations/nowhere/", &demo_query(""));
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_summary_returns_full_location() {
    let uri = signed_uri("abc123", "/locations/haru-sushi/all/", &demo_query(""));
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let location: Location = body_json(resp).await;
    assert_eq!(location.menus.len(), 1);
    assert_eq!(location.photos.len(), 3);
}

#[tokio::test]
async fn short_menu_truncates_sections() {
    let uri = signed_uri("abc123", "/locations/haru-sushi/menus/", &demo_query("format=short"));
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let items = body["menus"][0]["sections"][0]["items"].as_array().unwrap();
    assert_eq!(items.len(), SHORT_MENU_ITEMS);
}

#[tokio::test]
async fn full_menu_keeps_every_item() {
    let uri = signed_uri("abc123", "/locations/haru-sushi/menus/", &demo_query(""));
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["menus"][0]["sections"][0]["items"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn photos_are_filtered() {
    let uri = signed_uri(
        "abc123",
        "/locations/haru-sushi/photos/",
        &demo_query("height=500&width=700&type=interior"),
    );
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let photos = body["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0]["type"], "interior");
}

#[tokio::test]
async fn non_numeric_dimension_returns_400() {
    let uri = signed_uri("abc123", "/locations/haru-sushi/photos/", &demo_query("height=tall"));
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updated_since_is_not_served() {
    let uri = signed_uri("abc123", "/locations/updated_since/2024-01-01/", &demo_query(""));
    let resp = app(MockConfig::demo()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- hierarchy ---

#[tokio::test]
async fn hierarchy_requires_cookie() {
    let resp = app(MockConfig::demo())
        .oneshot(get("/hierarchy/list/business/demo-business/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn hierarchy_with_cookie_returns_root_tier() {
    let config = MockConfig::demo();
    let request = Request::builder()
        .uri("/hierarchy/list/business/demo-business/")
        .header(http::header::COOKIE, config.cookie.as_str())
        .body(String::new())
        .unwrap();
    let resp = app(config).oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["root_tier"]["node_type"], "business");
    assert_eq!(body["root_tier"]["nodes"][0]["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn hierarchy_for_unknown_business_returns_404() {
    let config = MockConfig::demo();
    let request = Request::builder()
        .uri("/hierarchy/list/business/someone-else/")
        .header(http::header::COOKIE, config.cookie.as_str())
        .body(String::new())
        .unwrap();
    let resp = app(config).oneshot(request).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
