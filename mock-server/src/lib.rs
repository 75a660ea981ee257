//! In-memory stand-in for the SinglePlatform publishing API and dashboard.
//!
//! Every publishing route checks the `client` parameter and recomputes the
//! HMAC-SHA1 signature over `METHOD\npath?query` (the query as received, up
//! to the trailing `signature` parameter). The dashboard hierarchy route is
//! guarded by a session cookie instead.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha1::Sha1;
use tokio::net::TcpListener;

/// Items per menu section returned for `format=short`.
pub const SHORT_MENU_ITEMS: usize = 5;

type Rejection = (StatusCode, String);
type Params = HashMap<String, String>;

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub client_id: String,
    pub secret: String,
    pub cookie: String,
    pub business_id: String,
}

impl MockConfig {
    pub fn demo() -> Self {
        Self {
            client_id: "demo-client".to_string(),
            secret: "abc123".to_string(),
            cookie: "csrftoken=demo; sessionid=demo".to_string(),
            business_id: "demo-business".to_string(),
        }
    }

    /// Demo values, overridden by `MOCK_CLIENT_ID`, `MOCK_CLIENT_SECRET` and `MOCK_COOKIE`.
    pub fn from_env() -> Self {
        let mut config = Self::demo();
        if let Ok(v) = std::env::var("MOCK_CLIENT_ID") {
            config.client_id = v;
        }
        if let Ok(v) = std::env::var("MOCK_CLIENT_SECRET") {
            config.secret = v;
        }
        if let Ok(v) = std::env::var("MOCK_COOKIE") {
            config.cookie = v;
        }
        config
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub city: String,
    pub menus: Vec<Menu>,
    pub photos: Vec<Photo>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Menu {
    pub name: String,
    pub sections: Vec<Section>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(rename = "type")]
    pub image_type: String,
    pub width: u32,
    pub height: u32,
}

struct AppState {
    config: MockConfig,
    locations: HashMap<String, Location>,
}

pub fn app(config: MockConfig) -> Router {
    let locations = fixture_locations()
        .into_iter()
        .map(|l| (l.id.clone(), l))
        .collect();
    let state = Arc::new(AppState { config, locations });
    Router::new()
        .route("/locations/{id}/", get(summary))
        .route("/locations/{id}/all/", get(complete))
        .route("/locations/{id}/menus/", get(menus))
        .route("/locations/{id}/photos/", get(photos))
        .route("/hierarchy/list/business/{business_id}/", get(hierarchy))
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

async fn summary(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    verify(&state.config, &method, &uri, &params)?;
    let location = find(&state, &id)?;
    Ok(Json(json!({
        "id": location.id,
        "name": location.name,
        "city": location.city,
        "menu_count": location.menus.len(),
        "photo_count": location.photos.len(),
    })))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Location>, Rejection> {
    verify(&state.config, &method, &uri, &params)?;
    find(&state, &id).map(|l| Json(l.clone()))
}

async fn menus(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    verify(&state.config, &method, &uri, &params)?;
    let mut menus = find(&state, &id)?.menus.clone();
    if params.get("format").map(String::as_str) == Some("short") {
        for section in menus.iter_mut().flat_map(|m| m.sections.iter_mut()) {
            section.items.truncate(SHORT_MENU_ITEMS);
        }
    }
    Ok(Json(json!({ "location_id": id, "menus": menus })))
}

async fn photos(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    verify(&state.config, &method, &uri, &params)?;
    let max_height = dimension(&params, "height")?;
    let max_width = dimension(&params, "width")?;
    let image_type = params.get("type");

    let photos: Vec<&Photo> = find(&state, &id)?
        .photos
        .iter()
        .filter(|p| max_height.is_none_or(|h| p.height <= h))
        .filter(|p| max_width.is_none_or(|w| p.width <= w))
        .filter(|p| image_type.is_none_or(|t| &p.image_type == t))
        .collect();
    Ok(Json(json!({ "location_id": id, "photos": photos })))
}

async fn hierarchy(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(business_id): Path<String>,
) -> Result<Json<Value>, Rejection> {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if cookie != state.config.cookie {
        tracing::warn!(%business_id, "rejected hierarchy request without session cookie");
        return Err((StatusCode::FORBIDDEN, "not logged in".to_string()));
    }
    if business_id != state.config.business_id {
        return Err((StatusCode::NOT_FOUND, "unknown business".to_string()));
    }
    Ok(Json(json!({ "root_tier": fixture_hierarchy(&business_id) })))
}

fn find<'a>(state: &'a AppState, id: &str) -> Result<&'a Location, Rejection> {
    state
        .locations
        .get(id)
        .ok_or((StatusCode::NOT_FOUND, format!("location {id} not found")))
}

fn dimension(params: &Params, name: &str) -> Result<Option<u32>, Rejection> {
    params
        .get(name)
        .map(|v| v.parse::<u32>())
        .transpose()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("{name} must be an integer")))
}

/// Check the `client` parameter and the signature of a publishing request.
fn verify(config: &MockConfig, method: &Method, uri: &Uri, params: &Params) -> Result<(), Rejection> {
    let unauthorized = |reason: &str| {
        tracing::warn!(path = %uri.path(), reason, "rejected request");
        (StatusCode::UNAUTHORIZED, reason.to_string())
    };

    if params.get("client") != Some(&config.client_id) {
        return Err(unauthorized("unknown client"));
    }
    if params.get("timestamp").is_none() {
        return Err(unauthorized("missing timestamp"));
    }
    let provided = params
        .get("signature")
        .ok_or_else(|| unauthorized("missing signature"))?;
    let (unsigned, _) = uri
        .query()
        .unwrap_or_default()
        .rsplit_once("&signature=")
        .ok_or_else(|| unauthorized("signature must be the last parameter"))?;

    let canonical = format!("{}\n{}?{}", method.as_str(), uri.path(), unsigned);
    if sign(&config.secret, &canonical)? != *provided {
        return Err(unauthorized("invalid signature"));
    }
    Ok(())
}

fn sign(secret: &str, message: &str) -> Result<String, Rejection> {
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn fixture_locations() -> Vec<Location> {
    let sushi_items = ["Salmon Nigiri", "Tuna Roll", "Miso Soup", "Edamame", "Tempura", "Gyoza", "Mochi"];
    vec![
        Location {
            id: "haru-sushi".to_string(),
            name: "Haru Sushi".to_string(),
            city: "New York".to_string(),
            menus: vec![Menu {
                name: "Dinner".to_string(),
                sections: vec![
                    Section {
                        name: "Classics".to_string(),
                        items: sushi_items.iter().map(|s| s.to_string()).collect(),
                    },
                    Section {
                        name: "Drinks".to_string(),
                        items: vec!["Green Tea".to_string(), "Sake".to_string()],
                    },
                ],
            }],
            photos: vec![
                Photo {
                    url: "https://images.example.com/haru/interior.jpg".to_string(),
                    image_type: "interior".to_string(),
                    width: 640,
                    height: 480,
                },
                Photo {
                    url: "https://images.example.com/haru/logo.png".to_string(),
                    image_type: "logo".to_string(),
                    width: 200,
                    height: 200,
                },
                Photo {
                    url: "https://images.example.com/haru/exterior-large.jpg".to_string(),
                    image_type: "exterior".to_string(),
                    width: 1920,
                    height: 1080,
                },
            ],
        },
        Location {
            id: "blue-door-cafe".to_string(),
            name: "Blue Door Cafe".to_string(),
            city: "Boston".to_string(),
            menus: vec![Menu {
                name: "Breakfast".to_string(),
                sections: vec![Section {
                    name: "Eggs".to_string(),
                    items: vec!["Omelette".to_string(), "Benedict".to_string()],
                }],
            }],
            photos: Vec::new(),
        },
    ]
}

fn fixture_hierarchy(business_id: &str) -> Value {
    json!({
        "node_type": "business",
        "id": business_id,
        "nodes": [
            {
                "node_type": "region",
                "name": "East Coast",
                "nodes": [
                    { "node_type": "location", "id": "haru-sushi", "name": "Haru Sushi" },
                    { "node_type": "location", "id": "blue-door-cafe", "name": "Blue Door Cafe" }
                ]
            },
            { "node_type": "region", "name": "West Coast", "nodes": [] }
        ]
    })
}
