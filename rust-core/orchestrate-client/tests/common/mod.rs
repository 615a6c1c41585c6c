// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//! In-process stand-in for the Orchestrate REST API.
//!
//! Serves the `/v0/` routes the client uses from in-memory state so the
//! client can be exercised end to end over real HTTP on loopback.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use orchestrate_client::{ClientConfig, OrchestrateClient};
use serde_json::{json, Value};
use url::form_urlencoded;
use uuid::Uuid;

/// API key the fake service accepts.
pub const API_KEY: &str = "test-key";

/// `Authorization` value for [`API_KEY`] with an empty password.
const EXPECTED_AUTH: &str = "Basic dGVzdC1rZXk6";

/// Collection whose writes succeed without a `Location` header.
pub const NO_LOCATION_COLLECTION: &str = "no-location";

/// Collection whose writes answer with a `Location` that names no ref.
pub const FLAT_LOCATION_COLLECTION: &str = "flat-location";

/// A request as seen by the fake service.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub content_type: Option<String>,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
}

#[derive(Debug, Clone)]
struct Version {
    reference: String,
    /// `None` marks a deletion.
    value: Option<Value>,
}

#[derive(Debug, Clone)]
struct StoredEvent {
    timestamp: i64,
    ordinal: u64,
    value: Value,
}

#[derive(Default)]
struct Store {
    items: BTreeMap<(String, String), Vec<Version>>,
    events: HashMap<(String, String, String), Vec<StoredEvent>>,
    relations: BTreeSet<(String, String, String, String, String)>,
    requests: Vec<Recorded>,
    next_ordinal: u64,
}

impl Store {
    fn current(&self, collection: &str, key: &str) -> Option<&Version> {
        self.items
            .get(&(collection.to_string(), key.to_string()))
            .and_then(|versions| versions.last())
    }

    fn live(&self, collection: &str, key: &str) -> Option<(&str, &Value)> {
        self.current(collection, key)
            .and_then(|v| v.value.as_ref().map(|value| (v.reference.as_str(), value)))
    }
}

type Shared = Arc<Mutex<Store>>;

fn new_ref() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A running fake service.
pub struct FakeService {
    pub addr: SocketAddr,
    store: Shared,
}

impl FakeService {
    /// Bind on an ephemeral loopback port and serve in the background.
    pub async fn spawn() -> Self {
        let store: Shared = Arc::default();
        let app = router(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, store }
    }

    pub fn api_root(&self) -> String {
        format!("http://{}/v0/", self.addr)
    }

    /// Client authenticated with [`API_KEY`].
    pub fn client(&self) -> OrchestrateClient {
        self.client_with_key(API_KEY)
    }

    pub fn client_with_key(&self, key: &str) -> OrchestrateClient {
        let config = ClientConfig::default().with_api_root(self.api_root());
        OrchestrateClient::with_config(key, config).unwrap()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.store.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.store.lock().unwrap().requests.len()
    }
}

fn router(store: Shared) -> Router {
    Router::new()
        .route("/v0/{collection}", get(collection_get).delete(collection_delete))
        .route(
            "/v0/{collection}/{key}",
            get(item_get).put(item_put).delete(item_delete),
        )
        .route("/v0/{collection}/{key}/refs/{reference}", get(item_get_ref))
        .route(
            "/v0/{collection}/{key}/events/{kind}",
            get(events_get).put(events_put),
        )
        .route(
            "/v0/{collection}/{key}/relation/{kind}/{sink_collection}/{sink_key}",
            axum::routing::put(relation_put).delete(relation_delete),
        )
        .route("/v0/{collection}/{key}/relations/{*hops}", get(relations_get))
        .with_state(store)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Record the request and check its credentials.
fn admit(store: &mut Store, method: Method, uri: String, headers: &HeaderMap) -> Result<(), Response> {
    store.requests.push(Recorded {
        method,
        uri,
        content_type: header_str(headers, header::CONTENT_TYPE),
        if_match: header_str(headers, header::IF_MATCH),
        if_none_match: header_str(headers, header::IF_NONE_MATCH),
    });

    if header_str(headers, header::AUTHORIZATION).as_deref() != Some(EXPECTED_AUTH) {
        return Err(service_error(
            StatusCode::UNAUTHORIZED,
            "Valid credentials are required.",
            "security_unauthorized",
        ));
    }
    Ok(())
}

fn service_error(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        json!({ "message": message, "code": code }).to_string(),
    )
        .into_response()
}

fn not_found() -> Response {
    service_error(
        StatusCode::NOT_FOUND,
        "The requested items could not be found.",
        "items_not_found",
    )
}

fn json_response(value: Value) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        value.to_string(),
    )
        .into_response()
}

fn item_location(collection: &str, key: &str, reference: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("/v0/{collection}/{key}/refs/{reference}")).unwrap()
}

fn encode(pairs: &[(&str, String)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        query.append_pair(k, v);
    }
    query.finish()
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

/// Evaluate `If-Match` / `If-None-Match` against the current version.
fn check_preconditions(store: &Store, collection: &str, key: &str, headers: &HeaderMap) -> Result<(), Response> {
    let live = store.live(collection, key);

    if let Some(expected) = header_str(headers, header::IF_MATCH) {
        match live {
            Some((current, _)) if current == unquote(&expected) => {}
            Some(_) => {
                return Err(service_error(
                    StatusCode::PRECONDITION_FAILED,
                    "The item has been stored with a different ref.",
                    "item_version_mismatch",
                ))
            }
            None => return Err(not_found()),
        }
    }

    if let Some(wildcard) = header_str(headers, header::IF_NONE_MATCH) {
        if unquote(&wildcard) == "*" && live.is_some() {
            return Err(service_error(
                StatusCode::PRECONDITION_FAILED,
                "The item is already present.",
                "item_already_present",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Collections: list, search, delete
// ---------------------------------------------------------------------------

async fn collection_get(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(rejection) = admit(&mut store, Method::GET, format!("/v0/{collection}"), &headers) {
        return rejection;
    }

    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);

    if let Some(query) = params.get("query") {
        let offset: usize = params.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
        return search(&store, &collection, query, limit, offset);
    }

    list(&store, &collection, &params, limit)
}

/// Pages over every key in range, deleted ones included, so a page can come
/// back empty while later pages still hold items.
fn list(store: &Store, collection: &str, params: &HashMap<String, String>, limit: usize) -> Response {
    let keys: Vec<&String> = store
        .items
        .keys()
        .filter(|(c, _)| c == collection)
        .map(|(_, k)| k)
        .filter(|k| params.get("afterKey").map_or(true, |a| k.as_str() > a.as_str()))
        .filter(|k| params.get("startKey").map_or(true, |s| k.as_str() >= s.as_str()))
        .filter(|k| params.get("endKey").map_or(true, |e| k.as_str() <= e.as_str()))
        .collect();

    let window = &keys[..limit.min(keys.len())];
    let results: Vec<Value> = window
        .iter()
        .filter_map(|k| {
            store.live(collection, k).map(|(reference, value)| {
                json!({
                    "path": { "collection": collection, "key": k, "ref": reference },
                    "value": value,
                })
            })
        })
        .collect();

    let mut body = json!({ "count": results.len(), "results": results });
    if keys.len() > window.len() {
        if let Some(last) = window.last() {
            let mut pairs = vec![("limit", limit.to_string()), ("afterKey", last.to_string())];
            if let Some(end) = params.get("endKey") {
                pairs.push(("endKey", end.clone()));
            }
            body["next"] = json!(format!("/v0/{collection}?{}", encode(&pairs)));
        }
    }
    json_response(body)
}

fn search(store: &Store, collection: &str, query: &str, limit: usize, offset: usize) -> Response {
    let needle = query.to_lowercase();
    let hits: Vec<Value> = store
        .items
        .keys()
        .filter(|(c, _)| c == collection)
        .filter_map(|(_, k)| {
            let (reference, value) = store.live(collection, k)?;
            let matched = needle == "*" || value.to_string().to_lowercase().contains(&needle);
            matched.then(|| {
                json!({
                    "path": { "collection": collection, "key": k, "ref": reference },
                    "score": 1.0,
                    "value": value,
                })
            })
        })
        .collect();

    let total = hits.len();
    let page: Vec<Value> = hits.into_iter().skip(offset).take(limit).collect();
    let mut body = json!({ "count": page.len(), "total_count": total, "results": page });

    if offset + limit < total {
        let pairs = [
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("offset", (offset + limit).to_string()),
        ];
        body["next"] = json!(format!("/v0/{collection}?{}", encode(&pairs)));
    }
    if offset > 0 {
        let pairs = [
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.saturating_sub(limit).to_string()),
        ];
        body["prev"] = json!(format!("/v0/{collection}?{}", encode(&pairs)));
    }
    json_response(body)
}

async fn collection_delete(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(rejection) = admit(&mut store, Method::DELETE, format!("/v0/{collection}"), &headers) {
        return rejection;
    }
    if params.get("force").map(String::as_str) != Some("true") {
        return service_error(StatusCode::CONFLICT, "Deleting a collection requires force=true.", "api_bad_request");
    }
    store.items.retain(|(c, _), _| c != &collection);
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

async fn item_get(
    State(store): State<Shared>,
    Path((collection, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(rejection) = admit(&mut store, Method::GET, format!("/v0/{collection}/{key}"), &headers) {
        return rejection;
    }

    match store.live(&collection, &key) {
        Some((reference, value)) => {
            let mut response = json_response(value.clone());
            response.headers_mut().insert(
                header::CONTENT_LOCATION,
                item_location(&collection, &key, reference),
            );
            response
        }
        None => not_found(),
    }
}

async fn item_get_ref(
    State(store): State<Shared>,
    Path((collection, key, reference)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    let uri = format!("/v0/{collection}/{key}/refs/{reference}");
    if let Err(rejection) = admit(&mut store, Method::GET, uri, &headers) {
        return rejection;
    }

    let version = store
        .items
        .get(&(collection, key))
        .and_then(|versions| versions.iter().find(|v| v.reference == reference))
        .and_then(|v| v.value.clone());

    match version {
        Some(value) => json_response(value),
        None => not_found(),
    }
}

async fn item_put(
    State(store): State<Shared>,
    Path((collection, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(rejection) = admit(&mut store, Method::PUT, format!("/v0/{collection}/{key}"), &headers) {
        return rejection;
    }
    if header_str(&headers, header::CONTENT_TYPE).as_deref() != Some("application/json") {
        return service_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected JSON.", "api_bad_request");
    }
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return service_error(StatusCode::BAD_REQUEST, "Invalid JSON body.", "api_bad_request"),
    };
    if let Err(rejection) = check_preconditions(&store, &collection, &key, &headers) {
        return rejection;
    }

    let reference = new_ref();
    store
        .items
        .entry((collection.clone(), key.clone()))
        .or_default()
        .push(Version {
            reference: reference.clone(),
            value: Some(value),
        });

    let mut response = StatusCode::CREATED.into_response();
    let location = match collection.as_str() {
        NO_LOCATION_COLLECTION => return response,
        FLAT_LOCATION_COLLECTION => HeaderValue::from_str(&format!("/v0/{collection}/{key}")).unwrap(),
        _ => item_location(&collection, &key, &reference),
    };
    response.headers_mut().insert(header::LOCATION, location);
    response
}

async fn item_delete(
    State(store): State<Shared>,
    Path((collection, key)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    if let Err(rejection) = admit(&mut store, Method::DELETE, format!("/v0/{collection}/{key}"), &headers) {
        return rejection;
    }
    if let Err(rejection) = check_preconditions(&store, &collection, &key, &headers) {
        return rejection;
    }

    let id = (collection, key);
    if params.get("purge").map(String::as_str) == Some("true") {
        store.items.remove(&id);
    } else if store.items.contains_key(&id) {
        let reference = new_ref();
        if let Some(versions) = store.items.get_mut(&id) {
            versions.push(Version { reference, value: None });
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

async fn events_get(
    State(store): State<Shared>,
    Path((collection, key, kind)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    let uri = format!("/v0/{collection}/{key}/events/{kind}");
    if let Err(rejection) = admit(&mut store, Method::GET, uri, &headers) {
        return rejection;
    }

    let start: i64 = params.get("start").and_then(|s| s.parse().ok()).unwrap_or(i64::MIN);
    let end: i64 = params.get("end").and_then(|e| e.parse().ok()).unwrap_or(i64::MAX);
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);

    let mut events: Vec<StoredEvent> = store
        .events
        .get(&(collection, key, kind))
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|e| e.timestamp >= start && e.timestamp < end)
        .collect();
    events.sort_by(|a, b| (b.timestamp, b.ordinal).cmp(&(a.timestamp, a.ordinal)));
    events.truncate(limit);

    let results: Vec<Value> = events
        .iter()
        .map(|e| json!({ "timestamp": e.timestamp, "ordinal": e.ordinal, "value": e.value }))
        .collect();
    json_response(json!({ "count": results.len(), "results": results }))
}

async fn events_put(
    State(store): State<Shared>,
    Path((collection, key, kind)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut store = store.lock().unwrap();
    let uri = format!("/v0/{collection}/{key}/events/{kind}");
    if let Err(rejection) = admit(&mut store, Method::PUT, uri, &headers) {
        return rejection;
    }
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return service_error(StatusCode::BAD_REQUEST, "Invalid JSON body.", "api_bad_request"),
    };

    let timestamp = match params.get("timestamp") {
        Some(ts) => match ts.parse() {
            Ok(ts) => ts,
            Err(_) => return service_error(StatusCode::BAD_REQUEST, "Invalid timestamp.", "api_bad_request"),
        },
        None => chrono::Utc::now().timestamp_millis(),
    };
    store.next_ordinal += 1;
    let ordinal = store.next_ordinal;
    store
        .events
        .entry((collection, key, kind))
        .or_default()
        .push(StoredEvent { timestamp, ordinal, value });

    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

async fn relation_put(
    State(store): State<Shared>,
    Path((collection, key, kind, sink_collection, sink_key)): Path<(String, String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    let uri = format!("/v0/{collection}/{key}/relation/{kind}/{sink_collection}/{sink_key}");
    if let Err(rejection) = admit(&mut store, Method::PUT, uri, &headers) {
        return rejection;
    }
    store
        .relations
        .insert((collection, key, kind, sink_collection, sink_key));
    StatusCode::NO_CONTENT.into_response()
}

async fn relation_delete(
    State(store): State<Shared>,
    Path((collection, key, kind, sink_collection, sink_key)): Path<(String, String, String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    let uri = format!("/v0/{collection}/{key}/relation/{kind}/{sink_collection}/{sink_key}");
    if let Err(rejection) = admit(&mut store, Method::DELETE, uri, &headers) {
        return rejection;
    }
    if params.get("purge").map(String::as_str) != Some("true") {
        return service_error(StatusCode::BAD_REQUEST, "Relations can only be purged.", "api_bad_request");
    }
    store
        .relations
        .remove(&(collection, key, kind, sink_collection, sink_key));
    StatusCode::NO_CONTENT.into_response()
}

async fn relations_get(
    State(store): State<Shared>,
    Path((collection, key, hops)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    let uri = format!("/v0/{collection}/{key}/relations/{hops}");
    if let Err(rejection) = admit(&mut store, Method::GET, uri, &headers) {
        return rejection;
    }

    let mut frontier: BTreeSet<(String, String)> = BTreeSet::from([(collection, key)]);
    for hop in hops.split('/').filter(|h| !h.is_empty()) {
        frontier = store
            .relations
            .iter()
            .filter(|(c, k, kind, _, _)| kind == hop && frontier.contains(&(c.clone(), k.clone())))
            .map(|(_, _, _, sc, sk)| (sc.clone(), sk.clone()))
            .collect();
    }

    let results: Vec<Value> = frontier
        .iter()
        .filter_map(|(c, k)| {
            store.live(c, k).map(|(reference, value)| {
                json!({
                    "path": { "collection": c, "key": k, "ref": reference },
                    "value": value,
                })
            })
        })
        .collect();
    json_response(json!({ "count": results.len(), "results": results }))
}
