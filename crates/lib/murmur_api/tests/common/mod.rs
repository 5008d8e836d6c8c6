//! Shared helpers: build the router over an in-memory store and drive it.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use async_trait::async_trait;
use murmur_api::{AppState, config::ApiConfig};
use murmur_core::models::UniqueKey;
use murmur_core::store::{
    DeleteOutcome, DocumentStore, MemoryStore, Result as StoreResult, StoreKind, UpdateOutcome,
    ensure_indexes,
};
use murmur_core::{Document, Filter, ObjectId, SharedStore, StoreError};
use serde_json::{Map, Value};
use tower::ServiceExt;

/// Detail carried by every [`FailingStore`] error.
pub const STORE_FAILURE: &str = "store offline";

/// A store whose every operation fails.
pub struct FailingStore;

fn offline<T>() -> StoreResult<T> {
    Err(StoreError::Schema(STORE_FAILURE.into()))
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn ensure_unique(&self, _key: UniqueKey) -> StoreResult<()> {
        offline()
    }

    async fn insert(&self, _collection: &str, _body: Map<String, Value>) -> StoreResult<Document> {
        offline()
    }

    async fn find_by_id(&self, _collection: &str, _id: &ObjectId) -> StoreResult<Option<Document>> {
        offline()
    }

    async fn find(
        &self,
        _collection: &str,
        _filter: &Filter,
        _limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        offline()
    }

    async fn update_one(
        &self,
        _collection: &str,
        _id: &ObjectId,
        _patch: Map<String, Value>,
    ) -> StoreResult<UpdateOutcome> {
        offline()
    }

    async fn delete_one(&self, _collection: &str, _id: &ObjectId) -> StoreResult<DeleteOutcome> {
        offline()
    }

    async fn ping(&self) -> StoreResult<()> {
        offline()
    }
}

pub fn app_with_store(store: SharedStore) -> Router {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        store: StoreKind::Memory,
        ..ApiConfig::default()
    };
    murmur_api::router(AppState::new(store, config))
}

pub async fn app() -> Router {
    let store: SharedStore = Arc::new(MemoryStore::new());
    ensure_indexes(store.as_ref()).await.expect("ensure indexes");
    app_with_store(store)
}

pub fn failing_app() -> Router {
    app_with_store(Arc::new(FailingStore))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    send_request(app, req).await
}

pub async fn send_request(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&body).expect("parse JSON");
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}
