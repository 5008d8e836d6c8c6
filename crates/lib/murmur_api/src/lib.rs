//! # murmur_api
//!
//! HTTP API library for Murmur.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use murmur_core::models::Entity;
use murmur_core::{Repository, SharedStore};

use crate::config::ApiConfig;
use crate::handlers::{conversation, health, message, thought};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document store, opened once at startup.
    pub store: SharedStore,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(store: SharedStore, config: ApiConfig) -> Self {
        Self { store, config }
    }

    /// Repository for entity `E` over the shared store.
    pub fn repository<E: Entity>(&self) -> Repository<E> {
        Repository::new(self.store.clone())
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(
            routes::POST_CONVERSATION,
            post(conversation::create_conversation_handler),
        )
        .route(
            routes::GET_CONVERSATIONS_ID,
            get(conversation::get_user_conversations_handler),
        )
        .route(routes::POST_MESSAGE, post(message::create_message_handler))
        .route(
            routes::GET_MESSAGES_CONVERSATION_ID,
            get(message::get_messages_handler),
        )
        .route(
            routes::THOUGHT,
            post(thought::create_thought_handler).get(thought::list_thoughts_handler),
        )
        .route(
            routes::THOUGHT_ID,
            get(thought::get_thought_handler)
                .put(thought::update_thought_handler)
                .delete(thought::delete_thought_handler),
        )
        .route(
            routes::GET_THOUGHT_USER_ID,
            get(thought::get_thought_by_user_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
