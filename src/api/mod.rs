//! HTTP API module - health endpoints and the WebSocket chat

mod websocket;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::command::CommandDispatcher;
use crate::db::Database;
use crate::duel::DuelService;
use crate::event::{EventService, LaunchedEventService};
use crate::locale::Language;
use crate::personage::PersonageService;
pub use websocket::{ChatSession, ConnectionManager, ServerMessage};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub connections: Arc<ConnectionManager>,
    pub personages: Arc<PersonageService>,
    pub duels: Arc<DuelService>,
    pub events: Arc<EventService>,
    pub launched_events: Arc<LaunchedEventService>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub default_language: Language,
}

impl AppState {
    /// Wire up the services around a database handle
    pub fn build(db: Arc<Database>, default_language: Language) -> AppState {
        let pool = db.pool().clone();
        let connections = Arc::new(ConnectionManager::new());
        let events = Arc::new(EventService::new(pool.clone()));
        let launched_events = Arc::new(LaunchedEventService::new(pool.clone()));
        let personages = Arc::new(PersonageService::new(
            pool.clone(),
            events.clone(),
            launched_events.clone(),
        ));
        let duels = Arc::new(DuelService::new(pool, personages.clone()));
        let dispatcher = Arc::new(CommandDispatcher::new(personages.clone(), duels.clone()));

        AppState {
            db,
            connections,
            personages,
            duels,
            events,
            launched_events,
            dispatcher,
            default_language,
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "tavernd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "ok",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "error",
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}
