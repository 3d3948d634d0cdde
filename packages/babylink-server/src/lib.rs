//! Babylink Chat Server
//!
//! REST surface for direct messages between parents and midwives:
//!
//! 1. **Chat history**: full conversation between the caller and one user.
//!
//! 2. **Sending**: validated text messages to known users.
//!
//! 3. **Read state and contacts**: mark-as-read, unread counts, the list of
//!    people the caller has talked to, and the midwife directory.
//!
//! Authentication happens upstream; see [`auth`].

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;

use std::future::Future;

use axum::{
    http::Method,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Args, ServerConfig};
pub use state::AppState;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "babylink_server=info,babylink_core=info,tower_http=info";

/// Install the global tracing subscriber.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let allow_origin = match &state.config.cors_origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::any(),
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any);

    Router::new()
        .route("/api/chats", post(api::send_message))
        .route("/api/chats/midwives", get(api::get_midwives))
        .route("/api/chats/users", get(api::get_contacts))
        .route("/api/chats/unread", get(api::get_unread_counts))
        .route("/api/chats/read/:user_id", put(api::mark_as_read))
        .route("/api/chats/:user_id", get(api::get_chat_history))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "babylink-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}
