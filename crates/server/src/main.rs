//! Zaplink Server
//!
//! WhatsApp channel pairing for the sales dashboard: clients open a
//! WebSocket, request pairing of a number, receive a scannable
//! credential, and observe lifecycle broadcasts as channels come online,
//! change status, or are removed. REST endpoints cover channel
//! administration.

mod config;
mod coordinator;
mod events;
mod http;
mod logging;
mod qr;
mod registry;
mod state;
mod websocket;

use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{delete, get, put},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::websocket::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    let _logging = logging::init_logging()?;

    info!(
        component = "server",
        event = "server.starting",
        pairing_delay_secs = config.pairing_delay_secs,
        "Starting Zaplink server"
    );

    let state = Arc::new(AppState::new(config.pairing_delay()));

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/numbers", get(http::list_numbers))
        .route("/numbers/{id}/status", put(http::update_number_status))
        .route("/numbers/{id}", delete(http::delete_number))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = config.bind_addr();
    info!(
        component = "server",
        event = "server.listening",
        addr = %addr,
        "Listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
