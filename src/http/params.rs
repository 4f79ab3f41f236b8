use axum::{extract::State, Json};

use crate::config::ServerCapabilities;
use crate::http::server::AppState;

/// `GET /v1/params`
pub async fn get_params(State(state): State<AppState>) -> Json<ServerCapabilities> {
    Json(state.capabilities)
}

/// `GET /v1/ping`
pub async fn ping() -> &'static str {
    "pong"
}
