//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers under `/v1`
//! - Wire up middleware (request ID, client identity, audit, limits)
//! - Bind server to listener
//! - Run the rate limiter sweeper alongside the server
//!
//! # Layer order (outermost first)
//! ```text
//! request id → client identity → audit → body limit → timeout body
//!     → timeout → /v1: rate limit → handler | JSON fallbacks
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::config::{SecretsConfig, ServerCapabilities};
use crate::http::client::{identify_client, AddressSource};
use crate::http::error::{method_not_allowed, not_found, timeout_body};
use crate::http::middleware::audit_middleware;
use crate::http::{message, params};
use crate::security::{rate_limit_middleware, LatencyFloor, RateLimiter};
use crate::store::MessageStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    pub capabilities: ServerCapabilities,
    pub latency_floor: LatencyFloor,
}

/// HTTP server for the secrets API.
pub struct HttpServer {
    router: Router,
    config: SecretsConfig,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl HttpServer {
    /// Create a new HTTP server backed by `store`.
    pub fn new(config: SecretsConfig, store: Arc<dyn MessageStore>) -> Self {
        let state = AppState {
            store,
            capabilities: config.limits,
            latency_floor: LatencyFloor::new(Duration::from_millis(
                config.retrieval.min_latency_ms,
            )),
        };

        let rate_limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));

        let router = Self::build_router(&config, state, rate_limiter.clone());
        Self {
            router,
            config,
            rate_limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &SecretsConfig,
        state: AppState,
        rate_limiter: Option<Arc<RateLimiter>>,
    ) -> Router {
        let mut v1 = Router::new()
            .route("/message", post(message::create_message))
            .route("/message/{key}/{pin}", get(message::retrieve_message))
            .route("/params", get(params::get_params))
            .route("/ping", get(params::ping))
            .fallback(not_found)
            .method_not_allowed_fallback(method_not_allowed)
            .with_state(state);

        if let Some(limiter) = rate_limiter {
            v1 = v1.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        let address_source = AddressSource::from_trust(config.listener.trust_forwarded_headers);

        Router::new()
            .nest("/v1", v1)
            .fallback(not_found)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(timeout_body))
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .layer(middleware::from_fn(audit_middleware))
            .layer(middleware::from_fn_with_state(address_source, identify_client))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            pin_size = self.config.limits.pin_size,
            max_pin_attempts = self.config.limits.max_pin_attempts,
            max_exp_secs = self.config.limits.max_exp_secs,
            "HTTP server starting"
        );

        if let Some(limiter) = self.rate_limiter.clone() {
            let interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
            tokio::spawn(limiter.run_sweeper(interval, shutdown.resubscribe()));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SecretsConfig {
        &self.config
    }
}
