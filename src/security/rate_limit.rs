//! Per-client fixed-window rate limiting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::http::client::ClientIdentity;
use crate::http::error::ApiError;
use crate::observability::metrics;

/// Request counter for one client identity.
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    started: Instant,
    admitted: u32,
}

impl RateWindow {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            admitted: 0,
        }
    }

    fn try_acquire(&mut self, now: Instant, limit: u32, window: Duration) -> bool {
        if now.duration_since(self.started) >= window {
            *self = Self::new(now);
        }

        if self.admitted < limit {
            self.admitted += 1;
            true
        } else {
            false
        }
    }

    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.started) >= window
    }
}

/// Admits at most `limit` requests per `window` for each [`ClientIdentity`].
///
/// Constructed once at startup and shared by reference with the middleware.
pub struct RateLimiter {
    windows: Mutex<HashMap<ClientIdentity, RateWindow>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            limit,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_window, Duration::from_millis(config.window_ms))
    }

    /// Count a request from `client`; `false` means it must be rejected.
    pub fn check(&self, client: &ClientIdentity) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &ClientIdentity, now: Instant) -> bool {
        let mut windows = self.windows.lock();
        if let Some(window) = windows.get_mut(client) {
            return window.try_acquire(now, self.limit, self.window);
        }
        let mut window = RateWindow::new(now);
        let admitted = window.try_acquire(now, self.limit, self.window);
        windows.insert(client.clone(), window);
        admitted
    }

    /// Drop windows that have already elapsed. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, w| !w.is_stale(now, self.window));
        before - windows.len()
    }

    /// Number of client identities currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().len()
    }

    /// Periodically sweep stale windows until shutdown.
    pub async fn run_sweeper(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "Swept idle rate limit windows");
                    }
                }
                _ = shutdown.recv() => return,
            }
        }
    }
}

/// Middleware rejecting clients that exceeded their budget.
///
/// Expects [`ClientIdentity`] in the request extensions; requests without
/// one share a single anonymous bucket.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ClientIdentity>()
        .cloned()
        .unwrap_or_default();

    if limiter.check(&client) {
        next.run(request).await
    } else {
        tracing::warn!(
            client_ip = %client.ip,
            user_agent = %client.user_agent,
            "Rate limit exceeded"
        );
        metrics::record_rate_limited();
        ApiError::RateLimited.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn client(agent: &str) -> ClientIdentity {
        ClientIdentity {
            ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            user_agent: agent.to_string(),
        }
    }

    #[test]
    fn test_sixth_request_in_window_rejected() {
        let limiter = RateLimiter::new(5, Duration::from_secs(1));
        let now = Instant::now();
        let c = client("curl/8");

        for i in 0..5 {
            assert!(limiter.check_at(&c, now + Duration::from_millis(i * 10)), "request {}", i + 1);
        }
        assert!(!limiter.check_at(&c, now + Duration::from_millis(60)));
    }

    #[test]
    fn test_window_rollover_admits_again() {
        let limiter = RateLimiter::new(5, Duration::from_secs(1));
        let now = Instant::now();
        let c = client("curl/8");

        for _ in 0..5 {
            assert!(limiter.check_at(&c, now));
        }
        assert!(!limiter.check_at(&c, now + Duration::from_millis(999)));
        assert!(limiter.check_at(&c, now + Duration::from_secs(1)));
    }

    #[test]
    fn test_rejected_requests_do_not_extend_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        let now = Instant::now();
        let c = client("a");

        assert!(limiter.check_at(&c, now));
        assert!(!limiter.check_at(&c, now + Duration::from_millis(500)));
        assert!(!limiter.check_at(&c, now + Duration::from_millis(900)));
        assert!(limiter.check_at(&c, now + Duration::from_millis(1000)));
    }

    #[test]
    fn test_agent_is_part_of_identity() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        let now = Instant::now();

        assert!(limiter.check_at(&client("firefox"), now));
        assert!(!limiter.check_at(&client("firefox"), now));
        assert!(limiter.check_at(&client("chrome"), now));
        // Empty agent is just another bucket.
        assert!(limiter.check_at(&client(""), now));
        assert!(!limiter.check_at(&client(""), now));
    }

    #[test]
    fn test_sweep_drops_only_elapsed_windows() {
        let limiter = RateLimiter::new(5, Duration::from_secs(1));
        let now = Instant::now();

        limiter.check_at(&client("old"), now);
        limiter.check_at(&client("new"), now + Duration::from_millis(800));

        assert_eq!(limiter.sweep_at(now + Duration::from_millis(1200)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_concurrent_clients_never_over_admit() {
        let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..10).filter(|_| limiter.check(&client("shared"))).count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 5);
    }
}
