use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::AppError;
use crate::AppState;

/// Fixed-window policy: at most `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Counter storage keyed by client. Swap the in-memory store for a shared one
/// when running more than one instance.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request. Returns the remaining budget, or how long until the
    /// window resets when the key is over its limit.
    async fn hit(&self, key: &str, limit: RateLimit, now: Instant) -> Result<u32, Duration>;

    /// Drop windows that have already reset.
    async fn purge_expired(&self, now: Instant);
}

struct WindowCounter {
    count: u32,
    window_reset_at: Instant,
}

#[derive(Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, WindowCounter>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, limit: RateLimit, now: Instant) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;

        let entry = entries.entry(key.to_string()).or_insert(WindowCounter {
            count: 0,
            window_reset_at: now + limit.window,
        });

        if now > entry.window_reset_at {
            entry.count = 0;
            entry.window_reset_at = now + limit.window;
        }

        if entry.count >= limit.max_requests {
            return Err(entry.window_reset_at.saturating_duration_since(now));
        }

        entry.count += 1;
        Ok(limit.max_requests - entry.count)
    }

    async fn purge_expired(&self, now: Instant) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| now <= entry.window_reset_at);
        tracing::debug!(active_keys = entries.len(), "Rate limiter cleanup");
    }
}

/// The store plus the two policies applied by the middlewares below.
#[derive(Clone)]
pub struct RateLimiters {
    pub store: Arc<dyn RateLimitStore>,
    pub global: RateLimit,
    pub auth: RateLimit,
}

impl RateLimiters {
    pub fn from_config(store: Arc<dyn RateLimitStore>, config: &Config) -> Self {
        Self {
            store,
            global: RateLimit::new(config.rate_limit_max, config.rate_limit_window_secs),
            auth: RateLimit::new(config.auth_rate_limit_max, config.auth_rate_limit_window_secs),
        }
    }
}

/// Purges expired windows every five minutes for the life of the process.
pub fn spawn_cleanup_worker(store: Arc<dyn RateLimitStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            store.purge_expired(Instant::now()).await;
        }
    });
}

async fn enforce(
    limiters: &RateLimiters,
    key: &str,
    limit: RateLimit,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match limiters.store.hit(key, limit, Instant::now()).await {
        Ok(remaining) => {
            tracing::debug!(key = %key, remaining = remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                key = %key,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

/// Per-IP limit for every API route.
pub async fn rate_limit_global(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = addr.ip().to_string();
    enforce(&state.rate_limiters, &key, state.rate_limiters.global, req, next).await
}

/// Stricter per-IP limit for auth endpoints; /login and /register count separately.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("auth:{}:{}", addr.ip(), req.uri().path());
    enforce(&state.rate_limiters, &key, state.rate_limiters.auth, req, next).await
}
