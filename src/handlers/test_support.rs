//! Router harness for handler tests: in-memory stores, a pool that never
//! connects, and a fixed client address for the rate limiter.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::jwt::create_access_token;
use crate::auth::rate_limit::{InMemoryRateLimitStore, RateLimiters};
use crate::config::Config;
use crate::db::memory::{MemoryActivityStore, MemoryUserStore};
use crate::AppState;

pub(crate) struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryActivityStore>,
    pub users: Arc<MemoryUserStore>,
    pub config: Arc<Config>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::for_tests())
    }

    pub fn with_config(config: Config) -> Self {
        let config = Arc::new(config);
        let store = Arc::new(MemoryActivityStore::new());
        let users = Arc::new(MemoryUserStore::new());
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");

        let state = AppState {
            db,
            config: config.clone(),
            activities: store.clone(),
            users: users.clone(),
            rate_limiters: RateLimiters::from_config(
                Arc::new(InMemoryRateLimitStore::new()),
                &config,
            ),
        };

        let router = crate::build_router(state)
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        Self {
            router,
            store,
            users,
            config,
        }
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        create_access_token(user_id, "user@example.com", &self.config).expect("token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
