use std::env;
use std::str::FromStr;

use anyhow::{bail, Context};

use crate::services::cortisol::CortisolParams;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub app_env: String,
    pub cors_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,

    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub auth_rate_limit_max: u32,
    pub auth_rate_limit_window_secs: u64,

    pub cortisol: CortisolParams,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let cortisol = CortisolParams {
            baseline: parse_or("CORTISOL_BASELINE", 5.0)?,
            activity_weight: parse_or("CORTISOL_ACTIVITY_WEIGHT", 0.3)?,
            jitter: parse_or("CORTISOL_JITTER", 0.5)?,
            min: parse_or("CORTISOL_MIN", 2.0)?,
            max: parse_or("CORTISOL_MAX", 8.0)?,
        };
        check_cortisol(&cortisol)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("PORT", 3000)?,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_ttl_secs: parse_or("JWT_TTL_SECS", 30 * 24 * 3600)?,

            rate_limit_max: parse_or("RATE_LIMIT_MAX", 100)?,
            rate_limit_window_secs: parse_or("RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
            auth_rate_limit_max: parse_or("AUTH_RATE_LIMIT_MAX", 5)?,
            auth_rate_limit_window_secs: parse_or("AUTH_RATE_LIMIT_WINDOW_SECS", 60)?,

            cortisol,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

/// The synthesizer clamps and samples with these, so they must be finite and ordered.
fn check_cortisol(params: &CortisolParams) -> anyhow::Result<()> {
    let fields = [
        ("CORTISOL_BASELINE", params.baseline),
        ("CORTISOL_ACTIVITY_WEIGHT", params.activity_weight),
        ("CORTISOL_JITTER", params.jitter),
        ("CORTISOL_MIN", params.min),
        ("CORTISOL_MAX", params.max),
    ];
    for (key, value) in fields {
        if !value.is_finite() {
            bail!("{} must be a finite number", key);
        }
    }
    if params.min > params.max {
        bail!("CORTISOL_MIN must not exceed CORTISOL_MAX");
    }
    if params.jitter < 0.0 {
        bail!("CORTISOL_JITTER must be non-negative");
    }
    Ok(())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a valid value: {}", key, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Config for router tests; never touches the environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/waicalm_test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            app_env: "test".into(),
            cors_origins: Vec::new(),
            jwt_secret: "test-secret".into(),
            jwt_ttl_secs: 3600,
            rate_limit_max: 100,
            rate_limit_window_secs: 900,
            auth_rate_limit_max: 5,
            auth_rate_limit_window_secs: 60,
            cortisol: CortisolParams::default(),
        }
    }
}
