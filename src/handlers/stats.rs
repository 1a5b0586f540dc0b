use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::auth::middleware::AuthUser;
use crate::dto::{ApiResponse, CortisolQuery, StatsQuery};
use crate::error::{AppError, AppResult};
use crate::models::activity::DateRange;
use crate::models::stats::{ActivityStats, CortisolPeriod, CortisolSeries};
use crate::services::cortisol::synthesize_cortisol_series;
use crate::services::dates::day_key;
use crate::services::stats::compute_stats;
use crate::AppState;

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ApiResponse<ActivityStats>>> {
    let range = query.to_range().map_err(AppError::Validation)?;

    let activities = state
        .activities
        .fetch_activities(auth_user.id, range)
        .await?;

    let stats = compute_stats(&activities, Utc::now());
    tracing::debug!(
        user_id = %auth_user.id,
        total = stats.total,
        streak = stats.streak,
        "Computed activity stats"
    );

    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn get_cortisol(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CortisolQuery>,
) -> AppResult<Json<ApiResponse<CortisolSeries>>> {
    let period = CortisolPeriod::parse_lenient(query.period.as_deref());
    let echoed = query
        .period
        .unwrap_or_else(|| CortisolPeriod::default().as_str().to_string());
    let now = Utc::now();
    let start = now - Duration::days(period.days());

    let activities = state
        .activities
        .fetch_activities(auth_user.id, DateRange::since(start))
        .await?;

    let mut rng = StdRng::from_entropy();
    let data = synthesize_cortisol_series(
        &activities,
        day_key(start),
        day_key(now),
        &state.config.cortisol,
        &mut rng,
    );

    tracing::debug!(user_id = %auth_user.id, period = period.as_str(), points = data.len(), "Synthesized cortisol series");

    Ok(Json(ApiResponse::ok(CortisolSeries {
        period: echoed,
        data,
    })))
}
