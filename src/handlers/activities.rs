use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{ActivityListQuery, ActivityListResponse, ApiResponse, CreateActivityRequest};
use crate::error::{AppError, AppResult};
use crate::models::activity::{Activity, NewActivity};
use crate::AppState;

pub async fn create_activity(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateActivityRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Activity>>)> {
    let activity_type = body.parse_type().map_err(AppError::Validation)?;
    body.validate()?;
    let completed_at = body
        .validate_completed_at(Utc::now())
        .map_err(AppError::Validation)?;

    // Duration only means something for timed activities.
    let duration = if activity_type.is_timed() {
        body.duration
    } else {
        None
    };

    let activity = state
        .activities
        .insert(NewActivity {
            user_id: auth_user.id,
            activity_type,
            duration,
            mood: body.mood,
            notes: body.notes,
            completed_at,
        })
        .await?;

    tracing::info!(
        user_id = %auth_user.id,
        activity_id = %activity.id,
        activity_type = %activity.activity_type,
        "Activity logged"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(activity, "Activity logged")),
    ))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ActivityListQuery>,
) -> AppResult<Json<ApiResponse<ActivityListResponse<Activity>>>> {
    let filter = query.to_filter();
    let (activities, total) = state.activities.list(auth_user.id, filter).await?;

    Ok(Json(ApiResponse::ok(ActivityListResponse {
        activities,
        total,
        limit: filter.limit,
        offset: filter.offset,
    })))
}

pub async fn get_activity(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(activity_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Activity>>> {
    let activity = state
        .activities
        .find(auth_user.id, activity_id)
        .await?
        .ok_or(AppError::NotFound("Activity not found".into()))?;

    Ok(Json(ApiResponse::ok(activity)))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(activity_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Option<()>>>> {
    if !state.activities.delete(auth_user.id, activity_id).await? {
        return Err(AppError::NotFound("Activity not found".into()));
    }

    tracing::info!(user_id = %auth_user.id, activity_id = %activity_id, "Activity deleted");
    Ok(Json(ApiResponse::with_message(None, "Activity deleted")))
}
