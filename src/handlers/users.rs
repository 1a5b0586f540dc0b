use axum::{extract::State, Extension, Json};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{ApiResponse, KitCodeRequest, UpdateProfileRequest};
use crate::error::{AppError, AppResult};
use crate::models::user::UserProfile;
use crate::AppState;

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(mut body): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    body.normalize();
    body.validate()?;

    let user = state
        .users
        .update_profile(auth_user.id, body.into_update())
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(ApiResponse::with_message(user.into(), "Profile updated")))
}

pub async fn update_kit_code(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<KitCodeRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    body.validate()?;

    let user = state
        .users
        .claim_kit_code(auth_user.id, &body.kit_code)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    tracing::info!(user_id = %auth_user.id, "Kit code linked");
    Ok(Json(ApiResponse::with_message(user.into(), "Kit code updated")))
}
