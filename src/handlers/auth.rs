use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use crate::auth::{
    jwt::create_access_token,
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::dto::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, UserProfile};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(mut body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    body.normalize();
    body.validate()?;

    if state.users.find_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&body.password)?;
    let user = state
        .users
        .create(NewUser {
            name: body.name,
            email: body.email,
            phone: body.phone,
            password_hash,
        })
        .await?;

    let token = create_access_token(user.id, &user.email, &state.config)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            AuthResponse {
                token,
                user: user.into(),
            },
            "User registered",
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    body.validate()?;

    let user = state
        .users
        .find_by_email(&body.email.trim().to_lowercase())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login with wrong password");
        return Err(AppError::Unauthorized);
    }

    let user = state
        .users
        .touch_last_active(user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = create_access_token(user.id, &user.email, &state.config)?;

    Ok(Json(ApiResponse::with_message(
        AuthResponse {
            token,
            user: user.into(),
        },
        "Login successful",
    )))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let user = state
        .users
        .find(auth_user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(ApiResponse::ok(user.into())))
}
