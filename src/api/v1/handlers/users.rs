/*
 * Responsibility
 * - /users handlers: register, login, list, get, update self
 * - Password hashing runs on the blocking pool (Argon2 is CPU-bound)
 * - users keep their UUID in paths (no public id codec)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::users::{
            LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, UserResponse,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::user_repo,
    services::auth::password,
    state::AppState,
};

async fn hash_blocking(plain: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing task failed");
            AppError::Internal
        })?
        .map_err(AppError::from)
}

async fn verify_blocking(plain: String, hash: String) -> Result<(), AppError> {
    tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification task failed");
            AppError::Internal
        })?
        .map_err(AppError::from)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let password_hash = hash_blocking(req.password).await?;
    let row = user_repo::create(
        &state.db,
        req.name.trim(),
        req.identifier.trim(),
        &password_hash,
        req.photo.as_deref(),
    )
    .await?;

    tracing::info!(user_id = %row.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(row))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let row = user_repo::find_by_identifier(&state.db, req.identifier.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    verify_blocking(req.password, row.password_hash.clone()).await?;

    let tokens = state.auth.tokens();
    let token = tokens.issue(&row.identifier)?;

    Ok(Json(LoginResponse {
        id: row.id,
        name: row.name,
        identifier: row.identifier,
        photo: row.photo,
        token: format!("Bearer {token}"),
        expires_in: tokens.validity().as_secs(),
    }))
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = user_repo::list(&state.db).await?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::get(&state.db, user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(row)))
}

/// Updates the caller. Changing the identifier invalidates tokens issued for
/// the old one (their subject no longer resolves).
pub async fn update_self(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let password_hash = match req.password {
        Some(plain) => Some(hash_blocking(plain).await?),
        None => None,
    };

    // photo tri-state:
    // - None: do not update
    // - Some(None): set NULL
    // - Some(Some(v)): set v
    let photo: Option<Option<&str>> = req.photo.as_ref().map(|inner| inner.as_deref());

    let row = user_repo::update(
        &state.db,
        ctx.user_id,
        req.name.as_deref().map(str::trim),
        req.identifier.as_deref().map(str::trim),
        password_hash.as_deref(),
        photo,
    )
    .await?
    .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(row)))
}
