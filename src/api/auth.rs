/// /api/auth endpoints
use crate::{
    account::{
        LoginRequest, MessageResponse, ProfileResponse, RegisterRequest, ResetPasswordRequest,
        TokenResponse,
    },
    auth::AuthContext,
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/perfil", get(profile))
        .route("/api/auth/datos-protegidos", get(protected_data))
        .route("/api/auth/verificar-usuario/:username", get(verify_user))
        .route("/api/auth/restablecer-contrasena", post(reset_password))
}

/// Login endpoint: verifies credentials and returns a signed token
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = ctx
        .account_manager
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// Registration endpoint; a separate login is required afterwards
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.account_manager
        .register(&req.username, &req.password, &req.email)
        .await?;

    Ok(Json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

/// Profile of the authenticated user
async fn profile(auth: AuthContext) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse {
        user_id: auth.user_id,
        message: "User profile retrieved successfully".to_string(),
    }))
}

/// Demo endpoint only reachable with a valid token
async fn protected_data(auth: AuthContext) -> Json<serde_json::Value> {
    Json(json!({
        "message": "Data accessible only with a valid token",
        "user": auth.username,
    }))
}

/// Existence probe for a username
async fn verify_user(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.account_manager.get_user_by_username(&username).await?;

    Ok(Json(MessageResponse {
        message: "User found".to_string(),
    }))
}

/// Overwrite a user's password
async fn reset_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.account_manager
        .reset_password(&req.username, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}
