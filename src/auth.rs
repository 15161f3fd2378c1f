/// Token issuance, validation, and authentication extractors
use crate::{
    api::middleware::extract_bearer_token,
    config::AuthConfig,
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token claims, validated as a whole at decode time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    /// Unique token id
    pub jti: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a signed access token for a user
pub fn issue_token(
    auth: &AuthConfig,
    user_id: i64,
    username: &str,
    role: &str,
) -> ApiResult<String> {
    let now = Utc::now();
    let expires = now + Duration::minutes(auth.token_ttl_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        user_id,
        user_name: username.to_string(),
        jti: Uuid::new_v4().to_string(),
        role: role.to_string(),
        iss: auth.jwt_issuer.clone(),
        aud: auth.jwt_audience.clone(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Jwt(format!("Failed to generate token: {}", e)))
}

/// Validate a token and return its claims.
///
/// Fails closed: a wrong signature, expired token, or mismatched
/// issuer/audience all reject the request.
pub fn verify_token(auth: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&auth.jwt_issuer]);
    validation.set_audience(&[&auth.jwt_audience]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| ApiError::Authentication(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Authenticated context - extracts and validates the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing authorization header".to_string()))?;

        let claims = verify_token(&state.config.authentication, &token)?;

        Ok(AuthContext {
            user_id: claims.user_id,
            username: claims.user_name.clone(),
            role: claims.role.clone(),
            claims,
        })
    }
}
