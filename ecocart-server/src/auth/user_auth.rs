//! User JWT authentication
//!
//! Tokens are issued by the external identity provider (HS256, shared
//! secret). The `sub` claim is the user identity everywhere in the service.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

/// JWT claims issued by the identity provider
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    /// User identity
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user extracted from the JWT
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

/// Sign a token the way the identity provider does (local tooling and tests)
pub fn create_token(
    user_id: &str,
    email: Option<&str>,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        email: email.map(String::from),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Middleware that extracts and verifies the user JWT from the Authorization header
pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotAuthenticated, "Missing Authorization header")
                .into_response()
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::with_message(ErrorCode::TokenInvalid, "Invalid Authorization format")
            .into_response()
    })?;

    let token_data = jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        let code = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ErrorCode::TokenExpired,
            _ => ErrorCode::TokenInvalid,
        };
        AppError::new(code).into_response()
    })?;

    let identity = UserIdentity {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
    };

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Admin guard; must run after [`user_auth_middleware`]
pub async fn admin_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let identity = request
        .extensions()
        .get::<UserIdentity>()
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    if !state.is_admin(&identity.user_id) {
        tracing::warn!(user_id = %identity.user_id, "Non-admin access to admin route");
        return Err(AppError::new(ErrorCode::AdminRequired).into_response());
    }

    Ok(next.run(request).await)
}
