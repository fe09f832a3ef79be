//! Bearer-token authentication middleware
//!
//! Verifies `Authorization: Bearer <JWT>` and stores the caller's
//! [`Identity`] in the request extensions, where handlers pick it up with
//! `Extension<Identity>`.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::domain::identity::Identity;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};
use crate::interfaces::http::common::ApiResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    UnknownRole,
}

impl AuthError {
    fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing bearer token",
            Self::InvalidToken => "invalid token",
            Self::ExpiredToken => "token has expired",
            Self::UnknownRole => "token carries an unknown role",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error("UNAUTHORIZED", self.message());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller from request headers
pub fn authenticate(headers: &axum::http::HeaderMap, config: &JwtConfig) -> Result<Identity, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    let token = bearer_token(value).ok_or(AuthError::InvalidToken)?;

    let claims = verify_token(token, config).map_err(|e| {
        debug!(error = %e, "Token rejected");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        }
    })?;

    claims.identity().map_err(|_| AuthError::UnknownRole)
}

/// Rejects the request with 401 unless it carries a valid token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &auth_state.jwt_config) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Role;
    use crate::infrastructure::crypto::jwt::create_token;
    use axum::http::HeaderMap;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn valid_token_yields_identity() {
        let config = JwtConfig::default();
        let token = create_token("7", "seven@example.com", Role::Admin, &config).unwrap();

        let identity = authenticate(&headers(&format!("Bearer {token}")), &config).unwrap();
        assert_eq!(identity.user_id, "7");
        assert!(identity.is_admin());
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = authenticate(&HeaderMap::new(), &JwtConfig::default()).unwrap_err();
        assert_eq!(err, AuthError::MissingToken);
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let err = authenticate(&headers("Basic dXNlcjpwYXNz"), &JwtConfig::default()).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        };
        let token = create_token("7", "seven@example.com", Role::Customer, &other).unwrap();

        let err = authenticate(&headers(&format!("Bearer {token}")), &JwtConfig::default())
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = JwtConfig {
            expiration_hours: -2,
            ..JwtConfig::default()
        };
        let token = create_token("7", "seven@example.com", Role::Customer, &config).unwrap();

        let err = authenticate(&headers(&format!("Bearer {token}")), &config).unwrap_err();
        assert_eq!(err, AuthError::ExpiredToken);
    }
}
