use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::{AppConfig, SecurityConfig};
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Claims carried by issued tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthClaims {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Identity attached to every request by [`authenticate_jwt`]
///
/// `None` means the request is anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthClaims>);

/// Sign an HS256 token for the user
pub fn create_token(user: &User, security: &SecurityConfig) -> AppResult<String> {
    let iat = Utc::now().timestamp();
    let ttl = i64::try_from(security.token_ttl_secs).unwrap_or(i64::MAX);
    let claims = AuthClaims {
        username: user.username.clone(),
        is_admin: user.is_admin,
        iat,
        exp: iat.saturating_add(ttl),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(security.secret_key.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Verify signature and expiry, returning the claims
pub fn decode_token(token: &str, security: &SecurityConfig) -> AppResult<AuthClaims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(security.secret_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Authentication middleware
///
/// Reads `Authorization: Bearer <token>` and stores the verified claims in the
/// request extensions. A missing or invalid token never rejects the request;
/// route guards decide what anonymous callers may do.
pub async fn authenticate_jwt(
    State(app_config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| match decode_token(token.trim(), &app_config.security) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!("Ignoring bearer token: {}", e);
                None
            }
        });

    request.extensions_mut().insert(CurrentUser(claims));
    next.run(request).await
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}

/// Require a token whose holder is an admin
pub fn ensure_admin(current: &CurrentUser) -> AppResult<&AuthClaims> {
    match current.0.as_ref() {
        Some(claims) if claims.is_admin => Ok(claims),
        _ => Err(unauthorized()),
    }
}

/// Require a token for `username` itself, or an admin token
pub fn ensure_correct_user_or_admin<'a>(
    current: &'a CurrentUser,
    username: &str,
) -> AppResult<&'a AuthClaims> {
    match current.0.as_ref() {
        Some(claims) if claims.is_admin || claims.username == username => Ok(claims),
        _ => Err(unauthorized()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        AppConfig::default_config().security
    }

    fn user(username: &str, is_admin: bool) -> User {
        User {
            username: username.to_string(),
            first_name: "F".to_string(),
            last_name: "L".to_string(),
            email: "user@example.com".to_string(),
            is_admin,
        }
    }

    fn current(username: &str, is_admin: bool) -> CurrentUser {
        CurrentUser(Some(AuthClaims {
            username: username.to_string(),
            is_admin,
            iat: 0,
            exp: 0,
        }))
    }

    #[test]
    fn test_token_roundtrip() {
        let token = create_token(&user("u1", true), &security()).unwrap();
        let claims = decode_token(&token, &security()).unwrap();
        assert_eq!(claims.username, "u1");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = create_token(&user("u1", false), &security()).unwrap();
        let mut other = security();
        other.secret_key = "another-secret".to_string();
        assert!(matches!(
            decode_token(&token, &other),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = security();
        // Expired well past the default 60s leeway
        let iat = Utc::now().timestamp() - 3600;
        let claims = AuthClaims {
            username: "u1".to_string(),
            is_admin: false,
            iat,
            exp: iat + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(expired.secret_key.as_bytes()),
        )
        .unwrap();
        assert!(decode_token(&token, &expired).is_err());
    }

    #[test]
    fn test_guards() {
        let anonymous = CurrentUser::default();
        let admin = current("admin", true);
        let u1 = current("u1", false);

        assert!(ensure_admin(&anonymous).is_err());
        assert!(ensure_admin(&u1).is_err());
        assert_eq!(ensure_admin(&admin).unwrap().username, "admin");

        assert!(ensure_correct_user_or_admin(&u1, "u1").is_ok());
        assert!(ensure_correct_user_or_admin(&u1, "u2").is_err());
        assert!(ensure_correct_user_or_admin(&admin, "u2").is_ok());
        assert!(ensure_correct_user_or_admin(&anonymous, "u1").is_err());
    }
}
