//! Session and role authorization.
//!
//! Single source of truth for the session resolver and the employer role gate.
//! The router-layer middleware, the login handler, and every ownership check go
//! through the types defined here, so no two layers can disagree on the claims
//! shape or the role string.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employer,
    Candidate,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "employer" => Some(Role::Employer),
            "candidate" => Some(Role::Candidate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::Candidate => "candidate",
        }
    }
}

/// Signed session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// The authenticated actor for a single request. Transient, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

impl From<TokenError> for crate::error::ApiError {
    fn from(err: TokenError) -> Self {
        tracing::error!("Token error: {}", err);
        crate::error::ApiError::internal_server_error("Failed to issue session token")
    }
}

/// Issue a signed session token for the given user
pub fn issue_token(user_id: Uuid, role: Role) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &Claims::new(user_id, role), &encoding_key)
        .map_err(|e| TokenError::TokenGeneration(e.to_string()))
}

/// Validate a session token. Returns None for anything invalid or expired.
fn validate_token(token: &str) -> Option<Claims> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return None;
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .ok()
        .map(|data| data.claims)
}

/// Resolve the request session into a principal.
///
/// Reads the token from the `Authorization: Bearer` header first, then from
/// the session cookie. A missing, malformed, or expired session is `None`,
/// never an error.
pub fn resolve_session(headers: &HeaderMap) -> Option<Principal> {
    let token = bearer_token(headers).or_else(|| cookie_token(headers))?;
    validate_token(&token).map(Principal::from)
}

/// The employer role gate: 401 with no principal, 403 for any other role.
pub fn require_employer(
    principal: Option<Principal>,
) -> Result<Principal, crate::error::ApiError> {
    match principal {
        None => Err(crate::error::ApiError::unauthorized(
            "Authentication required",
        )),
        Some(p) if p.role != Role::Employer => Err(crate::error::ApiError::forbidden(
            "Employer role required",
        )),
        Some(p) => Ok(p),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookie_name = &config::config().security.session_cookie;
    let value = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in value.split(';') {
        let pair = pair.trim();
        if let Some(token) = pair.strip_prefix(cookie_name.as_str()) {
            if let Some(token) = token.strip_prefix('=') {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

/// Set-Cookie value for a freshly issued session token
pub fn session_cookie(token: &str) -> String {
    let cfg = &config::config().security;
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cfg.session_cookie,
        token,
        cfg.jwt_expiry_hours * 3600
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: header::HeaderName, value: String) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_round_trip() {
        let id = Uuid::new_v4();
        let token = issue_token(id, Role::Employer).unwrap();
        let headers = headers_with(header::AUTHORIZATION, format!("Bearer {}", token));

        let principal = resolve_session(&headers).expect("session should resolve");
        assert_eq!(principal.id, id);
        assert_eq!(principal.role, Role::Employer);
    }

    #[test]
    fn cookie_token_round_trip() {
        let id = Uuid::new_v4();
        let token = issue_token(id, Role::Candidate).unwrap();
        let headers = headers_with(
            header::COOKIE,
            format!("theme=dark; hl_session={}; other=1", token),
        );

        let principal = resolve_session(&headers).expect("session should resolve");
        assert_eq!(principal.id, id);
        assert_eq!(principal.role, Role::Candidate);
    }

    #[test]
    fn garbage_token_resolves_to_none() {
        let headers = headers_with(header::AUTHORIZATION, "Bearer not-a-jwt".to_string());
        assert!(resolve_session(&headers).is_none());
    }

    #[test]
    fn missing_session_resolves_to_none() {
        assert!(resolve_session(&HeaderMap::new()).is_none());
    }

    #[test]
    fn gate_rejects_missing_principal_as_unauthenticated() {
        let err = require_employer(None).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn gate_rejects_candidate_as_forbidden() {
        let principal = Principal {
            id: Uuid::new_v4(),
            role: Role::Candidate,
        };
        let err = require_employer(Some(principal)).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn gate_accepts_employer() {
        let principal = Principal {
            id: Uuid::new_v4(),
            role: Role::Employer,
        };
        let got = require_employer(Some(principal)).unwrap();
        assert_eq!(got, principal);
    }

    #[test]
    fn role_string_round_trip() {
        assert_eq!(Role::parse("employer"), Some(Role::Employer));
        assert_eq!(Role::parse("candidate"), Some(Role::Candidate));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::Employer.as_str(), "employer");
    }
}
