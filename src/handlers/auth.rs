use axum::{
    extract::Query,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, Role};
use crate::database::models::User;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - verify credentials and issue the session token.
///
/// The token is returned in the body and set as the session cookie so both
/// API clients and the browser portal can use the same endpoint.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<impl IntoResponse> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let pool = Database::pool().await?;
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, image, created_at
         FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&pool)
    .await?;

    // One failure message for unknown email, OAuth-origin account, and wrong
    // password, so the endpoint leaks nothing about which it was.
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = user.ok_or_else(invalid)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !bcrypt::verify(&payload.password, hash)? {
        return Err(invalid());
    }

    let role = Role::parse(&user.role)
        .ok_or_else(|| ApiError::forbidden("Employer account required"))?;
    if role != Role::Employer {
        return Err(ApiError::forbidden("Employer account required"));
    }

    let token = auth::issue_token(user.id, role)?;
    let cookie = auth::session_cookie(&token);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "token": token, "user": user })),
    ))
}

/// GET /auth/session - the resolved principal, or 401
pub async fn session(headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    let principal = auth::resolve_session(&headers)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    Ok(Json(principal))
}

#[derive(Debug, Deserialize)]
pub struct ErrorParams {
    pub error: Option<String>,
}

/// GET /auth/error - normalize error query parameters onto the login page
pub async fn error_redirect(Query(params): Query<ErrorParams>) -> Redirect {
    let code = params.error.unwrap_or_else(|| "unknown".to_string());
    Redirect::temporary(&format!("/login?error={}", code))
}
