use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bcrypt::DEFAULT_COST;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Principal;
use crate::config;
use crate::database::models::User;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};

/// GET /api/settings/profile - the principal's account record, hash redacted
pub async fn get_profile(Extension(principal): Extension<Principal>) -> ApiResult<Json<User>> {
    let pool = Database::pool().await?;
    let user = fetch_user(&pool, principal).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// PATCH /api/settings/profile
pub async fn update_profile(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let pool = Database::pool().await?;

    if let Some(email) = payload.email.as_deref() {
        if !email.contains('@') {
            return Err(ApiError::bad_request("Invalid email format"));
        }

        let taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(principal.id)
                .fetch_one(&pool)
                .await?;
        if taken > 0 {
            return Err(ApiError::conflict("Email already in use"));
        }
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET
             name = COALESCE($1, name),
             email = COALESCE($2, email),
             image = COALESCE($3, image)
         WHERE id = $4
         RETURNING id, name, email, password_hash, role, image, created_at",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.image)
    .bind(principal.id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// PATCH /api/settings/password
///
/// Accounts created through OAuth carry no stored hash and cannot change a
/// password here, whatever the input.
pub async fn change_password(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<PasswordChange>,
) -> ApiResult<Json<Value>> {
    let pool = Database::pool().await?;
    let user = fetch_user(&pool, principal).await?;

    let hash = user.password_hash.as_deref().ok_or_else(|| {
        ApiError::bad_request("Password login is not enabled for this account")
    })?;

    if !bcrypt::verify(&payload.current_password, hash)? {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    validate_new_password(&payload.new_password)?;

    let new_hash = bcrypt::hash(&payload.new_password, DEFAULT_COST)?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(new_hash)
        .bind(user.id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "updated": true })))
}

/// POST /api/settings/upload-image
///
/// Inline base64 encoding is a placeholder for external object storage; the
/// MIME and size checks are the contract.
pub async fn upload_image(
    Extension(_principal): Extension<Principal>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<Value>> {
    // Bodies cut off by the framework's length limit stay inside the 400
    // contract instead of surfacing as a bare 413
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::bad_request("Image exceeds the 5 MB limit"));
        }
        Err(rejection) => {
            tracing::error!("failed to buffer upload body: {}", rejection);
            return Err(ApiError::bad_request("Failed to read upload body"));
        }
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    validate_upload(content_type.as_deref(), body.len())?;

    let mime = content_type.unwrap_or_default();
    let url = format!("data:{};base64,{}", mime, BASE64.encode(&body));

    Ok(Json(json!({ "url": url })))
}

fn validate_new_password(password: &str) -> Result<(), ApiError> {
    let min = config::config().security.min_password_len;
    if password.len() < min {
        return Err(ApiError::bad_request(format!(
            "New password must be at least {} characters",
            min
        )));
    }
    Ok(())
}

fn validate_upload(content_type: Option<&str>, len: usize) -> Result<(), ApiError> {
    let max = config::config().api.max_upload_bytes;

    match content_type {
        Some(ct) if ct.starts_with("image/") => {}
        _ => return Err(ApiError::bad_request("Only image uploads are allowed")),
    }
    if len == 0 {
        return Err(ApiError::bad_request("Empty upload"));
    }
    if len > max {
        return Err(ApiError::bad_request("Image exceeds the 5 MB limit"));
    }
    Ok(())
}

async fn fetch_user(pool: &sqlx::PgPool, principal: Principal) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, image, created_at
         FROM users WHERE id = $1",
    )
    .bind(principal.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_password_length_policy() {
        assert!(validate_new_password("12345").is_err());
        assert!(validate_new_password("").is_err());
        assert!(validate_new_password("123456").is_ok());
        assert!(validate_new_password("correct horse battery").is_ok());
    }

    #[test]
    fn upload_requires_image_mime() {
        assert!(validate_upload(Some("image/png"), 1024).is_ok());
        assert!(validate_upload(Some("image/jpeg"), 1024).is_ok());
        assert!(validate_upload(Some("text/plain"), 1024).is_err());
        assert!(validate_upload(None, 1024).is_err());
    }

    #[test]
    fn upload_enforces_size_ceiling() {
        let max = config::config().api.max_upload_bytes;
        assert!(validate_upload(Some("image/png"), max).is_ok());
        assert!(validate_upload(Some("image/png"), max + 1).is_err());
        assert!(validate_upload(Some("image/png"), 0).is_err());
    }
}
