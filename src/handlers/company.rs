use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::Company;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};

/// GET /api/company - the employer's company profile
pub async fn get(Extension(principal): Extension<Principal>) -> ApiResult<Json<Company>> {
    let pool = Database::pool().await?;

    let company = sqlx::query_as::<_, Company>(
        "SELECT id, employer_id, name, description, logo, website, location, created_at
         FROM companies WHERE employer_id = $1",
    )
    .bind(principal.id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Company profile not found"))?;

    Ok(Json(company))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
}

/// PATCH /api/company - create-or-update the company profile.
///
/// The company record is created lazily on the first save; later saves update
/// in place, leaving omitted fields untouched.
pub async fn update(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CompanyUpdate>,
) -> ApiResult<Json<Company>> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Company name is required"))?;

    let pool = Database::pool().await?;

    let company = sqlx::query_as::<_, Company>(
        "INSERT INTO companies (id, employer_id, name, description, logo, website, location, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, now())
         ON CONFLICT (employer_id) DO UPDATE SET
             name = EXCLUDED.name,
             description = COALESCE(EXCLUDED.description, companies.description),
             logo = COALESCE(EXCLUDED.logo, companies.logo),
             website = COALESCE(EXCLUDED.website, companies.website),
             location = COALESCE(EXCLUDED.location, companies.location)
         RETURNING id, employer_id, name, description, logo, website, location, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(principal.id)
    .bind(name)
    .bind(&payload.description)
    .bind(&payload.logo)
    .bind(&payload.website)
    .bind(&payload.location)
    .fetch_one(&pool)
    .await?;

    Ok(Json(company))
}
