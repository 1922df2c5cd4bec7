use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::JobTemplate;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};

/// GET /api/jobs/templates - the employer's templates, newest first
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Json<Vec<JobTemplate>>> {
    let pool = Database::pool().await?;

    let templates = sqlx::query_as::<_, JobTemplate>(
        "SELECT id, employer_id, name, title, description, created_at
         FROM job_templates WHERE employer_id = $1
         ORDER BY created_at DESC",
    )
    .bind(principal.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(templates))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// POST /api/jobs/templates
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<TemplateCreate>,
) -> ApiResult<impl IntoResponse> {
    let (name, title, description) = match (
        non_empty(payload.name.as_deref()),
        non_empty(payload.title.as_deref()),
        non_empty(payload.description.as_deref()),
    ) {
        (Some(n), Some(t), Some(d)) => (n, t, d),
        _ => {
            return Err(ApiError::bad_request(
                "name, title and description are required",
            ))
        }
    };

    let pool = Database::pool().await?;

    let template = sqlx::query_as::<_, JobTemplate>(
        "INSERT INTO job_templates (id, employer_id, name, title, description, created_at)
         VALUES ($1, $2, $3, $4, $5, now())
         RETURNING id, employer_id, name, title, description, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(principal.id)
    .bind(name)
    .bind(title)
    .bind(description)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
