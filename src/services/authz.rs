//! Resource ownership checks.
//!
//! Existence is always decided before ownership: a missing resource is 404 and
//! an existing resource owned by someone else is 403, never the other way
//! around. Every object-scoped handler loads its root resource through here.

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{FreelancerProject, Job};
use crate::error::ApiError;

/// 404 if absent, 403 if owned by a different employer.
pub fn ensure_owned<T>(
    resource: Option<T>,
    owner: impl Fn(&T) -> Uuid,
    principal_id: Uuid,
    noun: &str,
) -> Result<T, ApiError> {
    let resource = resource.ok_or_else(|| ApiError::not_found(format!("{} not found", noun)))?;
    if owner(&resource) != principal_id {
        return Err(ApiError::forbidden(format!(
            "You do not have access to this {}",
            noun.to_lowercase()
        )));
    }
    Ok(resource)
}

pub async fn find_owned_job(
    pool: &PgPool,
    job_id: Uuid,
    principal_id: Uuid,
) -> Result<Job, ApiError> {
    let job = sqlx::query_as::<_, Job>(
        "SELECT id, employer_id, title, description, status, created_at
         FROM jobs WHERE id = $1",
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    ensure_owned(job, |j| j.employer_id, principal_id, "Job")
}

pub async fn find_owned_project(
    pool: &PgPool,
    project_id: Uuid,
    principal_id: Uuid,
) -> Result<FreelancerProject, ApiError> {
    let project = sqlx::query_as::<_, FreelancerProject>(
        "SELECT id, created_by, title, status, created_at
         FROM freelancer_projects WHERE id = $1",
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    ensure_owned(project, |p| p.created_by, principal_id, "Project")
}
