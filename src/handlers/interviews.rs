use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::config;
use crate::database::models::InterviewAttempt;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuery {
    pub user_id: Option<Uuid>,
    pub min_score: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound covering the whole of `date`
fn day_end_exclusive(date: NaiveDate) -> DateTime<Utc> {
    day_start(date) + Duration::days(1)
}

/// GET /api/interviews - attempts on the employer's jobs, filtered, newest
/// first, capped at the configured list limit.
pub async fn list(
    Query(query): Query<InterviewQuery>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<InterviewAttempt>>> {
    let pool = Database::pool().await?;
    let cap = config::config().api.list_cap;

    let from = query.date_from.map(day_start);
    let to = query.date_to.map(day_end_exclusive);

    let attempts = sqlx::query_as::<_, InterviewAttempt>(
        "SELECT i.id, i.job_id, i.user_id, i.ai_score, i.status, i.completed_at, i.created_at
         FROM interview_attempts i
         JOIN jobs j ON j.id = i.job_id
         WHERE j.employer_id = $1
           AND ($2::uuid IS NULL OR i.user_id = $2)
           AND ($3::int4 IS NULL OR i.ai_score >= $3)
           AND ($4::timestamptz IS NULL OR i.completed_at >= $4)
           AND ($5::timestamptz IS NULL OR i.completed_at < $5)
         ORDER BY i.completed_at DESC NULLS LAST
         LIMIT $6",
    )
    .bind(principal.id)
    .bind(query.user_id)
    .bind(query.min_score)
    .bind(from)
    .bind(to)
    .bind(cap)
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}

/// GET /api/interviews/:id
pub async fn get(
    Path(attempt_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<InterviewAttempt>> {
    let pool = Database::pool().await?;

    let attempt = sqlx::query_as::<_, InterviewAttempt>(
        "SELECT id, job_id, user_id, ai_score, status, completed_at, created_at
         FROM interview_attempts WHERE id = $1",
    )
    .bind(attempt_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Interview not found"))?;

    let employer_id: Option<Uuid> =
        sqlx::query_scalar("SELECT employer_id FROM jobs WHERE id = $1")
            .bind(attempt.job_id)
            .fetch_optional(&pool)
            .await?;

    // An attempt whose job is gone is unreachable for everyone
    let employer_id = employer_id.ok_or_else(|| ApiError::not_found("Interview not found"))?;
    if employer_id != principal.id {
        return Err(ApiError::forbidden(
            "You do not have access to this interview",
        ));
    }

    Ok(Json(attempt))
}
