//! Bulk job-application status updates: fully validate, then fully apply.

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::ApplicationStatus;
use crate::error::ApiError;

/// Ids from `requested` that are absent from `found`
pub fn missing_ids(requested: &[Uuid], found: &[Uuid]) -> Vec<Uuid> {
    requested
        .iter()
        .filter(|id| !found.contains(id))
        .copied()
        .collect()
}

/// Apply one status to a batch of applications belonging to a job.
///
/// Every requested id must belong to the job; a single foreign id aborts the
/// whole batch before any row is written. The update itself runs in one
/// transaction. Returns the number of updated rows.
pub async fn bulk_update_status(
    pool: &PgPool,
    job_id: Uuid,
    application_ids: &[Uuid],
    status: ApplicationStatus,
) -> Result<u64, ApiError> {
    let found: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM job_applications WHERE job_id = $1 AND id = ANY($2)",
    )
    .bind(job_id)
    .bind(application_ids)
    .fetch_all(pool)
    .await?;

    if !missing_ids(application_ids, &found).is_empty() {
        return Err(ApiError::bad_request(
            "Some applications do not belong to this job",
        ));
    }

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "UPDATE job_applications SET status = $1 WHERE job_id = $2 AND id = ANY($3)",
    )
    .bind(status.as_str())
    .bind(job_id)
    .bind(application_ids)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_flags_foreign_entries() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        assert!(missing_ids(&[a, b], &[a, b]).is_empty());
        assert_eq!(missing_ids(&[a, b, c], &[a, b]), vec![c]);
        assert_eq!(missing_ids(&[c], &[]), vec![c]);
        assert!(missing_ids(&[], &[a]).is_empty());
    }
}
