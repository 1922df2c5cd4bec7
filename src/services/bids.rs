//! Bid state transitions, including the acceptance cascade.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{FreelancerBid, PublicProfile};
use crate::error::ApiError;
use crate::services::authz;

/// Updated bid together with the bidder's public profile fields
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidWithBidder {
    #[serde(flatten)]
    pub bid: FreelancerBid,
    pub user: PublicProfile,
}

/// The status a transition request resolves to: an empty or absent status
/// reapplies the bid's current status (documented no-op, kept on purpose).
pub fn effective_status(requested: Option<&str>, current: &str) -> String {
    match requested {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => current.to_string(),
    }
}

/// Transition a bid's status on behalf of the owning employer.
///
/// Accepting a bid rejects every competing non-rejected bid for the project
/// and moves the project to `in_progress`. All writes share one transaction,
/// so no observer sees the project in progress without exactly one accepted
/// bid.
pub async fn transition_bid(
    pool: &PgPool,
    project_id: Uuid,
    bid_id: Uuid,
    requested_status: Option<&str>,
    principal: Principal,
) -> Result<BidWithBidder, ApiError> {
    let project = authz::find_owned_project(pool, project_id, principal.id).await?;

    let bid = sqlx::query_as::<_, FreelancerBid>(
        "SELECT id, project_id, user_id, cover_letter, status, created_at
         FROM freelancer_bids WHERE id = $1",
    )
    .bind(bid_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Bid not found"))?;

    if bid.project_id != project.id {
        return Err(ApiError::forbidden("Bid does not belong to this project"));
    }

    let status = effective_status(requested_status, &bid.status);

    let mut tx = pool.begin().await?;

    if status == "accepted" {
        sqlx::query(
            "UPDATE freelancer_bids SET status = 'rejected'
             WHERE project_id = $1 AND id <> $2 AND status <> 'rejected'",
        )
        .bind(project.id)
        .bind(bid.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE freelancer_projects SET status = 'in_progress' WHERE id = $1")
            .bind(project.id)
            .execute(&mut *tx)
            .await?;
    }

    let updated = sqlx::query_as::<_, FreelancerBid>(
        "UPDATE freelancer_bids SET status = $1 WHERE id = $2
         RETURNING id, project_id, user_id, cover_letter, status, created_at",
    )
    .bind(&status)
    .bind(bid.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let user = sqlx::query_as::<_, PublicProfile>("SELECT id, name, image FROM users WHERE id = $1")
        .bind(updated.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            tracing::error!("bid {} references missing user {}", updated.id, updated.user_id);
            ApiError::internal_server_error("Bid references a missing user")
        })?;

    Ok(BidWithBidder { bid: updated, user })
}
