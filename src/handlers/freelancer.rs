use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::Database;
use crate::error::ApiResult;
use crate::services::bids::{self, BidWithBidder};

#[derive(Debug, Deserialize)]
pub struct BidUpdate {
    pub status: Option<String>,
}

/// PATCH /api/freelancer/projects/:id/bids/:bid_id
///
/// Accepting a bid cascades: competing non-rejected bids are rejected and the
/// project moves to `in_progress`, all in one transaction (see
/// [`bids::transition_bid`]). An absent or empty status reapplies the bid's
/// current status.
pub async fn update_bid(
    Path((project_id, bid_id)): Path<(Uuid, Uuid)>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BidUpdate>,
) -> ApiResult<Json<BidWithBidder>> {
    let pool = Database::pool().await?;

    let result = bids::transition_bid(
        &pool,
        project_id,
        bid_id,
        payload.status.as_deref(),
        principal,
    )
    .await?;

    Ok(Json(result))
}
