use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::auth::Principal;
use crate::config;
use crate::database::models::Notification;
use crate::database::Database;
use crate::error::ApiResult;

/// GET /api/notifications - the principal's notifications, newest first,
/// capped at the configured list limit.
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Json<Vec<Notification>>> {
    let pool = Database::pool().await?;
    let cap = config::config().api.list_cap;

    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, title, body, \"read\", created_at
         FROM notifications WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2",
    )
    .bind(principal.id)
    .bind(cap)
    .fetch_all(&pool)
    .await?;

    Ok(Json(notifications))
}

/// PATCH /api/notifications/read-all - bulk mark the principal's unread rows
pub async fn read_all(Extension(principal): Extension<Principal>) -> ApiResult<Json<Value>> {
    let pool = Database::pool().await?;

    let result = sqlx::query(
        "UPDATE notifications SET \"read\" = TRUE WHERE user_id = $1 AND \"read\" = FALSE",
    )
    .bind(principal.id)
    .execute(&pool)
    .await?;

    Ok(Json(json!({ "updated": result.rows_affected() })))
}
