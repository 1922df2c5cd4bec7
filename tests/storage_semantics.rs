//! Storage-backed semantics: the bid acceptance cascade, the all-or-nothing
//! bulk application update, and the password-change branches.
//!
//! These tests run against the Postgres named by DATABASE_URL, creating their
//! schema idempotently and seeding rows under fresh uuids so they can share a
//! database with each other and with a developer's data. Without DATABASE_URL
//! (or with the database unreachable) each test skips rather than fails, so
//! the rest of the suite stays hermetic.

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

use hirelink_api::app::app;
use hirelink_api::auth::{issue_token, Principal, Role};
use hirelink_api::database::models::ApplicationStatus;
use hirelink_api::services::{applications, bids};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
         id uuid PRIMARY KEY,
         name text NOT NULL,
         email text NOT NULL UNIQUE,
         password_hash text,
         role text NOT NULL,
         image text,
         created_at timestamptz NOT NULL DEFAULT now()
     )",
    "CREATE TABLE IF NOT EXISTS jobs (
         id uuid PRIMARY KEY,
         employer_id uuid NOT NULL,
         title text NOT NULL,
         description text NOT NULL,
         status text NOT NULL,
         created_at timestamptz NOT NULL DEFAULT now()
     )",
    "CREATE TABLE IF NOT EXISTS job_applications (
         id uuid PRIMARY KEY,
         job_id uuid NOT NULL,
         user_id uuid NOT NULL,
         status text NOT NULL,
         score int,
         notes text,
         created_at timestamptz NOT NULL DEFAULT now()
     )",
    "CREATE TABLE IF NOT EXISTS freelancer_projects (
         id uuid PRIMARY KEY,
         created_by uuid NOT NULL,
         title text NOT NULL,
         status text NOT NULL,
         created_at timestamptz NOT NULL DEFAULT now()
     )",
    "CREATE TABLE IF NOT EXISTS freelancer_bids (
         id uuid PRIMARY KEY,
         project_id uuid NOT NULL,
         user_id uuid NOT NULL,
         cover_letter text,
         status text NOT NULL,
         created_at timestamptz NOT NULL DEFAULT now()
     )",
];

async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };

    let pool = match PgPoolOptions::new().max_connections(5).connect(&url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("skipping: database unreachable: {}", e);
            return None;
        }
    };

    for ddl in SCHEMA {
        sqlx::query(ddl).execute(&pool).await.expect("schema setup");
    }
    Some(pool)
}

async fn seed_user(pool: &PgPool, role: Role, password_hash: Option<&str>) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind("Test User")
    .bind(format!("{}@example.com", id))
    .bind(password_hash)
    .bind(role.as_str())
    .execute(pool)
    .await
    .expect("seed user");
    id
}

async fn seed_project(pool: &PgPool, created_by: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO freelancer_projects (id, created_by, title, status)
         VALUES ($1, $2, 'Site redesign', 'open')",
    )
    .bind(id)
    .bind(created_by)
    .execute(pool)
    .await
    .expect("seed project");
    id
}

async fn seed_bid(pool: &PgPool, project_id: Uuid, user_id: Uuid, status: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO freelancer_bids (id, project_id, user_id, status) VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(project_id)
    .bind(user_id)
    .bind(status)
    .execute(pool)
    .await
    .expect("seed bid");
    id
}

async fn seed_job(pool: &PgPool, employer_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO jobs (id, employer_id, title, description, status)
         VALUES ($1, $2, 'Backend Engineer', 'Rust services', 'open')",
    )
    .bind(id)
    .bind(employer_id)
    .execute(pool)
    .await
    .expect("seed job");
    id
}

async fn seed_application(pool: &PgPool, job_id: Uuid, user_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO job_applications (id, job_id, user_id, status) VALUES ($1, $2, $3, 'pending')",
    )
    .bind(id)
    .bind(job_id)
    .bind(user_id)
    .execute(pool)
    .await
    .expect("seed application");
    id
}

async fn bid_status(pool: &PgPool, id: Uuid) -> String {
    sqlx::query_scalar("SELECT status FROM freelancer_bids WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("bid status")
}

async fn application_status(pool: &PgPool, id: Uuid) -> String {
    sqlx::query_scalar("SELECT status FROM job_applications WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("application status")
}

fn employer_principal(id: Uuid) -> Principal {
    Principal {
        id,
        role: Role::Employer,
    }
}

#[tokio::test]
async fn accepting_a_bid_rejects_competitors_and_starts_the_project() -> Result<()> {
    let Some(pool) = test_pool().await else { return Ok(()) };

    let employer = seed_user(&pool, Role::Employer, None).await;
    let c1 = seed_user(&pool, Role::Candidate, None).await;
    let c2 = seed_user(&pool, Role::Candidate, None).await;
    let c3 = seed_user(&pool, Role::Candidate, None).await;

    let project = seed_project(&pool, employer).await;
    let b1 = seed_bid(&pool, project, c1, "pending").await;
    let b2 = seed_bid(&pool, project, c2, "pending").await;
    let b3 = seed_bid(&pool, project, c3, "rejected").await;

    let result = bids::transition_bid(
        &pool,
        project,
        b1,
        Some("accepted"),
        employer_principal(employer),
    )
    .await?;

    assert_eq!(result.bid.status, "accepted");
    assert_eq!(result.user.id, c1);

    assert_eq!(bid_status(&pool, b1).await, "accepted");
    assert_eq!(bid_status(&pool, b2).await, "rejected");
    assert_eq!(bid_status(&pool, b3).await, "rejected");

    let project_status: String =
        sqlx::query_scalar("SELECT status FROM freelancer_projects WHERE id = $1")
            .bind(project)
            .fetch_one(&pool)
            .await?;
    assert_eq!(project_status, "in_progress");

    // Accepting a different bid later still leaves exactly one winner
    bids::transition_bid(
        &pool,
        project,
        b2,
        Some("accepted"),
        employer_principal(employer),
    )
    .await?;

    let accepted: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM freelancer_bids WHERE project_id = $1 AND status = 'accepted'",
    )
    .bind(project)
    .fetch_one(&pool)
    .await?;
    assert_eq!(accepted, 1);
    assert_eq!(bid_status(&pool, b2).await, "accepted");
    assert_eq!(bid_status(&pool, b1).await, "rejected");

    Ok(())
}

#[tokio::test]
async fn bid_under_a_different_project_is_forbidden() -> Result<()> {
    let Some(pool) = test_pool().await else { return Ok(()) };

    let employer = seed_user(&pool, Role::Employer, None).await;
    let candidate = seed_user(&pool, Role::Candidate, None).await;
    let p1 = seed_project(&pool, employer).await;
    let p2 = seed_project(&pool, employer).await;
    let foreign_bid = seed_bid(&pool, p2, candidate, "pending").await;

    let err = bids::transition_bid(
        &pool,
        p1,
        foreign_bid,
        Some("accepted"),
        employer_principal(employer),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), 403);
    assert_eq!(bid_status(&pool, foreign_bid).await, "pending");
    Ok(())
}

#[tokio::test]
async fn bulk_update_with_a_foreign_application_writes_nothing() -> Result<()> {
    let Some(pool) = test_pool().await else { return Ok(()) };

    let employer = seed_user(&pool, Role::Employer, None).await;
    let candidate = seed_user(&pool, Role::Candidate, None).await;
    let job = seed_job(&pool, employer).await;
    let other_job = seed_job(&pool, employer).await;

    let a1 = seed_application(&pool, job, candidate).await;
    let a2 = seed_application(&pool, job, candidate).await;
    let foreign = seed_application(&pool, other_job, candidate).await;

    let err = applications::bulk_update_status(
        &pool,
        job,
        &[a1, a2, foreign],
        ApplicationStatus::Accepted,
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 400);

    // The whole batch aborted: nothing moved off pending
    assert_eq!(application_status(&pool, a1).await, "pending");
    assert_eq!(application_status(&pool, a2).await, "pending");
    assert_eq!(application_status(&pool, foreign).await, "pending");

    // A batch made only of the job's own applications applies to all of them
    let updated =
        applications::bulk_update_status(&pool, job, &[a1, a2], ApplicationStatus::Accepted)
            .await?;
    assert_eq!(updated, 2);
    assert_eq!(application_status(&pool, a1).await, "accepted");
    assert_eq!(application_status(&pool, a2).await, "accepted");
    assert_eq!(application_status(&pool, foreign).await, "pending");

    Ok(())
}

async fn change_password(
    user_id: Uuid,
    current: &str,
    new: &str,
) -> (StatusCode, serde_json::Value) {
    let token = issue_token(user_id, Role::Employer).unwrap();
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/settings/password")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "currentPassword": current, "newPassword": new }).to_string(),
        ))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn password_change_requires_the_current_password() -> Result<()> {
    let Some(pool) = test_pool().await else { return Ok(()) };

    // Low cost keeps the test quick; strength is not under test here
    let hash = bcrypt::hash("hunter42", 4)?;
    let user = seed_user(&pool, Role::Employer, Some(&hash)).await;

    let (status, body) = change_password(user, "wrong-password", "new-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("error").and_then(|e| e.as_str()),
        Some("Current password is incorrect")
    );

    let stored: Option<String> =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(user)
            .fetch_one(&pool)
            .await?;
    assert_eq!(stored.as_deref(), Some(hash.as_str()));

    // Matching current password but a too-short replacement still fails
    let (status, _) = change_password(user, "hunter42", "123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // And the happy path stores a hash verifying the new password
    let (status, _) = change_password(user, "hunter42", "correct horse").await;
    assert_eq!(status, StatusCode::OK);

    let stored: Option<String> =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(user)
            .fetch_one(&pool)
            .await?;
    assert!(bcrypt::verify("correct horse", stored.as_deref().unwrap())?);

    Ok(())
}

#[tokio::test]
async fn password_change_rejects_accounts_without_a_stored_hash() -> Result<()> {
    let Some(pool) = test_pool().await else { return Ok(()) };

    let user = seed_user(&pool, Role::Employer, None).await;

    let (status, body) = change_password(user, "anything", "long-enough-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("error").and_then(|e| e.as_str()),
        Some("Password login is not enabled for this account")
    );
    Ok(())
}
