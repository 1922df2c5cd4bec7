use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, Environment};
use crate::handlers::{
    applications, auth, company, freelancer, interviews, jobs, notifications, settings, templates,
};
use crate::middleware::employer_gate;

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (exempt from the employer gate)
        .merge(auth_routes())
        // Employer portal API, behind the single authorization gate
        .merge(api_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/session", get(auth::session))
        .route("/auth/error", get(auth::error_redirect))
}

fn api_routes() -> Router {
    let upload_limit = config::config().api.max_upload_bytes + 64 * 1024;

    Router::new()
        // Company profile
        .route("/api/company", get(company::get).patch(company::update))
        // Job postings and templates ("templates" is static, wins over :id)
        .route("/api/jobs", get(jobs::list).post(jobs::create))
        .route(
            "/api/jobs/templates",
            get(templates::list).post(templates::create),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::get).patch(jobs::update).delete(jobs::delete),
        )
        // Candidate applications
        .route("/api/jobs/:id/applications", get(applications::list))
        .route(
            "/api/jobs/:id/applications/bulk",
            patch(applications::bulk_update),
        )
        .route(
            "/api/jobs/:id/applications/:app_id",
            patch(applications::update),
        )
        // Freelancer bids
        .route(
            "/api/freelancer/projects/:id/bids/:bid_id",
            patch(freelancer::update_bid),
        )
        // Interview results
        .route("/api/interviews", get(interviews::list))
        .route("/api/interviews/:id", get(interviews::get))
        // Notifications
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/read-all", patch(notifications::read_all))
        // Account settings
        .route(
            "/api/settings/profile",
            get(settings::get_profile).patch(settings::update_profile),
        )
        .route("/api/settings/password", patch(settings::change_password))
        .route(
            "/api/settings/upload-image",
            // Raised above the 5 MB contract so the handler owns the error
            post(settings::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(axum::middleware::from_fn(employer_gate))
}

fn cors_layer() -> CorsLayer {
    let cfg = config::config();

    if !cfg.security.enable_cors {
        return CorsLayer::new();
    }

    match cfg.environment {
        Environment::Development => CorsLayer::permissive(),
        _ => {
            let origins: Vec<HeaderValue> = cfg
                .security
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "HireLink Employer API",
        "version": version,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/auth/login, /auth/session, /auth/error (public)",
            "company": "/api/company (employer)",
            "jobs": "/api/jobs[/:id] (employer)",
            "templates": "/api/jobs/templates (employer)",
            "applications": "/api/jobs/:id/applications[/:appId|/bulk] (employer)",
            "bids": "/api/freelancer/projects/:id/bids/:bidId (employer)",
            "interviews": "/api/interviews[/:id] (employer)",
            "notifications": "/api/notifications[/read-all] (employer)",
            "settings": "/api/settings/profile|password|upload-image (employer)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::Database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "error": e.to_string()
            })),
        ),
    }
}
