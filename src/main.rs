use hirelink_api::database::Database;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, HIRELINK_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = hirelink_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting HireLink employer API in {:?} mode", config.environment);

    let app = hirelink_api::app::app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("HIRELINK_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("HireLink employer API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server");

    // The pool connects lazily on first use; release it on the way out.
    Database::close().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown signal handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
