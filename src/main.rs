use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use pubg_coach_backend::api::{self, AppState};
use pubg_coach_backend::config::Config;
use pubg_coach_backend::llm::LlmClient;
use pubg_coach_backend::metrics;
use pubg_coach_backend::stats::StatsClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    metrics::register_metrics();

    let state = AppState {
        stats: Arc::new(StatsClient::new(&config)),
        llm: Arc::new(LlmClient::from_config(&config.llm)),
        config: Arc::new(config.clone()),
    };

    let mut app = api::router(state);
    if let Some(dir) = &config.static_dir {
        tracing::info!("Serving static files from {}", dir.display());
        app = app.nest_service("/static", ServeDir::new(dir));
    }
    let app = app.layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("PUBG coach backend listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
