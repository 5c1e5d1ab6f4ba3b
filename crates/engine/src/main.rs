use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use veracity_common::config::ProviderCredentials;
use veracity_engine::config;
use veracity_engine::llm::{LlmClient, ReasoningEngine};
use veracity_engine::prompts::Prompts;
use veracity_engine::routes::{self, AppState};
use veracity_engine::Pipeline;
use veracity_evidence::EvidenceCascade;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Veracity starting");

    // Load configuration; fail loudly on misconfiguration.
    let config_dir = std::env::var("VERACITY_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let engine_config = match config::load_config(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration, refusing to start");
            std::process::exit(1);
        }
    };
    let system = &engine_config.system;

    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus metrics recorder");
            std::process::exit(1);
        }
    };

    // Reasoning engine (optional; verification reports unavailable without it).
    let engine: Option<Arc<dyn ReasoningEngine>> =
        LlmClient::new(system.llm.clone(), system.retry.clone())
            .map(|client| Arc::new(client) as Arc<dyn ReasoningEngine>);
    match &engine {
        Some(e) => tracing::info!(engine = %e.describe(), "Reasoning engine configured"),
        None => tracing::warn!("No reasoning engine configured, analyses will fail verification"),
    }

    // Evidence providers share one connection pool; per-call timeouts are set per provider.
    let http = match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(system.evidence.timeout_seconds))
        .build()
    {
        Ok(http) => http,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };
    let credentials = ProviderCredentials::from_env();
    let cascade = EvidenceCascade::from_config(&http, &credentials, &system.evidence);
    tracing::info!(
        providers = ?cascade.available_providers(),
        "Evidence providers available"
    );

    let prompts = Prompts::with_overrides(&engine_config.prompts);
    let pipeline = Pipeline::new(engine, cascade, system, &prompts);

    let state = Arc::new(AppState {
        pipeline,
        metrics_handle,
    });
    let app = routes::router(state);

    let port: u16 = std::env::var("VERACITY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(system.server.port);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, port, "Failed to bind TCP listener");
            std::process::exit(1);
        }
    };

    tracing::info!(port = port, "Veracity listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "HTTP server error");
        std::process::exit(1);
    }
}
