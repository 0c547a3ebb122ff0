use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_server::http;
use shared::assistant::GeminiAssistant;
use shared::config::{ApiConfig, ApiKeyStatus, load_dotenv};
use shared::llm::GeminiGatewayConfig;
use shared::repos::{RecordStore, SupabaseStore};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let dotenv_result = load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("api_server=debug,shared=info,axum=info")),
        )
        .init();

    if let Err(err) = dotenv_result {
        error!("{err}");
        std::process::exit(1);
    }

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let api_key_status = ApiKeyStatus::from_env();
    let gemini_config = match GeminiGatewayConfig::from_env() {
        Ok(gemini_config) => gemini_config,
        Err(err) => {
            error!("failed to read gemini config: {err}");
            std::process::exit(1);
        }
    };
    match gemini_config.as_ref() {
        Some(gemini_config) => info!(model = %gemini_config.model, "assistant backend configured"),
        None => warn!(
            empty = api_key_status.empty,
            placeholder = api_key_status.placeholder,
            "assistant backend not configured; chat answers with the FAQ notice"
        ),
    }

    let assistant = match GeminiAssistant::from_config(gemini_config) {
        Ok(assistant) => assistant.with_overall_deadline(Duration::from_millis(
            config.assistant_overall_deadline_ms,
        )),
        Err(err) => {
            error!("failed to build assistant client: {err}");
            std::process::exit(1);
        }
    };

    let store: Option<Arc<dyn RecordStore>> = match config.supabase.as_ref() {
        Some(settings) => match SupabaseStore::new(settings) {
            Ok(store) => Some(Arc::new(store)),
            Err(err) => {
                error!("failed to build record store client: {err}");
                std::process::exit(1);
            }
        },
        None => {
            warn!("record store not configured; community endpoints disabled");
            None
        }
    };

    let app = http::build_router(http::AppState::new(
        Arc::new(assistant),
        api_key_status,
        store,
    ));

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(bind_addr = %config.bind_addr, "invalid API_BIND_ADDR: {err}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server stopped with error: {err}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
