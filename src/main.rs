//! Civics Helper - guided chat wizard for short projects about U.S. acts
//!
//! A student picks an act and a project type, answers a few multiple-choice
//! questions from the model, and downloads the finished paragraph, comic
//! strip or skit.

mod api;
mod catalog;
mod config;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;

use api::{create_router, AppState};
use chrono::TimeDelta;
use config::AppConfig;
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civics_helper=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration; a missing credential stops startup here
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Configuration error");
        e
    })?;

    let service = OpenAIService::new(config.api_key.clone(), config.model.clone(), &config.base_url)?;
    let llm_client: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(service)));
    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        "Completion gateway configured"
    );

    let idle_timeout = TimeDelta::minutes(i64::from(config.session_idle_minutes));
    let sessions = Arc::new(SessionManager::new(llm_client).with_idle_timeout(idle_timeout));
    sessions.start_idle_sweeper();
    let state = AppState::new(sessions);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Civics helper listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
