//! AI Chatbot - single-page conversational web app
//!
//! Each browser session keeps an in-memory transcript; every submitted
//! message is answered by a hosted text-generation model.

mod api;
mod config;
mod llm;
mod runtime;
mod state_machine;
mod view;

use api::{create_router, AppState, ModelResponse, PageRenderer};
use config::AppConfig;
use runtime::{LlmModelClient, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
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
                .unwrap_or_else(|_| "ai_chatbot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    config::load_dotenv();
    let config = AppConfig::from_env()?;

    if !config.llm.has_token() {
        tracing::warn!(
            "No Hugging Face token configured. Set HUGGINGFACEHUB_API_TOKEN; model calls will likely fail."
        );
    }

    // Model client
    let service = llm::build_service(&config.llm)?;
    let client = Arc::new(LlmModelClient::new(service, config.llm.max_new_tokens));
    tracing::info!(
        model = %config.llm.model_id,
        max_new_tokens = config.llm.max_new_tokens,
        context_mode = %config.chat.context_mode,
        "Model client initialized"
    );

    // Create application state
    let sessions = Arc::new(
        SessionManager::new(config.chat.clone(), client).with_idle_timeout(config.session_idle),
    );
    sessions.spawn_sweeper();
    let pages = PageRenderer::new(config.page_title.clone(), sessions.model_id())?;
    let model = ModelResponse {
        model_id: sessions.model_id().to_string(),
        max_new_tokens: config.llm.max_new_tokens,
        context_mode: config.chat.context_mode,
    };
    let state = AppState::new(sessions, pages, model);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("AI Chatbot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
