pub mod assistant;
pub mod commands;
pub mod compare;
pub mod core;
pub mod diff;
pub mod parser;
pub mod providers;
pub mod security;
pub mod session;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::assistant::DocumentAssistant;
use crate::compare::{ComparisonOrchestrator, NarrativeSummarizer};
use crate::core::config::AppConfig;
use crate::core::types::Provider;
use crate::diff::DiffOptions;
use crate::providers::gemini::GeminiClient;
use crate::providers::LlmProvider;
use crate::security::Authorizer;
use crate::session::{InMemorySessionStore, SessionStore};

fn log_filter(level: &str) -> EnvFilter {
    let level = match level {
        "trace" | "debug" | "warn" | "error" => level,
        _ => "info",
    };
    EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orchestrator: ComparisonOrchestrator,
    pub assistant: DocumentAssistant,
    pub sessions: Arc<dyn SessionStore>,
    pub authorizer: Authorizer,
}

/// Wires the services around one provider and a fresh session store.
pub fn build_state(config: AppConfig, provider: Arc<dyn LlmProvider>) -> AppState {
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(config.session_ttl));
    let summarizer = NarrativeSummarizer::new(provider.clone(), config.provider_timeout);
    let orchestrator = ComparisonOrchestrator::new(
        summarizer,
        sessions.clone(),
        DiffOptions {
            max_lines: config.max_diff_lines,
            ..DiffOptions::default()
        },
    );
    let assistant = DocumentAssistant::new(provider, sessions.clone(), config.provider_timeout);
    let authorizer = Authorizer::new(config.api_token.clone());

    AppState {
        config: Arc::new(config),
        orchestrator,
        assistant,
        sessions,
        authorizer,
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let protected = Router::new()
        .route("/compare", post(commands::compare::compare_documents))
        .route("/documents", post(commands::documents::upload_document))
        .route("/ask", post(commands::assistant::ask))
        .route("/summarize", post(commands::assistant::summarize))
        .route("/suggestions", post(commands::assistant::suggestions))
        .route("/explain", post(commands::assistant::explain))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            security::auth::require_token,
        ));

    Router::new()
        .route("/health", get(commands::health::health))
        .merge(protected)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.log_level))
        .try_init();

    let api_key = security::keyring::resolve_provider_key(Provider::Gemini, config.gemini_api_key.clone());
    let gemini = GeminiClient::new(config.gemini_model.clone(), api_key, config.provider_timeout)?;
    if !gemini.has_credentials() {
        warn!("no Gemini API key configured; narratives will use the offline summary");
    }

    let bind = config.bind;
    let model = gemini.model().to_string();
    let state = build_state(config, Arc::new(gemini));
    if !state.authorizer.is_enabled() {
        warn!("DOCBOT_API_TOKEN is not set; requests are not authenticated");
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, model = %model, "docbot listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
