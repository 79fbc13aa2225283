//! ClauseCheck API server
//!
//! Accepts contract uploads (PDF or plain text), runs the clause risk
//! pipeline, and returns a plain-language risk report. Endpoints:
//!
//! - Health check
//! - Clause category listing
//! - Document analysis (multipart upload or raw text)
//!
//! ## Architecture
//!
//! The server is thin plumbing around the risk-engine crate: extraction and
//! summarization are the only external collaborators, and only the
//! summarization call leaves the process. Detection and scoring run on the
//! blocking pool while the summarizer call (if configured) runs alongside
//! them under a bounded timeout.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod extract;
mod summarize;

use api::{handle_analyze, handle_analyze_text, handle_health, handle_list_categories};
use risk_engine::RiskEngine;
use summarize::HttpSummarizer;

/// Command-line arguments for the ClauseCheck server
#[derive(Parser, Debug)]
#[command(name = "clausecheck-server")]
#[command(about = "ClauseCheck server for contract clause risk analysis")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8003")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Summarization timeout in milliseconds
    #[arg(long, default_value = "8000")]
    summary_timeout_ms: u64,

    /// Summarization endpoint (OpenAI-compatible chat completions)
    #[arg(long, default_value = "https://api.groq.com/openai/v1/chat/completions")]
    summary_url: String,

    /// Summarization model name
    #[arg(long, default_value = "llama-3.3-70b-versatile")]
    summary_model: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RiskEngine>,
    /// Absent when no API key is configured; analysis then proceeds with
    /// `summary: null`.
    pub summarizer: Option<Arc<HttpSummarizer>>,
    pub summary_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ClauseCheck server on {}:{}", args.host, args.port);

    // A malformed taxonomy is a configuration error: fail now, not per request.
    let engine = Arc::new(RiskEngine::new()?);
    info!("Loaded {} clause categories", engine.taxonomy().len());

    let summarizer = match std::env::var("SUMMARIZER_API_KEY") {
        Ok(key) if !key.is_empty() => Some(Arc::new(HttpSummarizer::new(
            args.summary_url.clone(),
            args.summary_model.clone(),
            key,
        ))),
        _ => {
            info!("SUMMARIZER_API_KEY not set; reports will omit the summary");
            None
        }
    };

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .expect("Failed to create rate limiter config"),
    );

    let state = AppState {
        engine,
        summarizer,
        summary_timeout_ms: args.summary_timeout_ms,
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/categories", get(handle_list_categories))
        .route("/api/analyze", post(handle_analyze))
        .route("/api/analyze-text", post(handle_analyze_text))
        // Apply middleware
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Summarization timeout: {}ms", args.summary_timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}
