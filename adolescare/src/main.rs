use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adolescare::api::{create_router, AppState};
use adolescare::cache::JsonFileCache;
use adolescare::config::Config;
use adolescare::embeddings::EmbeddingProvider;
use adolescare::index::VectorIndex;
use adolescare::llm::LlmProvider;
use adolescare::processing::DocumentLoader;
use adolescare::rag::{Answerer, RetrievalMode, RetrievalQa};

#[derive(Parser)]
#[command(name = "adolescare")]
#[command(about = "RAG question answering over adolescent reproductive-health documents")]
struct Args {
    /// Re-embed the documents even if a persisted index exists
    #[arg(long)]
    rebuild_index: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adolescare=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Loading embedding model: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    let loader = DocumentLoader::new(&config.documents)?;
    let index = VectorIndex::load_or_build(
        Path::new(&config.index.path),
        &embeddings,
        &loader,
        args.rebuild_index,
    )
    .await?;
    let index = Arc::new(index);

    tracing::info!("Initializing LLM provider: {}...", config.llm.model);
    let llm = LlmProvider::new(&config.llm);
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - /chat, /todays-tip and /insights will return 503");
    }

    let qa: Arc<dyn Answerer> = Arc::new(RetrievalQa::new(
        index.clone(),
        embeddings,
        llm.clone(),
        RetrievalMode::from_config(&config.index),
        &config.llm,
    ));

    let tip_cache = JsonFileCache::load(&config.cache.tips_path).await?;
    let insight_cache = JsonFileCache::load(&config.cache.insights_path).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(&config, index, llm, qa, tip_cache, insight_cache);
    let app = create_router(state);

    tracing::info!("Adolescare starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
