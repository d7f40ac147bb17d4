use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use solace::api::{create_router, AppState};
use solace::classifier::ClassifierProvider;
use solace::config::Config;
use solace::db::{Database, DatabaseBackend, LibSqlBackend};
use solace::identity::IdentityProvider;
use solace::llm::LlmProvider;
use solace::services::{AdviceJobManager, ClassificationManager};

#[derive(Parser)]
#[command(name = "solace")]
#[command(about = "Self-hostable journaling backend with emotion-aware advice")]
struct Args {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solace=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

    let identity = IdentityProvider::new(&config.auth);
    if !identity.is_available() {
        tracing::warn!(
            "No identity provider configured — all protected routes are locked. \
             Set AUTH_USERINFO_URL or AUTH_DEV_TOKENS."
        );
    }

    let classifier = ClassifierProvider::new(config.classifier.as_ref());
    if !classifier.is_available() {
        tracing::warn!(
            "Classifier unavailable — notes will settle to the neutral fallback vector"
        );
    }

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - memory summaries and advice generation are disabled");
    }

    let state = AppState::new(config.clone(), db, classifier.clone(), llm, identity);

    let cancel_token = CancellationToken::new();

    tracing::info!("Starting classification manager...");
    let manager = ClassificationManager::new(
        state.db.clone(),
        classifier,
        state.llm.clone(),
        &state.config.pipeline,
    );
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Classification manager shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(manager.interval_secs())) => {
                    if let Err(e) = manager.run_once().await {
                        tracing::error!("Classification manager error: {}", e);
                    }
                }
            }
        }
    });

    tracing::info!("Starting advice job manager...");
    let job_manager = AdviceJobManager::new(
        state.db.clone(),
        state.advice.clone(),
        &state.config.pipeline,
    );
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Advice job manager shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(job_manager.interval_secs())) => {
                    if let Err(e) = job_manager.run_once().await {
                        tracing::error!("Advice job manager error: {}", e);
                    }
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Solace starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
