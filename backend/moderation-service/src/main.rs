use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moderation_service::config::Config;
use moderation_service::db::{MemoryStore, ModerationStore, PgStore};
use moderation_service::services::{
    AccessPolicy, AllowList, EnvAllowList, ModerationPipeline, PerspectiveClassifier,
};
use moderation_service::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "moderation_service=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Configuration loaded successfully");

    let store: Arc<dyn ModerationStore> = if config.database.is_memory() {
        tracing::warn!("Using in-memory store; data is lost on restart");
        Arc::new(MemoryStore::new())
    } else {
        let store = PgStore::connect(&config.database).await?;
        tracing::info!("Database connection established");
        Arc::new(store)
    };

    let access: Arc<dyn AccessPolicy> = if config.access.reload_from_env {
        Arc::new(EnvAllowList::default())
    } else {
        Arc::new(AllowList::from_csv(
            &config.access.admin_emails,
            &config.access.allowed_domains,
        ))
    };

    if config.classifier.api_key.is_none() {
        tracing::warn!("Classifier API key not set; all content will be published unreviewed");
    }
    let pipeline = ModerationPipeline::new(
        Arc::new(PerspectiveClassifier::from_config(&config.classifier)),
        config.classifier.threshold,
        Duration::from_millis(config.classifier.timeout_ms),
    );

    tracing::info!(
        decision_policy = ?config.moderation.decision_policy,
        threshold = config.classifier.threshold,
        "Moderation configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        store,
        pipeline,
        access,
        config: Arc::new(config),
    };

    // Start server
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
