use anyhow::Context;
use scm_api::{app, AppState};
use scm_core::allocator::IdFormat;
use scm_dispatch::{spawn_sync, DispatchOptions, DispatchService};
use scm_store::{app_config::Config, Backend, FonnteClient, GeminiEnhancer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scm_api=debug,scm_dispatch=debug,scm_store=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting SCM dispatch API on port {}", config.server.port);

    let backend = Backend::connect(&config.database)
        .await
        .context("Failed to open the store")?;
    let store_kind = if config.database.is_memory() { "memory" } else { "postgres" };

    let messaging = match backend.settings.load_settings().await {
        Ok(stored) => config.messaging.clone().overlay(&stored),
        Err(e) => {
            tracing::warn!("Could not load stored messaging settings: {}", e);
            config.messaging.clone()
        }
    };
    let messaging = Arc::new(RwLock::new(messaging));
    let gateway = Arc::new(FonnteClient::new(messaging.clone()));

    let options = DispatchOptions {
        ids: IdFormat::new(config.dispatch.id_prefix.clone(), config.dispatch.id_width),
        max_allocation_attempts: config.dispatch.max_allocation_attempts,
        bot_sender: config.messaging.sender.clone(),
    };
    let dispatch = Arc::new(DispatchService::new(
        backend.bookings.clone(),
        backend.notifications.clone(),
        gateway,
        options,
    ));

    let sync = spawn_sync(dispatch.clone(), backend.changes.subscribe());
    if let Err(e) = dispatch.refresh().await {
        tracing::error!("Initial load failed, serving an empty cache: {}", e);
    }

    let app_state = AppState {
        dispatch,
        enhancer: Arc::new(GeminiEnhancer::new(config.enhancer.clone())),
        settings: backend.settings.clone(),
        messaging,
        changes: backend.changes.clone(),
        store_kind,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    sync.abort();
    if let Some(feed) = backend.feed {
        feed.abort();
    }
    Ok(())
}
