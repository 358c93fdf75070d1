pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod enhancer;
pub mod errors;
pub mod events;
pub mod memory_repo;
pub mod notification_repo;
pub mod settings_repo;
pub mod whatsapp;

pub use app_config::Config;
pub use database::DbClient;
pub use enhancer::GeminiEnhancer;
pub use events::{ChangeFeed, ChangeSender};
pub use memory_repo::MemoryStore;
pub use whatsapp::{FonnteClient, SharedMessaging};

use scm_core::repository::{BookingRepository, NotificationRepository, SettingsRepository};
use scm_core::{CoreError, CoreResult};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::app_config::DatabaseConfig;
use crate::booking_repo::StoreBookingRepository;
use crate::notification_repo::StoreNotificationRepository;
use crate::settings_repo::StoreSettingsRepository;

/// Repositories plus the change channel they publish on.
pub struct Backend {
    pub bookings: Arc<dyn BookingRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub changes: ChangeSender,
    /// Postgres LISTEN task; `None` for the memory store.
    pub feed: Option<JoinHandle<()>>,
}

impl Backend {
    pub fn memory() -> Self {
        let changes = events::channel();
        let store = Arc::new(MemoryStore::new(changes.clone()));
        Self::from_memory(store, changes)
    }

    pub fn from_memory(store: Arc<MemoryStore>, changes: ChangeSender) -> Self {
        Self {
            bookings: store.clone(),
            notifications: store.clone(),
            settings: store,
            changes,
            feed: None,
        }
    }

    pub async fn connect(config: &DatabaseConfig) -> CoreResult<Self> {
        if config.is_memory() {
            info!("Using in-memory store");
            return Ok(Self::memory());
        }

        let db = DbClient::new(config).await.map_err(errors::classify)?;
        db.migrate()
            .await
            .map_err(|e| CoreError::SchemaError(e.to_string()))?;

        let changes = events::channel();
        let feed = ChangeFeed::new(db.pool.clone(), changes.clone()).spawn();
        info!("Connected to Postgres store");

        Ok(Self {
            bookings: Arc::new(StoreBookingRepository::new(db.pool.clone())),
            notifications: Arc::new(StoreNotificationRepository::new(db.pool.clone())),
            settings: Arc::new(StoreSettingsRepository::new(db.pool)),
            changes,
            feed: Some(feed),
        })
    }
}
