use scm_shared::ChangeEvent;
use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::service::DispatchService;

/// Apply pushed changes to the service cache until the channel closes.
/// A lagging receiver falls back to a full pull.
pub fn spawn_sync(service: Arc<DispatchService>, mut changes: Receiver<ChangeEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(event) => {
                    let name = event.event_name();
                    let changed = service.apply_change(event).await;
                    debug!("Applied {} (changed: {})", name, changed);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Change feed lagged by {} events, refreshing", skipped);
                    if let Err(e) = service.refresh().await {
                        error!("Refresh after lag failed: {}", e);
                    }
                }
                Err(RecvError::Closed) => {
                    info!("Change feed closed, stopping cache sync");
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ScriptedGateway;
    use crate::service::DispatchOptions;
    use chrono::{NaiveDate, NaiveTime};
    use scm_core::repository::BookingRepository;
    use scm_shared::{BookingDraft, BookingId, BookingRequest, EquipmentType, RecordChange};
    use scm_store::{events, MemoryStore};
    use std::time::Duration;

    fn crane(id: &str) -> BookingRequest {
        BookingRequest::new(
            BookingId::from(id),
            BookingDraft {
                unit: EquipmentType::Crane,
                details: "Lift".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            },
        )
    }

    #[tokio::test]
    async fn test_lagged_receiver_falls_back_to_refresh() {
        let changes = events::channel();
        let rx = changes.subscribe();
        let store = Arc::new(MemoryStore::new(changes.clone()));
        let service = Arc::new(DispatchService::new(
            store.clone(),
            store.clone(),
            Arc::new(ScriptedGateway::new()),
            DispatchOptions::default(),
        ));

        store.insert_booking(&crane("REQ-00001")).await.unwrap();
        // Push the insert out of the channel so only a full pull can find it.
        for _ in 0..300 {
            changes
                .send(ChangeEvent::Bookings(RecordChange::Delete("REQ-09999".to_string())))
                .unwrap();
        }
        let handle = spawn_sync(service.clone(), rx);

        let mut seen = false;
        for _ in 0..50 {
            if service.bookings().await.len() == 1 {
                seen = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(seen);
        handle.abort();
    }

    #[tokio::test]
    async fn test_foreign_writes_reach_the_cache() {
        let changes = events::channel();
        let store = Arc::new(MemoryStore::new(changes.clone()));
        let service = Arc::new(DispatchService::new(
            store.clone(),
            store.clone(),
            Arc::new(ScriptedGateway::new()),
            DispatchOptions::default(),
        ));
        let handle = spawn_sync(service.clone(), changes.subscribe());

        let booking = crane("REQ-00001");
        store.insert_booking(&booking).await.unwrap();

        let mut seen = false;
        for _ in 0..50 {
            if service.bookings().await.len() == 1 {
                seen = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(seen);
        handle.abort();
    }
}
