//! Process-local store used for `memory://` and in tests.
//!
//! Mirrors the Postgres semantics the dispatch core relies on: duplicate
//! identifiers are rejected, listings are newest first, and every mutation is
//! published on the change channel the way the database triggers would.

use async_trait::async_trait;
use scm_core::repository::{BookingRepository, NotificationRepository, SettingsRepository};
use scm_core::{CoreError, CoreResult};
use scm_shared::{BookingId, BookingRequest, ChangeEvent, Notification, RecordChange};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::events::ChangeSender;

pub struct MemoryStore {
    bookings: Mutex<HashMap<String, BookingRequest>>,
    notifications: Mutex<HashMap<String, Notification>>,
    settings: Mutex<HashMap<String, String>>,
    changes: ChangeSender,
    reachable: AtomicBool,
}

impl MemoryStore {
    pub fn new(changes: ChangeSender) -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
            notifications: Mutex::new(HashMap::new()),
            settings: Mutex::new(HashMap::new()),
            changes,
            reachable: AtomicBool::new(true),
        }
    }

    /// Simulate the store going away; every call fails with a connectivity error.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    fn check(&self) -> CoreResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::ConnectivityError("memory store offline".to_string()))
        }
    }

    fn publish(&self, event: ChangeEvent) {
        let _ = self.changes.send(event);
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn list_bookings(&self) -> CoreResult<Vec<BookingRequest>> {
        self.check()?;
        let mut out: Vec<BookingRequest> = self.bookings.lock().await.values().cloned().collect();
        out.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then_with(|| b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn get_booking(&self, id: &BookingId) -> CoreResult<Option<BookingRequest>> {
        self.check()?;
        Ok(self.bookings.lock().await.get(id.as_str()).cloned())
    }

    async fn insert_booking(&self, booking: &BookingRequest) -> CoreResult<BookingRequest> {
        self.check()?;
        {
            let mut bookings = self.bookings.lock().await;
            if bookings.contains_key(booking.id.as_str()) {
                return Err(CoreError::Conflict(format!("Booking {} already exists", booking.id)));
            }
            bookings.insert(booking.id.0.clone(), booking.clone());
        }
        self.publish(ChangeEvent::Bookings(RecordChange::Insert(booking.clone())));
        Ok(booking.clone())
    }

    async fn update_booking(&self, booking: &BookingRequest) -> CoreResult<BookingRequest> {
        self.check()?;
        let updated = {
            let mut bookings = self.bookings.lock().await;
            let Some(existing) = bookings.get_mut(booking.id.as_str()) else {
                return Err(CoreError::NotFound(format!("Booking {}", booking.id)));
            };
            // requested_at is owned by the store
            let requested_at = existing.requested_at;
            *existing = booking.clone();
            existing.requested_at = requested_at;
            existing.clone()
        };
        self.publish(ChangeEvent::Bookings(RecordChange::Update(updated.clone())));
        Ok(updated)
    }

    async fn delete_booking(&self, id: &BookingId) -> CoreResult<Option<u64>> {
        self.check()?;
        let cascaded: Vec<String> = {
            let mut bookings = self.bookings.lock().await;
            let mut notifications = self.notifications.lock().await;
            if bookings.remove(id.as_str()).is_none() {
                return Ok(None);
            }
            let keys: Vec<String> = notifications
                .values()
                .filter(|n| n.request_id.booking_id() == Some(id))
                .map(|n| n.id.clone())
                .collect();
            for key in &keys {
                notifications.remove(key);
            }
            keys
        };

        self.publish(ChangeEvent::Bookings(RecordChange::Delete(id.0.clone())));
        let count = cascaded.len() as u64;
        for key in cascaded {
            self.publish(ChangeEvent::Notifications(RecordChange::Delete(key)));
        }
        Ok(Some(count))
    }

    async fn ping(&self) -> CoreResult<()> {
        self.check()
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn list_notifications(&self) -> CoreResult<Vec<Notification>> {
        self.check()?;
        let mut out: Vec<Notification> = self.notifications.lock().await.values().cloned().collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn insert_notification(&self, notification: &Notification) -> CoreResult<Notification> {
        self.check()?;
        {
            let mut notifications = self.notifications.lock().await;
            if notifications.contains_key(&notification.id) {
                return Err(CoreError::Conflict(format!(
                    "Notification {} already exists",
                    notification.id
                )));
            }
            notifications.insert(notification.id.clone(), notification.clone());
        }
        self.publish(ChangeEvent::Notifications(RecordChange::Insert(notification.clone())));
        Ok(notification.clone())
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn load_settings(&self) -> CoreResult<HashMap<String, String>> {
        self.check()?;
        Ok(self.settings.lock().await.clone())
    }

    async fn save_setting(&self, key: &str, value: &str) -> CoreResult<()> {
        self.check()?;
        self.settings.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
