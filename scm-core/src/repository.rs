use async_trait::async_trait;
use scm_shared::{BookingId, BookingRequest, Notification};
use std::collections::HashMap;

use crate::CoreResult;

/// CRUD over the `bookings` table.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// All bookings, newest `requested_at` first.
    async fn list_bookings(&self) -> CoreResult<Vec<BookingRequest>>;

    async fn get_booking(&self, id: &BookingId) -> CoreResult<Option<BookingRequest>>;

    /// Fails with `Conflict` when the identifier is already taken.
    async fn insert_booking(&self, booking: &BookingRequest) -> CoreResult<BookingRequest>;

    /// Fails with `NotFound` when no row has this identifier.
    async fn update_booking(&self, booking: &BookingRequest) -> CoreResult<BookingRequest>;

    /// Delete a booking together with its correlated notifications, all or
    /// nothing. Returns how many notifications went with it, or `None` when
    /// no row has this identifier.
    async fn delete_booking(&self, id: &BookingId) -> CoreResult<Option<u64>>;

    /// Cheap round trip used by the connection test.
    async fn ping(&self) -> CoreResult<()>;
}

/// Append-only access to the `notifications` table.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// All notifications, newest `timestamp` first.
    async fn list_notifications(&self) -> CoreResult<Vec<Notification>>;

    async fn insert_notification(&self, notification: &Notification) -> CoreResult<Notification>;
}

/// Key/value settings edited at runtime (messaging token and target).
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load_settings(&self) -> CoreResult<HashMap<String, String>>;

    async fn save_setting(&self, key: &str, value: &str) -> CoreResult<()>;
}
