use serde::{Deserialize, Serialize};

use super::booking::BookingRequest;
use super::notification::Notification;

/// One row-level change as delivered by the realtime feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "record", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordChange<T> {
    Insert(T),
    Update(T),
    Delete(String),
}

impl<T> RecordChange<T> {
    pub fn op(&self) -> &'static str {
        match self {
            RecordChange::Insert(_) => "insert",
            RecordChange::Update(_) => "update",
            RecordChange::Delete(_) => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", content = "change", rename_all = "snake_case")]
pub enum ChangeEvent {
    Bookings(RecordChange<BookingRequest>),
    Notifications(RecordChange<Notification>),
}

impl ChangeEvent {
    /// SSE event name, e.g. `bookings.update`.
    pub fn event_name(&self) -> String {
        match self {
            ChangeEvent::Bookings(change) => format!("bookings.{}", change.op()),
            ChangeEvent::Notifications(change) => format!("notifications.{}", change.op()),
        }
    }
}
