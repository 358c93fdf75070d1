use chrono::{Local, NaiveDate};
use scm_core::allocator::IdFormat;
use scm_core::cache::LocalCache;
use scm_core::gateway::{MessageGateway, SendOutcome};
use scm_core::message::{self, Announcement};
use scm_core::repository::{BookingRepository, NotificationRepository};
use scm_core::schedule::{self, DaySchedule, StatusCount};
use scm_core::validation::validate_form;
use scm_core::{CoreError, CoreResult};
use scm_shared::models::notification::new_notification_id;
use scm_shared::{BookingForm, BookingRequest, ChangeEvent, Correlation, JobStatus, Notification};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Result of a mutation. The mutation is durable even when `warning` is set.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> Outcome<T> {
    pub fn new(data: T, warnings: Vec<String>) -> Self {
        let warning = if warnings.is_empty() {
            None
        } else {
            Some(warnings.join(" "))
        };
        Self { data, warning }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub ids: IdFormat,
    pub max_allocation_attempts: u32,
    /// Sender name on bot-generated notifications.
    pub bot_sender: String,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            ids: IdFormat::default(),
            max_allocation_attempts: 3,
            bot_sender: "SCM Bot".to_string(),
        }
    }
}

pub struct DispatchService {
    bookings: Arc<dyn BookingRepository>,
    notifications: Arc<dyn NotificationRepository>,
    gateway: Arc<dyn MessageGateway>,
    cache: RwLock<LocalCache>,
    options: DispatchOptions,
}

impl DispatchService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        notifications: Arc<dyn NotificationRepository>,
        gateway: Arc<dyn MessageGateway>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            bookings,
            notifications,
            gateway,
            cache: RwLock::new(LocalCache::default()),
            options,
        }
    }

    pub fn ids(&self) -> &IdFormat {
        &self.options.ids
    }

    /// Pull both tables from the store. On failure the cache is left as it was.
    pub async fn refresh(&self) -> CoreResult<()> {
        let bookings = self.bookings.list_bookings().await?;
        let notifications = self.notifications.list_notifications().await?;

        let mut cache = self.cache.write().await;
        info!(
            "Refreshed cache: {} bookings, {} notifications",
            bookings.len(),
            notifications.len()
        );
        cache.bookings.replace_all(bookings);
        cache.notifications.replace_all(notifications);
        Ok(())
    }

    /// Reconcile one pushed change into the cache.
    pub async fn apply_change(&self, event: ChangeEvent) -> bool {
        self.cache.write().await.apply(event)
    }

    pub async fn bookings(&self) -> Vec<BookingRequest> {
        self.cache.read().await.bookings.newest_first()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.cache.read().await.notifications.newest_first()
    }

    /// Look a booking up by any spelling of its identifier, cache first.
    ///
    /// An exact or canonical match wins. Among legacy ids sharing the same
    /// number, the lowest identifier is taken.
    pub async fn find(&self, raw: &str) -> CoreResult<Option<BookingRequest>> {
        let wanted = raw.trim().to_uppercase();
        let canonical = self.options.ids.canonicalize(&wanted);
        {
            let cache = self.cache.read().await;
            let exact = cache
                .bookings
                .get(&wanted)
                .or_else(|| canonical.as_ref().and_then(|id| cache.bookings.get(id.as_str())));
            if let Some(found) = exact {
                return Ok(Some(found.clone()));
            }
            if let Some(number) = self.options.ids.suffix(&wanted) {
                let found = cache
                    .bookings
                    .values()
                    .filter(|b| self.options.ids.suffix(b.id.as_str()) == Some(number))
                    .min_by(|a, b| a.id.cmp(&b.id));
                if let Some(found) = found {
                    return Ok(Some(found.clone()));
                }
            }
        }

        let Some(canonical) = canonical else {
            return Ok(None);
        };
        let fetched = self.bookings.get_booking(&canonical).await?;
        if let Some(booking) = &fetched {
            self.cache.write().await.bookings.upsert(booking.clone());
        }
        Ok(fetched)
    }

    pub async fn booking(&self, raw: &str) -> CoreResult<BookingRequest> {
        self.find(raw)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Booking {}", raw.trim())))
    }

    pub async fn create_booking(&self, form: &BookingForm) -> CoreResult<Outcome<BookingRequest>> {
        let draft = validate_form(form)?;
        let wa_message_id = new_notification_id("WA");

        let mut attempt: u32 = 0;
        let saved = loop {
            attempt += 1;
            let id = {
                let cache = self.cache.read().await;
                self.options.ids.next_id(cache.bookings.values().map(|b| &b.id))
            };
            let mut booking = BookingRequest::new(id, draft.clone());
            booking.wa_message_id = Some(wa_message_id.clone());

            match self.bookings.insert_booking(&booking).await {
                Ok(saved) => break saved,
                Err(CoreError::Conflict(reason)) if attempt < self.options.max_allocation_attempts => {
                    warn!(
                        "Identifier {} taken ({}), refreshing and re-allocating (attempt {})",
                        booking.id, reason, attempt
                    );
                    self.refresh().await?;
                }
                Err(CoreError::Conflict(reason)) => {
                    error!("Giving up on identifier allocation after {} attempts", attempt);
                    return Err(CoreError::Conflict(reason));
                }
                Err(e) => return Err(e),
            }
        };

        self.cache.write().await.bookings.upsert(saved.clone());
        info!("Booking {} created for {} on {}", saved.id, saved.unit, saved.date);

        let text = message::announcement(Announcement::NewBooking, &saved);
        let warnings = self
            .announce(wa_message_id, Correlation::Booking(saved.id.clone()), text)
            .await;
        Ok(Outcome::new(saved, warnings))
    }

    /// Change request: replace the editable fields of an open booking.
    pub async fn update_booking(&self, raw_id: &str, form: &BookingForm) -> CoreResult<Outcome<BookingRequest>> {
        let mut booking = self.booking(raw_id).await?;
        if booking.status.is_closed() {
            return Err(CoreError::ValidationError(format!(
                "Request {} is already closed and cannot be changed",
                booking.id
            )));
        }
        let draft = validate_form(form)?;
        booking.apply_draft(draft);

        let saved = self.bookings.update_booking(&booking).await?;
        self.cache.write().await.bookings.upsert(saved.clone());
        info!("Booking {} updated", saved.id);

        let text = message::announcement(Announcement::Updated, &saved);
        let warnings = self
            .announce(new_notification_id("WA"), Correlation::Booking(saved.id.clone()), text)
            .await;
        Ok(Outcome::new(saved, warnings))
    }

    pub async fn set_status(&self, raw_id: &str, status: &str) -> CoreResult<Outcome<BookingRequest>> {
        let status: JobStatus = status.parse()?;
        let booking = self.booking(raw_id).await?;
        let saved = self.change_status(booking, status).await?;

        let text = message::status_changed(&saved.id, status);
        let warnings = self
            .announce(new_notification_id("SYS"), Correlation::Booking(saved.id.clone()), text)
            .await;
        Ok(Outcome::new(saved, warnings))
    }

    pub async fn delete_booking(&self, raw_id: &str) -> CoreResult<Outcome<BookingRequest>> {
        let booking = self.booking(raw_id).await?;
        self.remove(&booking).await?;

        let text = message::deleted(&booking.id);
        let warnings = self
            .announce(new_notification_id("SYS"), Correlation::System, text)
            .await;
        Ok(Outcome::new(booking, warnings))
    }

    pub async fn dashboard(&self) -> Vec<StatusCount> {
        schedule::status_summary(&self.bookings().await)
    }

    pub async fn schedule(&self, date: NaiveDate) -> DaySchedule {
        schedule::day_schedule(&self.bookings().await, date, Local::now().naive_local())
    }

    pub async fn test_gateway(&self) -> SendOutcome {
        self.gateway.send(&message::connection_test()).await
    }

    pub async fn ping_store(&self) -> CoreResult<()> {
        self.bookings.ping().await
    }

    /// Persist a status change. A booking the store no longer has is dropped
    /// from the cache before `NotFound` is returned.
    pub(crate) async fn change_status(&self, mut booking: BookingRequest, status: JobStatus) -> CoreResult<BookingRequest> {
        booking.status = status;
        let saved = match self.bookings.update_booking(&booking).await {
            Ok(saved) => saved,
            Err(CoreError::NotFound(reason)) => {
                self.cache.write().await.bookings.remove(booking.id.as_str());
                return Err(CoreError::NotFound(reason));
            }
            Err(e) => return Err(e),
        };
        self.cache.write().await.bookings.upsert(saved.clone());
        info!("Booking {} moved to {}", saved.id, status);
        Ok(saved)
    }

    /// Delete a booking and its correlated notifications. Closed bookings stay.
    pub(crate) async fn remove(&self, booking: &BookingRequest) -> CoreResult<()> {
        if booking.status.is_closed() {
            return Err(CoreError::ValidationError(message::closed_cannot_delete(&booking.id)));
        }
        let deleted = self.bookings.delete_booking(&booking.id).await?;

        let mut cache = self.cache.write().await;
        cache.bookings.remove(booking.id.as_str());
        let Some(cascaded) = deleted else {
            return Err(CoreError::NotFound(format!("Booking {}", booking.id)));
        };
        cache.notifications.retain(|n| n.request_id.booking_id() != Some(&booking.id));
        info!("Booking {} deleted with {} notifications", booking.id, cascaded);
        Ok(())
    }

    pub(crate) async fn store_note(&self, notification: Notification) -> CoreResult<Notification> {
        let saved = self.notifications.insert_notification(&notification).await?;
        self.cache.write().await.notifications.upsert(saved.clone());
        Ok(saved)
    }

    /// Store a notification. Failure is returned as a warning, not an error.
    pub(crate) async fn record(&self, notification: Notification) -> Result<Notification, String> {
        let id = notification.id.clone();
        self.store_note(notification).await.map_err(|e| {
            error!("Failed to store notification {}: {}", id, e);
            format!("Saved, but the chat log entry was not stored: {}", e)
        })
    }

    pub(crate) fn bot_note(&self, id: String, request_id: Correlation, content: String) -> Notification {
        Notification::system(id, request_id, &self.options.bot_sender, content)
    }

    /// Send `text` to the group. Returns a warning if it did not go out.
    pub(crate) async fn forward(&self, text: &str) -> Option<String> {
        let warning = self.gateway.send(text).await.warning();
        if let Some(warning) = &warning {
            warn!("{}", warning);
        }
        warning
    }

    /// Send `text` to the group and log it in the chat. Returns warnings.
    pub(crate) async fn announce(&self, id: String, request_id: Correlation, text: String) -> Vec<String> {
        let mut warnings: Vec<String> = self.forward(&text).await.into_iter().collect();
        if let Err(warning) = self.record(self.bot_note(id, request_id, text)).await {
            warnings.push(warning);
        }
        warnings
    }
}
