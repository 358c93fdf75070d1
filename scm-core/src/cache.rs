//! Keyed local copy of the store, reconciled from mutation responses and
//! realtime pushes.
//!
//! Records are keyed by identifier, so a push for a record the client already
//! inserted itself is absorbed. Listing is always newest first.

use chrono::{DateTime, Utc};
use scm_shared::{BookingRequest, ChangeEvent, Notification, RecordChange};
use std::collections::HashMap;

pub trait Keyed {
    fn key(&self) -> &str;
    fn stamp(&self) -> DateTime<Utc>;
}

impl Keyed for BookingRequest {
    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn stamp(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

impl Keyed for Notification {
    fn key(&self) -> &str {
        &self.id
    }

    fn stamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone)]
pub struct KeyedCache<T> {
    records: HashMap<String, T>,
}

impl<T> Default for KeyedCache<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<T: Keyed + Clone> KeyedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything and load a fresh pull from the store.
    pub fn replace_all(&mut self, records: Vec<T>) {
        self.records = records
            .into_iter()
            .map(|record| (record.key().to_string(), record))
            .collect();
    }

    /// Insert unless the key is already present. Returns whether it was added.
    pub fn insert_new(&mut self, record: T) -> bool {
        if self.records.contains_key(record.key()) {
            return false;
        }
        self.records.insert(record.key().to_string(), record);
        true
    }

    pub fn upsert(&mut self, record: T) {
        self.records.insert(record.key().to_string(), record);
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.records.remove(key)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.records.retain(|_, record| keep(record));
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn newest_first(&self) -> Vec<T> {
        let mut out: Vec<T> = self.records.values().cloned().collect();
        out.sort_by(|a, b| b.stamp().cmp(&a.stamp()).then_with(|| b.key().cmp(a.key())));
        out
    }

    /// Reconcile one pushed change. Returns whether the cache changed.
    pub fn apply(&mut self, change: RecordChange<T>) -> bool {
        match change {
            RecordChange::Insert(record) => self.insert_new(record),
            RecordChange::Update(record) => {
                self.upsert(record);
                true
            }
            RecordChange::Delete(key) => self.remove(&key).is_some(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalCache {
    pub bookings: KeyedCache<BookingRequest>,
    pub notifications: KeyedCache<Notification>,
}

impl LocalCache {
    pub fn apply(&mut self, event: ChangeEvent) -> bool {
        match event {
            ChangeEvent::Bookings(change) => self.bookings.apply(change),
            ChangeEvent::Notifications(change) => self.notifications.apply(change),
        }
    }
}
