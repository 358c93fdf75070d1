//! Realtime change feed.
//!
//! Postgres triggers publish `{table, op, id}` on the `scm_changes` channel.
//! The feed task resolves each notice to the full record and fans it out on a
//! broadcast channel shared by the cache synchronizer and SSE clients.

use scm_core::CoreResult;
use scm_shared::{ChangeEvent, RecordChange};
use serde::Deserialize;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::booking_repo::fetch_booking;
use crate::notification_repo::fetch_notification;

pub const CHANNEL: &str = "scm_changes";
const CAPACITY: usize = 256;

pub type ChangeSender = broadcast::Sender<ChangeEvent>;

pub fn channel() -> ChangeSender {
    let (tx, _rx) = broadcast::channel(CAPACITY);
    tx
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeNotice {
    pub table: String,
    pub op: String,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Bookings,
    Notifications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Insert,
    Update,
    Delete,
}

impl ChangeNotice {
    fn kind(&self) -> Option<(Table, Op)> {
        let table = match self.table.as_str() {
            "bookings" => Table::Bookings,
            "notifications" => Table::Notifications,
            _ => return None,
        };
        let op = match self.op.to_ascii_uppercase().as_str() {
            "INSERT" => Op::Insert,
            "UPDATE" => Op::Update,
            "DELETE" => Op::Delete,
            _ => return None,
        };
        Some((table, op))
    }
}

pub struct ChangeFeed {
    pool: PgPool,
    sender: ChangeSender,
}

impl ChangeFeed {
    pub fn new(pool: PgPool, sender: ChangeSender) -> Self {
        Self { pool, sender }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        loop {
            match self.listen().await {
                Ok(()) => return,
                Err(e) => {
                    error!("Change feed interrupted: {}. Reconnecting in 2s.", e);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    async fn listen(&self) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANNEL).await?;
        info!("Listening for changes on '{}'", CHANNEL);

        loop {
            let notification = listener.recv().await?;
            let notice: ChangeNotice = match serde_json::from_str(notification.payload()) {
                Ok(notice) => notice,
                Err(e) => {
                    warn!("Ignoring malformed change notice: {}", e);
                    continue;
                }
            };

            match self.resolve(&notice).await {
                Ok(Some(event)) => {
                    debug!("Change {}:{}", event.event_name(), notice.id);
                    // No subscribers is fine; the next one starts from a refresh.
                    let _ = self.sender.send(event);
                }
                Ok(None) => debug!("Change notice {:?} skipped", notice),
                Err(e) => warn!("Failed to resolve change {:?}: {}", notice, e),
            }
        }
    }

    async fn resolve(&self, notice: &ChangeNotice) -> CoreResult<Option<ChangeEvent>> {
        let Some((table, op)) = notice.kind() else {
            return Ok(None);
        };

        let event = match (table, op) {
            (Table::Bookings, Op::Delete) => {
                Some(ChangeEvent::Bookings(RecordChange::Delete(notice.id.clone())))
            }
            (Table::Notifications, Op::Delete) => {
                Some(ChangeEvent::Notifications(RecordChange::Delete(notice.id.clone())))
            }
            (Table::Bookings, op) => fetch_booking(&self.pool, &notice.id).await?.map(|record| {
                ChangeEvent::Bookings(if op == Op::Insert {
                    RecordChange::Insert(record)
                } else {
                    RecordChange::Update(record)
                })
            }),
            (Table::Notifications, op) => {
                fetch_notification(&self.pool, &notice.id).await?.map(|record| {
                    ChangeEvent::Notifications(if op == Op::Insert {
                        RecordChange::Insert(record)
                    } else {
                        RecordChange::Update(record)
                    })
                })
            }
        };

        Ok(event)
    }
}
