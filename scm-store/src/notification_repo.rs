use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scm_core::repository::NotificationRepository;
use scm_core::CoreResult;
use scm_shared::{Correlation, Notification};
use sqlx::PgPool;

use crate::errors::classify;

const COLUMNS: &str = "id, request_id, sender, content, timestamp, is_system";

pub struct StoreNotificationRepository {
    pool: PgPool,
}

impl StoreNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct NotificationRow {
    id: String,
    request_id: String,
    sender: String,
    content: String,
    timestamp: DateTime<Utc>,
    is_system: bool,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            request_id: Correlation::from(row.request_id),
            sender: row.sender,
            content: row.content,
            timestamp: row.timestamp,
            is_system: row.is_system,
        }
    }
}

pub(crate) async fn fetch_notification(pool: &PgPool, id: &str) -> CoreResult<Option<Notification>> {
    let row: Option<NotificationRow> =
        sqlx::query_as(&format!("SELECT {} FROM notifications WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(classify)?;

    Ok(row.map(Notification::from))
}

#[async_trait]
impl NotificationRepository for StoreNotificationRepository {
    async fn list_notifications(&self) -> CoreResult<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM notifications ORDER BY timestamp DESC, id DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> CoreResult<Notification> {
        let row: NotificationRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO notifications (id, request_id, sender, content, timestamp, is_system)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(&notification.id)
        .bind(notification.request_id.to_string())
        .bind(&notification.sender)
        .bind(&notification.content)
        .bind(notification.timestamp)
        .bind(notification.is_system)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        Ok(row.into())
    }
}
