use async_trait::async_trait;
use scm_core::repository::SettingsRepository;
use scm_core::CoreResult;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::errors::classify;

pub struct StoreSettingsRepository {
    pool: PgPool,
}

impl StoreSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for StoreSettingsRepository {
    async fn load_settings(&self) -> CoreResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT setting_key, setting_value FROM app_settings")
                .fetch_all(&self.pool)
                .await
                .map_err(classify)?;

        Ok(rows.into_iter().collect())
    }

    async fn save_setting(&self, key: &str, value: &str) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO app_settings (setting_key, setting_value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (setting_key) DO UPDATE
            SET setting_value = EXCLUDED.setting_value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(())
    }
}
