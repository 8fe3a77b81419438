use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::ledger::NotificationLogTrait,
    domain::entities::notification_kind::NotificationKind,
};

#[async_trait]
impl NotificationLogTrait for PostgresPersistence {
    async fn append(
        &self,
        tenant_id: Uuid,
        kind: NotificationKind,
        message: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notification_log (id, tenant_id, kind, message) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(kind)
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(())
    }

    async fn sent_on(
        &self,
        tenant_id: Uuid,
        kind: NotificationKind,
        date: NaiveDate,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notification_log
                WHERE tenant_id = $1 AND kind = $2 AND sent_at::date = $3
            )
            "#,
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(exists)
    }
}
