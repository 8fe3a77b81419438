use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::ledger::TenantDirectoryTrait,
    domain::entities::tenant::TenantProfile,
};

fn row_to_tenant(row: sqlx::postgres::PgRow) -> TenantProfile {
    TenantProfile {
        id: row.get("id"),
        name: row.get("name"),
        unit_name: row.get("unit_name"),
        phone_number: row.get("phone_number"),
        bandwidth_limit_kbps: row.get("bandwidth_limit_kbps"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TenantDirectoryTrait for PostgresPersistence {
    async fn list_ids(&self) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM tenants ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(ids)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<TenantProfile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, unit_name, phone_number, bandwidth_limit_kbps, is_active, created_at
            FROM tenants WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_tenant))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<bool> {
        // Conditional flip: rows_affected tells the caller whether the flag
        // actually changed, which gates the one-time notices.
        let result = sqlx::query("UPDATE tenants SET is_active = $2 WHERE id = $1 AND is_active <> $2")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected() == 1)
    }
}
