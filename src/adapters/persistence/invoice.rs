use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::ledger::{
        InsertOutcome, InvoiceProfile, InvoiceRepoTrait, NewInvoice,
    },
    domain::entities::gateway_method::GatewayMethod,
};

const SELECT_COLS: &str = r#"
    id, tenant_id, amount, period_month, period_year, due_date, status,
    paid_at, gateway_order_id, gateway_method, gateway_expires_at, notes, created_at
"#;

fn row_to_invoice(row: sqlx::postgres::PgRow) -> InvoiceProfile {
    InvoiceProfile {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        amount: row.get("amount"),
        period_month: row.get::<i32, _>("period_month") as u32,
        period_year: row.get("period_year"),
        due_date: row.get("due_date"),
        status: row.get("status"),
        paid_at: row.get("paid_at"),
        gateway_order_id: row.get("gateway_order_id"),
        gateway_method: row.get("gateway_method"),
        gateway_expires_at: row.get("gateway_expires_at"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl InvoiceRepoTrait for PostgresPersistence {
    async fn insert_if_absent(&self, input: &NewInvoice) -> AppResult<InsertOutcome> {
        let id = Uuid::new_v4();

        // ON CONFLICT DO NOTHING against the unique (tenant, period) key is
        // the only legal creation path; with RETURNING, a missing row tells
        // the losing caller "already exists" instead of raising an error.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO invoices (id, tenant_id, amount, period_month, period_year, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            ON CONFLICT (tenant_id, period_month, period_year) DO NOTHING
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(input.tenant_id)
        .bind(input.amount)
        .bind(input.period.month as i32)
        .bind(input.period.year)
        .bind(input.due_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(match row {
            Some(row) => InsertOutcome::Created(row_to_invoice(row)),
            None => InsertOutcome::AlreadyExists,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<InvoiceProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_invoice))
    }

    async fn get_by_order_id(&self, order_id: &str) -> AppResult<Option<InvoiceProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE gateway_order_id = $1",
            SELECT_COLS
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(row_to_invoice))
    }

    async fn list_pending(&self) -> AppResult<Vec<InvoiceProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE status = 'pending' ORDER BY due_date",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_invoice).collect())
    }

    async fn list_enforceable(&self, today: NaiveDate) -> AppResult<Vec<InvoiceProfile>> {
        // Strictly past due; the due date itself is never overdue. Overdue
        // rows are included so the sweep can re-derive the tenant flag.
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM invoices
            WHERE status IN ('pending', 'overdue') AND due_date < $1
            ORDER BY due_date
            "#,
            SELECT_COLS
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows.into_iter().map(row_to_invoice).collect())
    }

    async fn mark_overdue(&self, id: Uuid) -> AppResult<bool> {
        // Conditional on the expected status so a concurrent settlement can
        // never be clobbered back to overdue.
        let result = sqlx::query(
            "UPDATE invoices SET status = 'overdue' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        paid_at: NaiveDateTime,
        method: Option<GatewayMethod>,
        note: &str,
    ) -> AppResult<bool> {
        // Paid is terminal: the guard makes replays observable as a lost
        // race instead of double-applying the settlement.
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = 'paid',
                paid_at = $2,
                gateway_method = COALESCE($3, gateway_method),
                notes = $4
            WHERE id = $1 AND status <> 'paid'
            "#,
        )
        .bind(id)
        .bind(paid_at)
        .bind(method)
        .bind(note)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_gateway_order(
        &self,
        id: Uuid,
        order_id: &str,
        method: GatewayMethod,
        expires_at: Option<NaiveDateTime>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE invoices SET
                gateway_order_id = $2,
                gateway_method = $3,
                gateway_expires_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(order_id)
        .bind(method)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(())
    }
}
