use sqlx::PgPool;

pub mod invoice;
pub mod notification_log;
pub mod setting;
pub mod tenant;

/// Postgres-backed implementation of every repository trait. A single pool
/// is shared between the HTTP handlers and the scheduler loops.
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
