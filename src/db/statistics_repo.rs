use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{common::error::AppError, models::statistics::Statistics};

#[derive(Clone)]
pub struct StatisticsRepository {
    pool: PgPool,
}

impl StatisticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Todos os contadores lidos na mesma transação (REPEATABLE READ) para um retrato consistente.
    pub async fn snapshot(&self) -> Result<Statistics, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let total_companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&mut *tx)
            .await?;

        let active_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;

        let new_registrations: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM companies WHERE created_at >= NOW() - INTERVAL '30 days'",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Statistics {
            total_companies,
            active_users,
            new_registrations,
            total_revenue: Decimal::ZERO,
        })
    }
}
