use sqlx::PgPool;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{like_pattern, limit_offset},
    models::certificate::{Certificate, CertificatePayload},
};

#[derive(Clone)]
pub struct CertificateRepository {
    pool: PgPool,
}

impl CertificateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Certificate>, AppError> {
        let certificate = sqlx::query_as::<_, Certificate>("SELECT * FROM certificates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(certificate)
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Certificate>, AppError> {
        let certificates =
            sqlx::query_as::<_, Certificate>("SELECT * FROM certificates WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(certificates)
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Option<PageRequest>,
    ) -> Result<(Vec<Certificate>, i64), AppError> {
        let pattern = search.map(like_pattern);
        let (limit, offset) = limit_offset(page);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM certificates WHERE ($1::text IS NULL OR name ILIKE $1 OR entidad_emisora ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let certificates = sqlx::query_as::<_, Certificate>(
            r#"
            SELECT * FROM certificates
            WHERE ($1::text IS NULL OR name ILIKE $1 OR entidad_emisora ILIKE $1)
            ORDER BY name ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((certificates, total))
    }

    pub async fn create(&self, input: &CertificatePayload) -> Result<Certificate, AppError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (name, entidad_emisora, fecha_vencimiento, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.entidad_emisora)
        .bind(input.fecha_vencimiento)
        .bind(&input.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(certificate)
    }

    pub async fn update(&self, id: i32, input: &CertificatePayload) -> Result<Option<Certificate>, AppError> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            UPDATE certificates
            SET name = $2, entidad_emisora = $3, fecha_vencimiento = $4, image_url = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.entidad_emisora)
        .bind(input.fecha_vencimiento)
        .bind(&input.image_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(certificate)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
