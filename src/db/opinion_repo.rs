use sqlx::PgPool;

use crate::{
    common::{
        error::{map_constraint_error, AppError},
        pagination::PageRequest,
    },
    db::limit_offset,
    models::opinion::{Opinion, OpinionFilter, OpinionPayload, OpinionStatus},
};

#[derive(Clone)]
pub struct OpinionRepository {
    pool: PgPool,
}

impl OpinionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Opinion>, AppError> {
        let opinion = sqlx::query_as::<_, Opinion>("SELECT * FROM opinions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(opinion)
    }

    pub async fn list(
        &self,
        filter: &OpinionFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<Opinion>, i64), AppError> {
        let (limit, offset) = limit_offset(page);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM opinions
            WHERE ($1::opinion_status IS NULL OR estado = $1)
              AND ($2::int4 IS NULL OR company_id = $2)
            "#,
        )
        .bind(filter.estado)
        .bind(filter.company_id)
        .fetch_one(&self.pool)
        .await?;

        // Mais recentes primeiro
        let opinions = sqlx::query_as::<_, Opinion>(
            r#"
            SELECT * FROM opinions
            WHERE ($1::opinion_status IS NULL OR estado = $1)
              AND ($2::int4 IS NULL OR company_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.estado)
        .bind(filter.company_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((opinions, total))
    }

    /// Toda opinião nasce pendente, independente do que o cliente mandar.
    pub async fn create(&self, input: &OpinionPayload) -> Result<Opinion, AppError> {
        sqlx::query_as::<_, Opinion>(
            r#"
            INSERT INTO opinions (author_name, author_email, rating, comment, company_id, estado)
            VALUES ($1, $2, $3, $4, $5, 'pendiente')
            RETURNING *
            "#,
        )
        .bind(&input.author_name)
        .bind(&input.author_email)
        .bind(input.rating)
        .bind(&input.comment)
        .bind(input.company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Opinião duplicada.", "companyId"))
    }

    pub async fn update(&self, id: i32, input: &OpinionPayload) -> Result<Option<Opinion>, AppError> {
        let opinion = sqlx::query_as::<_, Opinion>(
            r#"
            UPDATE opinions
            SET author_name = $2, author_email = $3, rating = $4, comment = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.author_name)
        .bind(&input.author_email)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_optional(&self.pool)
        .await?;
        Ok(opinion)
    }

    /// Aprova ou rejeita, registrando quem moderou e quando.
    pub async fn moderate(
        &self,
        id: i32,
        estado: OpinionStatus,
        moderator_id: i32,
    ) -> Result<Option<Opinion>, AppError> {
        let opinion = sqlx::query_as::<_, Opinion>(
            r#"
            UPDATE opinions
            SET estado = $2, approved_by = $3, approved_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(estado)
        .bind(moderator_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(opinion)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM opinions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
