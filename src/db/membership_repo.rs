// src/db/membership_repo.rs

use sqlx::{types::Json, PgPool};

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{like_pattern, limit_offset},
    models::membership::{MembershipType, MembershipTypePayload, PlanVisibility},
};

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<MembershipType>, AppError> {
        let plan = sqlx::query_as::<_, MembershipType>("SELECT * FROM membership_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(plan)
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<MembershipType>, AppError> {
        let plans =
            sqlx::query_as::<_, MembershipType>("SELECT * FROM membership_types WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(plans)
    }

    /// `visibility = None` lista todos os planos (painel); `Some(Publica)` é a vitrine.
    pub async fn list(
        &self,
        search: Option<&str>,
        visibility: Option<PlanVisibility>,
        page: Option<PageRequest>,
    ) -> Result<(Vec<MembershipType>, i64), AppError> {
        let pattern = search.map(like_pattern);
        let (limit, offset) = limit_offset(page);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM membership_types
            WHERE ($1::text IS NULL OR nombre_plan ILIKE $1)
              AND ($2::plan_visibility IS NULL OR visibilidad = $2)
            "#,
        )
        .bind(&pattern)
        .bind(visibility)
        .fetch_one(&self.pool)
        .await?;

        let plans = sqlx::query_as::<_, MembershipType>(
            r#"
            SELECT * FROM membership_types
            WHERE ($1::text IS NULL OR nombre_plan ILIKE $1)
              AND ($2::plan_visibility IS NULL OR visibilidad = $2)
            ORDER BY nombre_plan ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&pattern)
        .bind(visibility)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((plans, total))
    }

    pub async fn create(&self, input: &MembershipTypePayload) -> Result<MembershipType, AppError> {
        let plan = sqlx::query_as::<_, MembershipType>(
            r#"
            INSERT INTO membership_types (nombre_plan, description, opciones_precios, beneficios, visibilidad)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&input.nombre_plan)
        .bind(&input.description)
        .bind(Json(&input.opciones_precios))
        .bind(&input.beneficios)
        .bind(input.visibilidad)
        .fetch_one(&self.pool)
        .await?;
        Ok(plan)
    }

    pub async fn update(
        &self,
        id: i32,
        input: &MembershipTypePayload,
    ) -> Result<Option<MembershipType>, AppError> {
        let plan = sqlx::query_as::<_, MembershipType>(
            r#"
            UPDATE membership_types
            SET nombre_plan = $2, description = $3, opciones_precios = $4,
                beneficios = $5, visibilidad = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.nombre_plan)
        .bind(&input.description)
        .bind(Json(&input.opciones_precios))
        .bind(&input.beneficios)
        .bind(input.visibilidad)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    // Empresas que apontavam para o plano ficam com membership_type_id NULL
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM membership_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
