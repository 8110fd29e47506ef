use sqlx::PgPool;

use crate::{
    common::{
        error::{map_constraint_error, AppError},
        pagination::PageRequest,
    },
    db::{like_pattern, limit_offset},
    models::role::{Role, RolePayload},
};

const DUPLICATED_NAME: &str = "Já existe um cargo com esse nome.";

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Option<PageRequest>,
    ) -> Result<(Vec<Role>, i64), AppError> {
        let pattern = search.map(like_pattern);
        let (limit, offset) = limit_offset(page);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE ($1::text IS NULL OR name ILIKE $1)")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE ($1::text IS NULL OR name ILIKE $1) ORDER BY name ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((roles, total))
    }

    pub async fn create(&self, input: &RolePayload) -> Result<Role, AppError> {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description, permissions, estado)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.permissions)
        .bind(input.estado)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, DUPLICATED_NAME, "name"))
    }

    pub async fn update(&self, id: i32, input: &RolePayload) -> Result<Option<Role>, AppError> {
        sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET name = $2, description = $3, permissions = $4, estado = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.permissions)
        .bind(input.estado)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, DUPLICATED_NAME, "name"))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
