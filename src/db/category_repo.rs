// src/db/category_repo.rs

use sqlx::PgPool;

use crate::{
    common::{
        error::{map_constraint_error, AppError},
        pagination::PageRequest,
    },
    db::{like_pattern, limit_offset},
    models::category::{Category, CategoryPayload},
};

// `effective_icon` é calculado no SELECT e também no RETURNING
const CATEGORY_COLUMNS: &str =
    "id, name, description, icon, icon_url, COALESCE(icon_url, icon) AS effective_icon, created_at";

const DUPLICATED_NAME: &str = "Já existe uma categoria com esse nome.";

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Category>, AppError> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Category>, AppError> {
        let sql = format!("SELECT {} FROM categories WHERE id = ANY($1)", CATEGORY_COLUMNS);
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Option<PageRequest>,
    ) -> Result<(Vec<Category>, i64), AppError> {
        let pattern = search.map(like_pattern);
        let (limit, offset) = limit_offset(page);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE ($1::text IS NULL OR name ILIKE $1)")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            "SELECT {} FROM categories WHERE ($1::text IS NULL OR name ILIKE $1) ORDER BY name ASC, id ASC LIMIT $2 OFFSET $3",
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((categories, total))
    }

    pub async fn create(&self, input: &CategoryPayload) -> Result<Category, AppError> {
        let sql = format!(
            "INSERT INTO categories (name, description, icon, icon_url) VALUES ($1, $2, $3, $4) RETURNING {}",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.icon)
            .bind(&input.icon_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, DUPLICATED_NAME, "name"))
    }

    pub async fn update(&self, id: i32, input: &CategoryPayload) -> Result<Option<Category>, AppError> {
        let sql = format!(
            "UPDATE categories SET name = $2, description = $3, icon = $4, icon_url = $5 WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.icon)
            .bind(&input.icon_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, DUPLICATED_NAME, "name"))
    }

    // As linhas de company_categories caem junto (ON DELETE CASCADE)
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
