use sqlx::PgPool;

use crate::{
    common::{
        error::{map_constraint_error, AppError},
        pagination::PageRequest,
    },
    db::{like_pattern, limit_offset},
    models::user::{User, UserPayload},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Busca em lote (hidratação das empresas)
    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Option<PageRequest>,
    ) -> Result<(Vec<User>, i64), AppError> {
        let pattern = search.map(like_pattern);
        let (limit, offset) = limit_offset(page);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR display_name ILIKE $1 OR email ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR display_name ILIKE $1 OR email ILIKE $1)
            ORDER BY display_name ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total))
    }

    pub async fn create(&self, input: &UserPayload) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (auth_id, email, display_name, role, estado)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&input.auth_id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(input.role)
        .bind(input.estado)
        .fetch_one(&self.pool)
        .await
        // Converte erro de violação de chave única em um erro mais amigável
        .map_err(|e| map_constraint_error(e, "Já existe um usuário com esse e-mail ou authId.", "authId"))
    }

    pub async fn update(&self, id: i32, input: &UserPayload) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET auth_id = $2, email = $3, display_name = $4, role = $5, estado = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.auth_id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(input.role)
        .bind(input.estado)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Já existe um usuário com esse e-mail ou authId.", "authId"))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
