// src/db/company_repo.rs

use sqlx::{
    postgres::PgArguments, query::Query, types::Json, Executor, PgConnection, PgPool, Postgres, Row,
};

use crate::{
    common::{
        error::{map_constraint_error, AppError},
        pagination::PageRequest,
    },
    db::company_filters::{count_query, list_query, COMPANY_SELECT},
    models::company::{Company, CompanyFilter, CompanyInput},
};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

// As 23 colunas graváveis, na ordem dos binds de `bind_columns`
const WRITABLE_COLUMNS: &str = "name, email, email_secundario, email_terciario, phones, website, \
    description, address, location, logo_url, catalog_url, gallery, videos, social_links, \
    representatives, membership_type_id, membership_periodicidad, metodo_pago_membresia, \
    fecha_inicio_membresia, fecha_fin_membresia, notas_membresia, estado, user_id";

fn bind_columns<'q>(
    query: Query<'q, Postgres, PgArguments>,
    input: &'q CompanyInput,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.email_secundario)
        .bind(&input.email_terciario)
        .bind(&input.phones)
        .bind(&input.website)
        .bind(&input.description)
        .bind(&input.address)
        .bind(Json(&input.location))
        .bind(&input.logo_url)
        .bind(&input.catalog_url)
        .bind(&input.gallery)
        .bind(&input.videos)
        .bind(Json(&input.social_links))
        .bind(&input.representatives)
        .bind(input.membership_type_id)
        .bind(input.membership_periodicidad)
        .bind(input.metodo_pago_membresia)
        .bind(input.fecha_inicio_membresia)
        .bind(input.fecha_fin_membresia)
        .bind(&input.notas_membresia)
        .bind(input.estado)
        .bind(input.user_id)
}

fn company_fk_field(e: &sqlx::Error) -> &'static str {
    let constraint = match e {
        sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or_default(),
        _ => "",
    };
    if constraint.contains("user_id") { "userId" } else { "membershipTypeId" }
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} WHERE c.id = $1", COMPANY_SELECT);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(company)
    }

    /// Página filtrada + total de linhas que casam com o mesmo filtro.
    pub async fn list(
        &self,
        filter: &CompanyFilter,
        page: PageRequest,
    ) -> Result<(Vec<Company>, i64), AppError> {
        let total: i64 = count_query(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let companies = list_query(filter, Some(page))
            .build_query_as::<Company>()
            .fetch_all(&self.pool)
            .await?;

        Ok((companies, total))
    }

    // Exportação: mesmo filtro, sem paginação
    pub async fn list_all(&self, filter: &CompanyFilter) -> Result<Vec<Company>, AppError> {
        let companies = list_query(filter, None)
            .build_query_as::<Company>()
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    /// Insere a empresa e as relações. Chamar dentro de uma transação.
    pub async fn insert(&self, conn: &mut PgConnection, input: &CompanyInput) -> Result<i32, AppError> {
        let placeholders = (1..=23).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "INSERT INTO companies ({}) VALUES ({}) RETURNING id",
            WRITABLE_COLUMNS, placeholders
        );

        let row = bind_columns(sqlx::query(&sql), input)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                let field = company_fk_field(&e);
                map_constraint_error(e, "Empresa duplicada.", field)
            })?;
        let id: i32 = row.try_get("id")?;

        self.replace_relations(conn, id, input).await?;
        Ok(id)
    }

    /// Regrava todas as colunas e as relações. `false` se o id não existe.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        input: &CompanyInput,
    ) -> Result<bool, AppError> {
        let assignments = WRITABLE_COLUMNS
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(i, column)| format!("{} = ${}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE companies SET {}, updated_at = NOW() WHERE id = $24",
            assignments
        );

        let result = bind_columns(sqlx::query(&sql), input)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                let field = company_fk_field(&e);
                map_constraint_error(e, "Empresa duplicada.", field)
            })?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.replace_relations(conn, id, input).await?;
        Ok(true)
    }

    // Apaga e regrava as junções guardando a posição de cada id
    async fn replace_relations(
        &self,
        conn: &mut PgConnection,
        company_id: i32,
        input: &CompanyInput,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM company_categories WHERE company_id = $1")
            .bind(company_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM company_certificates WHERE company_id = $1")
            .bind(company_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO company_categories (company_id, category_id, position)
            SELECT $1, t.id, t.ord::int4
            FROM UNNEST($2::int4[]) WITH ORDINALITY AS t(id, ord)
            "#,
        )
        .bind(company_id)
        .bind(&input.categories_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_constraint_error(e, "Categoria repetida.", "categoriesIds"))?;

        sqlx::query(
            r#"
            INSERT INTO company_certificates (company_id, certificate_id, position)
            SELECT $1, t.id, t.ord::int4
            FROM UNNEST($2::int4[]) WITH ORDINALITY AS t(id, ord)
            "#,
        )
        .bind(company_id)
        .bind(&input.certificate_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_constraint_error(e, "Certificado repetido.", "certificateIds"))?;

        Ok(())
    }

    // Opiniões e junções caem em cascata
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
