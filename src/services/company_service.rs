// src/services/company_service.rs

use async_trait::async_trait;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    models::{
        auth::{is_admin, AuthenticatedUser, Caller},
        company::{
            Company, CompanyFilter, CompanyInput, CompanyPage, CompanyPatch, CompanyStatus,
            CompanyWithDetails,
        },
        user::UserRole,
    },
    services::{
        company_query::CompanyQuery, membership_pricing::apply_membership_dates,
        relation_resolver::RelationResolver,
    },
};

/// Porta de escrita usada pela importação em lote (uma criação por linha).
#[async_trait]
pub trait CompanyWriter: Send + Sync {
    async fn create_company(
        &self,
        caller: AuthenticatedUser,
        input: CompanyInput,
    ) -> Result<Company, AppError>;
}

// Ativa = pública. Fora isso, só admin e o representante dono.
pub fn can_view(company: &Company, caller: &Caller) -> bool {
    company.estado == CompanyStatus::Activo
        || is_admin(caller)
        || caller.is_some_and(|c| company.user_id == Some(c.id))
}

pub fn ensure_can_edit(company: &Company, caller: &AuthenticatedUser) -> Result<(), AppError> {
    match caller.role {
        UserRole::Admin => Ok(()),
        UserRole::Representante if company.user_id == Some(caller.id) => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}

/// Ajusta uma criação ao papel do chamador. Devolve se a data final veio explícita (só admin).
pub fn prepare_new(input: &mut CompanyInput, caller: &AuthenticatedUser) -> Result<bool, AppError> {
    match caller.role {
        UserRole::Admin => Ok(input.fecha_fin_membresia.is_some()),
        UserRole::Representante => {
            input.user_id = Some(caller.id);
            input.estado = CompanyStatus::Pendiente;
            input.fecha_fin_membresia = None;
            Ok(false)
        }
        UserRole::User => Err(AppError::Forbidden),
    }
}

// Representante não mexe em estado, dono nem data final
fn restrict_patch(patch: &mut CompanyPatch, caller: &AuthenticatedUser) {
    if !caller.is_admin() {
        patch.estado = None;
        patch.user_id = None;
        patch.fecha_fin_membresia = None;
    }
}

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
    repo: CompanyRepository,
    resolver: RelationResolver,
}

impl CompanyService {
    pub fn new(pool: PgPool, repo: CompanyRepository, resolver: RelationResolver) -> Self {
        Self { pool, repo, resolver }
    }

    pub async fn list(&self, query: &CompanyQuery) -> Result<CompanyPage, AppError> {
        let (companies, total) = self.repo.list(&query.filter, query.page).await?;
        let companies = self.resolver.hydrate_many(companies).await?;

        Ok(CompanyPage {
            companies,
            total,
            page: query.page.page,
            total_pages: query.page.total_pages(total),
        })
    }

    // Exportação: linhas cruas, sem hidratar
    pub async fn list_all(&self, filter: &CompanyFilter) -> Result<Vec<Company>, AppError> {
        self.repo.list_all(filter).await
    }

    pub async fn get(&self, id: i32, caller: &Caller) -> Result<CompanyWithDetails, AppError> {
        let company = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|c| can_view(c, caller))
            .ok_or(AppError::not_found("empresa", id))?;

        self.resolver.hydrate(company).await
    }

    pub async fn create(
        &self,
        caller: AuthenticatedUser,
        input: CompanyInput,
    ) -> Result<CompanyWithDetails, AppError> {
        let company = self.store_new(caller, input).await?;
        self.resolver.hydrate(company).await
    }

    async fn store_new(&self, caller: AuthenticatedUser, mut input: CompanyInput) -> Result<Company, AppError> {
        let explicit_end = prepare_new(&mut input, &caller)?;
        input.validate()?;
        apply_membership_dates(&mut input, true, explicit_end);

        let mut tx = self.pool.begin().await?;
        let id = self.repo.insert(&mut *tx, &input).await?;
        let company = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::not_found("empresa", id))?;
        tx.commit().await?;

        tracing::info!("🏢 Empresa criada (id {}) por usuário {}", id, caller.id);
        Ok(company)
    }

    /// PUT parcial: merge sobre o registro atual, validação do resultado e regravação.
    pub async fn update(
        &self,
        id: i32,
        caller: AuthenticatedUser,
        mut patch: CompanyPatch,
    ) -> Result<CompanyWithDetails, AppError> {
        let current = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::not_found("empresa", id))?;

        ensure_can_edit(&current, &caller)?;
        restrict_patch(&mut patch, &caller);

        let touched = patch.touches_membership_dates();
        let explicit_end = patch.sets_end_date();

        let mut merged = patch.apply_to(&current);
        merged.validate()?;
        apply_membership_dates(&mut merged, touched, explicit_end);

        let mut tx = self.pool.begin().await?;
        if !self.repo.update(&mut *tx, id, &merged).await? {
            return Err(AppError::not_found("empresa", id));
        }
        let company = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::not_found("empresa", id))?;
        tx.commit().await?;

        tracing::info!("✏️ Empresa atualizada (id {}) por usuário {}", id, caller.id);
        self.resolver.hydrate(company).await
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("empresa", id));
        }
        tracing::info!("🗑️ Empresa removida (id {})", id);
        Ok(())
    }
}

#[async_trait]
impl CompanyWriter for CompanyService {
    async fn create_company(
        &self,
        caller: AuthenticatedUser,
        input: CompanyInput,
    ) -> Result<Company, AppError> {
        self.store_new(caller, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::tests::{sample_company, valid_input};

    const ADMIN: AuthenticatedUser = AuthenticatedUser { id: 1, role: UserRole::Admin };
    const OWNER: AuthenticatedUser = AuthenticatedUser { id: 7, role: UserRole::Representante };
    const STRANGER: AuthenticatedUser = AuthenticatedUser { id: 8, role: UserRole::Representante };
    const PLAIN: AuthenticatedUser = AuthenticatedUser { id: 9, role: UserRole::User };

    fn pending_company_of(owner: i32) -> Company {
        Company {
            estado: CompanyStatus::Pendiente,
            user_id: Some(owner),
            ..sample_company(10)
        }
    }

    #[test]
    fn active_companies_are_public() {
        assert!(can_view(&sample_company(1), &None));
    }

    #[test]
    fn hidden_companies_only_for_admin_and_owner() {
        let company = pending_company_of(OWNER.id);
        assert!(!can_view(&company, &None));
        assert!(!can_view(&company, &Some(STRANGER)));
        assert!(can_view(&company, &Some(OWNER)));
        assert!(can_view(&company, &Some(ADMIN)));
    }

    #[test]
    fn only_admin_or_owner_can_edit() {
        let company = pending_company_of(OWNER.id);
        assert!(ensure_can_edit(&company, &ADMIN).is_ok());
        assert!(ensure_can_edit(&company, &OWNER).is_ok());
        assert!(matches!(ensure_can_edit(&company, &STRANGER), Err(AppError::Forbidden)));
        assert!(matches!(ensure_can_edit(&company, &PLAIN), Err(AppError::Forbidden)));
    }

    #[test]
    fn representative_creations_are_owned_and_pending() {
        let mut input = CompanyInput {
            estado: CompanyStatus::Activo,
            user_id: Some(99),
            fecha_fin_membresia: chrono::NaiveDate::from_ymd_opt(2030, 1, 1),
            ..valid_input()
        };
        let explicit_end = prepare_new(&mut input, &OWNER).unwrap();

        assert!(!explicit_end);
        assert_eq!(input.user_id, Some(OWNER.id));
        assert_eq!(input.estado, CompanyStatus::Pendiente);
        assert_eq!(input.fecha_fin_membresia, None);
    }

    #[test]
    fn admin_creations_are_kept_as_sent() {
        let mut input = CompanyInput { estado: CompanyStatus::Activo, ..valid_input() };
        assert!(!prepare_new(&mut input, &ADMIN).unwrap());
        assert_eq!(input.estado, CompanyStatus::Activo);
    }

    #[test]
    fn plain_users_cannot_create() {
        let mut input = valid_input();
        assert!(matches!(prepare_new(&mut input, &PLAIN), Err(AppError::Forbidden)));
    }

    #[test]
    fn representative_patch_cannot_touch_status() {
        let mut patch: CompanyPatch =
            serde_json::from_str(r#"{"estado": "activo", "userId": 3, "fechaFinMembresia": "2030-01-01"}"#)
                .unwrap();
        restrict_patch(&mut patch, &OWNER);

        let merged = patch.apply_to(&pending_company_of(OWNER.id));
        assert_eq!(merged.estado, CompanyStatus::Pendiente);
        assert_eq!(merged.user_id, Some(OWNER.id));
        assert_eq!(merged.fecha_fin_membresia, None);
    }
}

// Precisam de um Postgres em DATABASE_URL: `cargo test -- --ignored`
#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::{
        common::pagination::PageRequest,
        config::AppState,
        models::{category::CategoryPayload, company::tests::valid_input},
        services::import_export::import_companies,
    };

    const ADMIN: AuthenticatedUser = AuthenticatedUser { id: 1, role: UserRole::Admin };

    async fn category(state: &AppState, name: &str) -> i32 {
        let payload = CategoryPayload {
            name: name.into(),
            description: None,
            icon: None,
            icon_url: None,
        };
        state.category_repo.create(&payload).await.unwrap().id
    }

    async fn company(state: &AppState, name: &str, description: &str, categories: Vec<i32>) -> i32 {
        let input = CompanyInput {
            name: name.into(),
            description: Some(description.into()),
            categories_ids: categories,
            estado: CompanyStatus::Activo,
            ..valid_input()
        };
        state.company_service.create(ADMIN, input).await.unwrap().company.id
    }

    fn query(filter: CompanyFilter, page: i64, limit: i64) -> CompanyQuery {
        CompanyQuery { filter, page: PageRequest { page, limit } }
    }

    #[sqlx::test]
    #[ignore]
    async fn hydrates_categories_in_stored_order(pool: PgPool) {
        let state = AppState::from_pool(pool, "segredo".into());
        let tech = category(&state, "Tecnología").await;
        let food = category(&state, "Alimentos").await;

        let id = company(&state, "Acme Corp", "Fabricantes", vec![food, tech]).await;
        let details = state.company_service.get(id, &None).await.unwrap();

        let names: Vec<_> = details.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alimentos", "Tecnología"]);
        assert_eq!(details.company.categories_ids, vec![food, tech]);
        assert!(details.membership_type.is_none());
    }

    #[sqlx::test]
    #[ignore]
    async fn pages_add_up_to_the_total(pool: PgPool) {
        let state = AppState::from_pool(pool, "segredo".into());
        let cat = category(&state, "Servicios").await;
        for n in 0..7 {
            company(&state, &format!("Empresa {}", n), "Servicios varios", vec![cat]).await;
        }

        let mut seen = 0;
        for page in 1..=3 {
            let result = state
                .company_service
                .list(&query(CompanyFilter::default(), page, 3))
                .await
                .unwrap();
            assert_eq!(result.total, 7);
            assert_eq!(result.total_pages, 3);
            seen += result.companies.len();
        }
        assert_eq!(seen, 7);
    }

    #[sqlx::test]
    #[ignore]
    async fn category_filter_is_exact_membership(pool: PgPool) {
        let state = AppState::from_pool(pool, "segredo".into());
        let one = category(&state, "Uno").await;
        let other = category(&state, "Otra").await;

        let inside = company(&state, "Dentro", "x", vec![other, one]).await;
        company(&state, "Fuera", "x", vec![other]).await;

        let filter = CompanyFilter { category_id: Some(one), ..Default::default() };
        let result = state.company_service.list(&query(filter, 1, 10)).await.unwrap();

        assert_eq!(result.total, 1);
        assert_eq!(result.companies[0].company.id, inside);
    }

    #[sqlx::test]
    #[ignore]
    async fn search_ignores_case_and_matches_description(pool: PgPool) {
        let state = AppState::from_pool(pool, "segredo".into());
        let cat = category(&state, "General").await;
        company(&state, "Acme Corp", "Herramientas", vec![cat]).await;
        company(&state, "Beta", "Distribuidor de acme", vec![cat]).await;
        company(&state, "Gamma", "Nada que ver", vec![cat]).await;

        for term in ["acme", "ACME"] {
            let filter = CompanyFilter { search: Some(term.into()), ..Default::default() };
            let result = state.company_service.list(&query(filter, 1, 10)).await.unwrap();
            assert_eq!(result.total, 2, "{}", term);
        }

        let filter = CompanyFilter { search: Some("me co".into()), ..Default::default() };
        let result = state.company_service.list(&query(filter, 1, 10)).await.unwrap();
        assert_eq!(result.total, 1);
    }

    #[sqlx::test]
    #[ignore]
    async fn deleting_twice_is_not_found(pool: PgPool) {
        let state = AppState::from_pool(pool, "segredo".into());
        let cat = category(&state, "Temporal").await;
        let id = company(&state, "Efímera", "x", vec![cat]).await;

        assert!(state.company_service.delete(id).await.is_ok());
        assert!(matches!(
            state.company_service.delete(id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[sqlx::test]
    #[ignore]
    async fn import_persists_only_valid_rows(pool: PgPool) {
        let state = AppState::from_pool(pool, "segredo".into());
        let cat = category(&state, "Importada").await;

        let header = crate::services::import_export::CSV_HEADER.join(";");
        let good = format!("Acme;a@acme.com;;;;;;;;;{};;;;;;;activo", cat);
        let bad = format!("Sin correo;;;;;;;;;;{};;;;;;;activo", cat);
        let body = format!("{}\n{}\n{}\n", header, good, bad);

        let report = import_companies(&state.company_service, ADMIN, &body).await.unwrap();
        assert_eq!(report.successes, 1);
        assert_eq!(report.errors, 1);

        let result = state
            .company_service
            .list(&query(CompanyFilter::default(), 1, 10))
            .await
            .unwrap();
        assert_eq!(result.total, 1);
    }
}
