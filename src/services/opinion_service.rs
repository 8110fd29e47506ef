// src/services/opinion_service.rs

use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{enum_param, id_param, page_meta, PageRequest, QueryParams},
    },
    db::{CompanyRepository, OpinionRepository},
    models::{
        auth::{is_admin, AuthenticatedUser, Caller},
        company::Company,
        opinion::{Opinion, OpinionFilter, OpinionPage, OpinionPatch, OpinionPayload, OpinionStatus},
    },
    services::company_service::can_view,
};

/// Fora do painel só aparecem opiniões aprovadas.
pub fn opinion_filter(params: &QueryParams, caller: &Caller) -> Result<OpinionFilter, AppError> {
    let requested = enum_param::<OpinionStatus>(params, "estado")?;

    Ok(OpinionFilter {
        estado: if is_admin(caller) { requested } else { Some(OpinionStatus::Aprobada) },
        company_id: id_param(params, "companyId")?,
    })
}

/// Só empresas visíveis ao público recebem opiniões.
pub fn ensure_open_for_reviews(company: Option<&Company>) -> Result<(), AppError> {
    match company {
        Some(company) if can_view(company, &None) => Ok(()),
        _ => Err(AppError::field_error(
            "company_id",
            "not_found",
            "Empresa inexistente ou não publicada.",
        )),
    }
}

#[derive(Clone)]
pub struct OpinionService {
    pool: PgPool,
    repo: OpinionRepository,
    company_repo: CompanyRepository,
}

impl OpinionService {
    pub fn new(pool: PgPool, repo: OpinionRepository, company_repo: CompanyRepository) -> Self {
        Self { pool, repo, company_repo }
    }

    pub async fn list(&self, params: &QueryParams, caller: &Caller) -> Result<OpinionPage, AppError> {
        let filter = opinion_filter(params, caller)?;
        let page = PageRequest::optional_from_params(params)?;

        let (opinions, total) = self.repo.list(&filter, page).await?;
        let (page, total_pages) = page_meta(total, page);

        Ok(OpinionPage { opinions, total, page, total_pages })
    }

    pub async fn get(&self, id: i32, caller: &Caller) -> Result<Opinion, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|o| is_admin(caller) || o.estado == OpinionStatus::Aprobada)
            .ok_or(AppError::not_found("opinião", id))
    }

    /// Entrada pública: sempre nasce pendente de moderação.
    pub async fn create(&self, payload: OpinionPayload) -> Result<Opinion, AppError> {
        payload.validate()?;
        let company = self.company_repo.find_by_id(&self.pool, payload.company_id).await?;
        ensure_open_for_reviews(company.as_ref())?;

        let opinion = self.repo.create(&payload).await?;
        tracing::info!("💬 Opinião {} recebida para a empresa {}", opinion.id, opinion.company_id);
        Ok(opinion)
    }

    pub async fn update(&self, id: i32, patch: OpinionPatch) -> Result<Opinion, AppError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::not_found("opinião", id))?;

        let merged = patch.apply_to(&current);
        merged.validate()?;

        let opinion = self
            .repo
            .update(id, &merged)
            .await?
            .ok_or(AppError::not_found("opinião", id))?;
        tracing::info!("✏️ Opinião {} atualizada", id);
        Ok(opinion)
    }

    /// Aprovar ou rejeitar. Moderar de novo é permitido; vale a última ação.
    pub async fn moderate(
        &self,
        id: i32,
        estado: OpinionStatus,
        moderator: AuthenticatedUser,
    ) -> Result<Opinion, AppError> {
        let opinion = self
            .repo
            .moderate(id, estado, moderator.id)
            .await?
            .ok_or(AppError::not_found("opinião", id))?;
        tracing::info!("🛡️ Opinião {} marcada como {:?} por usuário {}", id, estado, moderator.id);
        Ok(opinion)
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("opinião", id));
        }
        tracing::info!("🗑️ Opinião {} removida", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        company::{tests::sample_company, CompanyStatus},
        user::UserRole,
    };

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn public_listing_is_forced_to_approved() {
        let filter = opinion_filter(&params(&[("estado", "pendiente"), ("companyId", "4")]), &None).unwrap();
        assert_eq!(filter.estado, Some(OpinionStatus::Aprobada));
        assert_eq!(filter.company_id, Some(4));
    }

    #[test]
    fn admins_can_filter_by_any_status() {
        let admin = Some(AuthenticatedUser { id: 1, role: UserRole::Admin });
        let filter = opinion_filter(&params(&[("estado", "rechazada")]), &admin).unwrap();
        assert_eq!(filter.estado, Some(OpinionStatus::Rechazada));

        let filter = opinion_filter(&params(&[]), &admin).unwrap();
        assert_eq!(filter.estado, None);
    }

    #[test]
    fn invalid_company_id_names_the_field() {
        let err = opinion_filter(&params(&[("companyId", "abc")]), &None).unwrap_err();
        assert!(matches!(err, AppError::InvalidQueryParam { field: "companyId", .. }));
    }

    #[test]
    fn only_active_companies_take_reviews() {
        assert!(ensure_open_for_reviews(Some(&sample_company(3))).is_ok());

        let pending = Company { estado: CompanyStatus::Pendiente, ..sample_company(3) };
        for company in [Some(&pending), None] {
            match ensure_open_for_reviews(company).unwrap_err() {
                AppError::ValidationError(errors) => {
                    assert!(errors.field_errors().contains_key("company_id"))
                }
                _ => panic!("esperava erro de validação"),
            }
        }
    }
}
