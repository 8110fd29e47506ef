// src/services/company_query.rs

use crate::{
    common::{
        error::AppError,
        pagination::{enum_param, id_param, text_param, PageRequest, QueryParams},
    },
    models::{
        auth::{is_admin, Caller},
        company::{CompanyFilter, CompanyStatus},
    },
};

/// Filtro + página já validados de GET /api/companies.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyQuery {
    pub filter: CompanyFilter,
    pub page: PageRequest,
}

impl CompanyQuery {
    pub fn from_params(params: &QueryParams, caller: &Caller) -> Result<Self, AppError> {
        Ok(Self {
            filter: filter_from_params(params, caller)?,
            page: PageRequest::from_params(params)?,
        })
    }
}

/// Quem não é admin só enxerga empresas ativas, mesmo pedindo outro `estado`.
pub fn filter_from_params(params: &QueryParams, caller: &Caller) -> Result<CompanyFilter, AppError> {
    // Validado sempre, mesmo quando vai ser ignorado
    let requested = enum_param::<CompanyStatus>(params, "estado")?;

    let estado = if is_admin(caller) {
        requested
    } else {
        Some(CompanyStatus::Activo)
    };

    Ok(CompanyFilter {
        search: text_param(params, "search"),
        category_id: id_param(params, "categoryId")?,
        membership_type_id: id_param(params, "membershipTypeId")?,
        estado,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{auth::AuthenticatedUser, user::UserRole};

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    const ADMIN: Caller = Some(AuthenticatedUser { id: 1, role: UserRole::Admin });
    const REPRESENTANTE: Caller = Some(AuthenticatedUser { id: 2, role: UserRole::Representante });

    #[test]
    fn anonymous_callers_only_see_active_companies() {
        let filter = filter_from_params(&params(&[("estado", "pendiente")]), &None).unwrap();
        assert_eq!(filter.estado, Some(CompanyStatus::Activo));

        let filter = filter_from_params(&params(&[]), &REPRESENTANTE).unwrap();
        assert_eq!(filter.estado, Some(CompanyStatus::Activo));
    }

    #[test]
    fn admins_see_everything_unless_they_filter() {
        let filter = filter_from_params(&params(&[]), &ADMIN).unwrap();
        assert_eq!(filter.estado, None);

        let filter = filter_from_params(&params(&[("estado", "inactivo")]), &ADMIN).unwrap();
        assert_eq!(filter.estado, Some(CompanyStatus::Inactivo));
    }

    #[test]
    fn unknown_estado_is_rejected_for_everyone() {
        for caller in [None, ADMIN] {
            let err = filter_from_params(&params(&[("estado", "borrado")]), &caller).unwrap_err();
            assert!(matches!(err, AppError::InvalidQueryParam { field: "estado", .. }));
        }
    }

    #[test]
    fn parses_every_filter() {
        let query = CompanyQuery::from_params(
            &params(&[
                ("search", "  acme "),
                ("categoryId", "3"),
                ("membershipTypeId", "2"),
                ("page", "2"),
                ("limit", "5"),
            ]),
            &ADMIN,
        )
        .unwrap();

        assert_eq!(
            query.filter,
            CompanyFilter {
                search: Some("acme".into()),
                category_id: Some(3),
                membership_type_id: Some(2),
                estado: None,
            }
        );
        assert_eq!(query.page, PageRequest { page: 2, limit: 5 });
    }

    #[test]
    fn blank_search_means_no_filter() {
        let filter = filter_from_params(&params(&[("search", "   ")]), &ADMIN).unwrap();
        assert_eq!(filter.search, None);
    }

    #[test]
    fn bad_numbers_name_the_field() {
        let err = CompanyQuery::from_params(&params(&[("page", "abc")]), &None).unwrap_err();
        assert!(matches!(err, AppError::InvalidQueryParam { field: "page", .. }));

        let err = CompanyQuery::from_params(&params(&[("categoryId", "x")]), &None).unwrap_err();
        assert!(matches!(err, AppError::InvalidQueryParam { field: "categoryId", .. }));
    }
}
