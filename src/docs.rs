// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::create_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::companies::import_companies_csv,
        handlers::companies::export_companies_csv,

        // --- Categories ---
        handlers::categories::list_categories,
        handlers::categories::get_category,
        handlers::categories::create_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,

        // --- Certificates ---
        handlers::certificates::list_certificates,
        handlers::certificates::get_certificate,
        handlers::certificates::create_certificate,
        handlers::certificates::update_certificate,
        handlers::certificates::delete_certificate,

        // --- Membership Types ---
        handlers::membership_types::list_membership_types,
        handlers::membership_types::list_public_membership_types,
        handlers::membership_types::get_membership_type,
        handlers::membership_types::get_membership_price,
        handlers::membership_types::create_membership_type,
        handlers::membership_types::update_membership_type,
        handlers::membership_types::delete_membership_type,

        // --- Opinions ---
        handlers::opinions::list_opinions,
        handlers::opinions::get_opinion,
        handlers::opinions::create_opinion,
        handlers::opinions::update_opinion,
        handlers::opinions::delete_opinion,
        handlers::opinions::approve_opinion,
        handlers::opinions::reject_opinion,

        // --- Roles ---
        handlers::roles::list_roles,
        handlers::roles::get_role,
        handlers::roles::create_role,
        handlers::roles::update_role,
        handlers::roles::delete_role,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Statistics ---
        handlers::statistics::get_statistics,
    ),
    components(
        schemas(
            // --- Companies ---
            models::company::CompanyStatus,
            models::company::Periodicity,
            models::company::PaymentMethod,
            models::company::GeoPoint,
            models::company::SocialLink,
            models::company::Company,
            models::company::CompanyWithDetails,
            models::company::CompanyInput,
            models::company::CompanyPatch,
            models::company::CompanyPage,
            services::import_export::ImportFailure,
            services::import_export::ImportReport,

            // --- Catálogos ---
            models::category::Category,
            models::category::CategoryPayload,
            models::category::CategoryPatch,
            models::category::CategoryPage,
            models::certificate::Certificate,
            models::certificate::CertificatePayload,
            models::certificate::CertificatePatch,
            models::certificate::CertificatePage,

            // --- Membresía ---
            models::membership::PlanVisibility,
            models::membership::PriceOption,
            models::membership::MembershipType,
            models::membership::MembershipTypePayload,
            models::membership::MembershipTypePatch,
            models::membership::MembershipTypePage,
            models::membership::PriceQuote,

            // --- Opinions ---
            models::opinion::OpinionStatus,
            models::opinion::Opinion,
            models::opinion::OpinionPayload,
            models::opinion::OpinionPatch,
            models::opinion::OpinionPage,

            // --- Users / Roles ---
            models::user::UserRole,
            models::user::RecordStatus,
            models::user::User,
            models::user::UserPayload,
            models::user::UserPatch,
            models::user::UserPage,
            models::role::Role,
            models::role::RolePayload,
            models::role::RolePatch,
            models::role::RolePage,

            models::statistics::Statistics,
        )
    ),
    tags(
        (name = "Companies", description = "Diretório de empresas (busca, cadastro, importação e exportação)"),
        (name = "Categories", description = "Categorias de negócio"),
        (name = "Certificates", description = "Certificações"),
        (name = "Membership Types", description = "Planos de membresía e preços"),
        (name = "Opinions", description = "Avaliações e moderação"),
        (name = "Roles", description = "Cargos administrativos"),
        (name = "Users", description = "Usuários do painel"),
        (name = "Statistics", description = "Indicadores do painel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_group_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/companies",
            "/api/companies/{id}",
            "/api/companies/import",
            "/api/companies/export",
            "/api/categories/{id}",
            "/api/certificates",
            "/api/membership-types/public",
            "/api/membership-types/{id}/price",
            "/api/opinions/{id}/approve",
            "/api/opinions/{id}/reject",
            "/api/roles",
            "/api/users/{id}",
            "/api/statistics",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota sem documentação: {}", path);
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
