pub mod auth;
pub mod company_query;
pub mod company_service;
pub mod import_export;
pub mod membership_pricing;
pub mod opinion_service;
pub mod relation_resolver;

pub use auth::AuthService;
pub use company_service::{CompanyService, CompanyWriter};
pub use opinion_service::OpinionService;
pub use relation_resolver::RelationResolver;
