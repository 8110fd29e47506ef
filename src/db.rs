pub mod category_repo;
pub mod certificate_repo;
pub mod company_filters;
pub mod company_repo;
pub mod membership_repo;
pub mod opinion_repo;
pub mod role_repo;
pub mod statistics_repo;
pub mod user_repo;

pub use category_repo::CategoryRepository;
pub use certificate_repo::CertificateRepository;
pub use company_repo::CompanyRepository;
pub use membership_repo::MembershipRepository;
pub use opinion_repo::OpinionRepository;
pub use role_repo::RoleRepository;
pub use statistics_repo::StatisticsRepository;
pub use user_repo::UserRepository;

use crate::common::pagination::PageRequest;

/// Padrão de busca por substring para ILIKE. `%`, `_` e `\` viram literais.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// LIMIT/OFFSET para as listas simples. `LIMIT NULL` no Postgres = sem limite.
pub fn limit_offset(page: Option<PageRequest>) -> (Option<i64>, i64) {
    match page {
        Some(p) => (Some(p.limit), p.offset()),
        None => (None, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("me co"), "%me co%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn unpaginated_lists_have_no_limit() {
        assert_eq!(limit_offset(None), (None, 0));
        assert_eq!(limit_offset(Some(PageRequest { page: 3, limit: 5 })), (Some(5), 10));
    }
}
