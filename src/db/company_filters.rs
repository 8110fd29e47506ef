// src/db/company_filters.rs
//
// Monta o SQL da listagem de empresas a partir de um CompanyFilter.
// Cada filtro presente vira um predicado ligado por AND; valores vão sempre como bind.

use sqlx::{Postgres, QueryBuilder};

use crate::{common::pagination::PageRequest, db::like_pattern, models::company::CompanyFilter};

/// Colunas da empresa + listas de ids agregadas das tabelas de junção, na ordem gravada.
pub const COMPANY_SELECT: &str = r#"SELECT c.*,
    ARRAY(SELECT cc.category_id FROM company_categories cc WHERE cc.company_id = c.id ORDER BY cc.position) AS categories_ids,
    ARRAY(SELECT ct.certificate_id FROM company_certificates ct WHERE ct.company_id = c.id ORDER BY ct.position) AS certificate_ids
FROM companies c"#;

pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &CompanyFilter) {
    let mut separator = " WHERE ";

    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        qb.push(separator)
            .push("(c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.description ILIKE ")
            .push_bind(pattern)
            .push(")");
        separator = " AND ";
    }

    // Pertinência exata na lista de categorias (nunca substring)
    if let Some(category_id) = filter.category_id {
        qb.push(separator)
            .push("EXISTS (SELECT 1 FROM company_categories fc WHERE fc.company_id = c.id AND fc.category_id = ")
            .push_bind(category_id)
            .push(")");
        separator = " AND ";
    }

    if let Some(membership_type_id) = filter.membership_type_id {
        qb.push(separator)
            .push("c.membership_type_id = ")
            .push_bind(membership_type_id);
        separator = " AND ";
    }

    if let Some(estado) = filter.estado {
        qb.push(separator).push("c.estado = ").push_bind(estado);
    }
}

/// SELECT paginado. Sem `page` devolve todas as linhas (exportação).
pub fn list_query(filter: &CompanyFilter, page: Option<PageRequest>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(COMPANY_SELECT);
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY c.created_at DESC, c.id DESC");

    if let Some(page) = page {
        qb.push(" LIMIT ").push_bind(page.limit);
        qb.push(" OFFSET ").push_bind(page.offset());
    }
    qb
}

pub fn count_query(filter: &CompanyFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM companies c");
    push_filters(&mut qb, filter);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::CompanyStatus;

    #[test]
    fn no_filters_means_no_where_clause() {
        let qb = count_query(&CompanyFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM companies c");
    }

    #[test]
    fn filters_are_joined_with_and() {
        let filter = CompanyFilter {
            search: Some("acme".into()),
            category_id: Some(3),
            membership_type_id: Some(2),
            estado: Some(CompanyStatus::Activo),
        };
        let sql = count_query(&filter).into_sql();

        assert!(sql.contains(" WHERE (c.name ILIKE $1 OR c.description ILIKE $2)"));
        assert!(sql.contains(" AND EXISTS (SELECT 1 FROM company_categories fc WHERE fc.company_id = c.id AND fc.category_id = $3)"));
        assert!(sql.contains(" AND c.membership_type_id = $4"));
        assert!(sql.ends_with(" AND c.estado = $5"));
        // O EXISTS tem o seu próprio WHERE; o da consulta aparece uma vez só
        assert_eq!(sql.matches(" WHERE ").count(), 2);
        assert_eq!(sql.matches("FROM companies c WHERE ").count(), 1);
    }

    #[test]
    fn single_filter_starts_the_where_clause() {
        let filter = CompanyFilter { estado: Some(CompanyStatus::Activo), ..Default::default() };
        let sql = count_query(&filter).into_sql();
        assert_eq!(sql, "SELECT COUNT(*) FROM companies c WHERE c.estado = $1");
    }

    #[test]
    fn list_query_orders_and_paginates() {
        let filter = CompanyFilter { category_id: Some(7), ..Default::default() };
        let sql = list_query(&filter, Some(PageRequest { page: 2, limit: 10 })).into_sql();

        assert!(sql.starts_with("SELECT c.*,"));
        assert!(sql.contains("fc.category_id = $1"));
        assert!(sql.ends_with(" ORDER BY c.created_at DESC, c.id DESC LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn export_query_has_no_limit() {
        let sql = list_query(&CompanyFilter::default(), None).into_sql();
        assert!(!sql.contains("LIMIT"));
    }
}
