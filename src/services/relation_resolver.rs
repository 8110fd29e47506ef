// src/services/relation_resolver.rs
//
// Expande os ids de uma página de empresas nos registros relacionados.
// Uma consulta por tipo de entidade, qualquer que seja o tamanho da página.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
    common::error::AppError,
    db::{CategoryRepository, CertificateRepository, MembershipRepository, UserRepository},
    models::{
        category::Category,
        certificate::Certificate,
        company::{Company, CompanyWithDetails},
        membership::MembershipType,
        user::User,
    },
};

/// Ids distintos referenciados por um lote de empresas.
#[derive(Debug, Default, PartialEq)]
pub struct RelationIds {
    pub categories: Vec<i32>,
    pub certificates: Vec<i32>,
    pub membership_types: Vec<i32>,
    pub users: Vec<i32>,
}

impl RelationIds {
    pub fn collect(companies: &[Company]) -> Self {
        let mut categories = BTreeSet::new();
        let mut certificates = BTreeSet::new();
        let mut membership_types = BTreeSet::new();
        let mut users = BTreeSet::new();

        for company in companies {
            categories.extend(company.categories_ids.iter().copied());
            certificates.extend(company.certificate_ids.iter().copied());
            membership_types.extend(company.membership_type_id);
            users.extend(company.user_id);
        }

        Self {
            categories: categories.into_iter().collect(),
            certificates: certificates.into_iter().collect(),
            membership_types: membership_types.into_iter().collect(),
            users: users.into_iter().collect(),
        }
    }
}

/// Registros carregados, indexados por id.
#[derive(Debug, Default)]
pub struct RelatedRecords {
    pub categories: HashMap<i32, Category>,
    pub certificates: HashMap<i32, Certificate>,
    pub membership_types: HashMap<i32, MembershipType>,
    pub users: HashMap<i32, User>,
}

// Segue a ordem da lista de ids; ids repetidos ou sem registro ficam de fora
fn pick<T: Clone>(ids: &[i32], records: &HashMap<i32, T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| records.get(id).cloned())
        .collect()
}

/// Montagem pura: nunca falha por referência inexistente.
pub fn assemble(companies: Vec<Company>, related: &RelatedRecords) -> Vec<CompanyWithDetails> {
    companies
        .into_iter()
        .map(|company| CompanyWithDetails {
            categories: pick(&company.categories_ids, &related.categories),
            certificates: pick(&company.certificate_ids, &related.certificates),
            membership_type: company
                .membership_type_id
                .and_then(|id| related.membership_types.get(&id).cloned()),
            user: company.user_id.and_then(|id| related.users.get(&id).cloned()),
            company,
        })
        .collect()
}

#[derive(Clone)]
pub struct RelationResolver {
    category_repo: CategoryRepository,
    certificate_repo: CertificateRepository,
    membership_repo: MembershipRepository,
    user_repo: UserRepository,
}

impl RelationResolver {
    pub fn new(
        category_repo: CategoryRepository,
        certificate_repo: CertificateRepository,
        membership_repo: MembershipRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self { category_repo, certificate_repo, membership_repo, user_repo }
    }

    pub async fn hydrate_many(&self, companies: Vec<Company>) -> Result<Vec<CompanyWithDetails>, AppError> {
        let ids = RelationIds::collect(&companies);
        let related = self.fetch(&ids).await?;
        Ok(assemble(companies, &related))
    }

    pub async fn hydrate(&self, company: Company) -> Result<CompanyWithDetails, AppError> {
        let mut details = self.hydrate_many(vec![company]).await?;
        details
            .pop()
            .ok_or_else(|| anyhow::anyhow!("hidratação devolveu lista vazia").into())
    }

    // As quatro buscas rodam em paralelo; lista vazia não vai ao banco
    async fn fetch(&self, ids: &RelationIds) -> Result<RelatedRecords, AppError> {
        let categories = async {
            if ids.categories.is_empty() {
                return Ok(Vec::new());
            }
            self.category_repo.find_by_ids(&ids.categories).await
        };
        let certificates = async {
            if ids.certificates.is_empty() {
                return Ok(Vec::new());
            }
            self.certificate_repo.find_by_ids(&ids.certificates).await
        };
        let membership_types = async {
            if ids.membership_types.is_empty() {
                return Ok(Vec::new());
            }
            self.membership_repo.find_by_ids(&ids.membership_types).await
        };
        let users = async {
            if ids.users.is_empty() {
                return Ok(Vec::new());
            }
            self.user_repo.find_by_ids(&ids.users).await
        };

        let (categories, certificates, membership_types, users) =
            tokio::try_join!(categories, certificates, membership_types, users)?;

        Ok(RelatedRecords {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            certificates: certificates.into_iter().map(|c| (c.id, c)).collect(),
            membership_types: membership_types.into_iter().map(|m| (m.id, m)).collect(),
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::tests::sample_company;
    use chrono::Utc;

    fn category(id: i32, name: &str) -> Category {
        Category {
            id,
            name: name.into(),
            description: None,
            icon: Some("tag".into()),
            icon_url: None,
            effective_icon: Some("tag".into()),
            created_at: Utc::now(),
        }
    }

    fn related_with_categories(categories: &[(i32, &str)]) -> RelatedRecords {
        RelatedRecords {
            categories: categories.iter().map(|(id, n)| (*id, category(*id, n))).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn collects_the_union_of_ids_once() {
        let mut a = sample_company(1);
        a.categories_ids = vec![3, 1];
        a.user_id = Some(9);
        let mut b = sample_company(2);
        b.categories_ids = vec![1, 5];
        b.membership_type_id = Some(1);

        let ids = RelationIds::collect(&[a, b]);
        assert_eq!(ids.categories, vec![1, 3, 5]);
        assert_eq!(ids.membership_types, vec![1]);
        assert_eq!(ids.users, vec![9]);
        assert!(ids.certificates.is_empty());
    }

    #[test]
    fn hydrated_categories_are_exactly_the_existing_ids() {
        let mut company = sample_company(1);
        company.categories_ids = vec![2, 99, 1];
        let related = related_with_categories(&[(1, "Construcción"), (2, "Tecnología"), (3, "Otra")]);

        let details = assemble(vec![company], &related);
        let names: Vec<_> = details[0].categories.iter().map(|c| c.name.as_str()).collect();

        // 99 não existe, 3 não foi pedido; a ordem é a da lista de ids
        assert_eq!(names, vec!["Tecnología", "Construcción"]);
    }

    #[test]
    fn repeated_ids_do_not_duplicate_records() {
        let mut company = sample_company(1);
        company.categories_ids = vec![1, 1, 2];
        let related = related_with_categories(&[(1, "A"), (2, "B")]);

        let details = assemble(vec![company], &related);
        assert_eq!(details[0].categories.len(), 2);
    }

    #[test]
    fn dangling_single_references_become_none() {
        let mut company = sample_company(1);
        company.membership_type_id = Some(7);
        company.user_id = Some(8);

        let details = assemble(vec![company], &RelatedRecords::default());
        assert!(details[0].membership_type.is_none());
        assert!(details[0].user.is_none());
        assert_eq!(details[0].company.membership_type_id, Some(7));
    }

    #[test]
    fn empty_page_stays_empty() {
        assert!(assemble(vec![], &RelatedRecords::default()).is_empty());
        assert_eq!(RelationIds::collect(&[]), RelationIds::default());
    }
}
