// src/models/company.rs

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::serde_utils::double_option;
use crate::models::{
    category::Category, certificate::Certificate, membership::MembershipType, user::User,
};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "company_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    Activo,
    Inactivo,
    #[default]
    Pendiente,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "membership_periodicity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Mensual,
    Anual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Otro,
}

// --- VALORES EMBUTIDOS (JSONB) ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0, message = "invalid_latitude"))]
    #[schema(example = 4.711)]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "invalid_longitude"))]
    #[schema(example = -74.0721)]
    pub lng: f64,

    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "instagram")]
    pub platform: String,

    #[validate(url(message = "invalid_url"))]
    #[schema(example = "https://instagram.com/acme")]
    pub url: String,
}

// --- VALIDAÇÕES ---

fn validate_unique_ids(ids: &[i32]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(ids.len());
    if ids.iter().all(|id| seen.insert(*id)) {
        return Ok(());
    }
    let mut err = ValidationError::new("duplicated");
    err.message = Some("Ids repetidos na lista.".into());
    Err(err)
}

fn validate_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.iter().all(|u| validator::ValidateUrl::validate_url(u)) {
        return Ok(());
    }
    let mut err = ValidationError::new("url");
    err.message = Some("invalid_url".into());
    Err(err)
}

// --- EMPRESA (o registro) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[schema(example = 10)]
    pub id: i32,

    #[schema(example = "Acme Corp")]
    pub name: String,

    #[schema(example = "contacto@acme.com")]
    pub email: String,
    pub email_secundario: Option<String>,
    pub email_terciario: Option<String>,

    #[schema(example = json!(["+57 300 000 0000"]))]
    pub phones: Vec<String>,

    pub website: Option<String>,

    // Texto rico (HTML)
    pub description: Option<String>,

    pub address: Option<String>,

    #[sqlx(json)]
    pub location: Option<GeoPoint>,

    pub logo_url: Option<String>,
    pub catalog_url: Option<String>,
    pub gallery: Vec<String>,
    pub videos: Vec<String>,

    #[sqlx(json)]
    pub social_links: Vec<SocialLink>,

    pub representatives: Vec<String>,

    // Agregados de company_categories / company_certificates, na ordem enviada pelo cliente
    #[schema(example = json!([1, 4]))]
    pub categories_ids: Vec<i32>,
    pub certificate_ids: Vec<i32>,

    pub membership_type_id: Option<i32>,
    pub membership_periodicidad: Option<Periodicity>,
    pub metodo_pago_membresia: Option<PaymentMethod>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-15")]
    pub fecha_inicio_membresia: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-02-15")]
    pub fecha_fin_membresia: Option<NaiveDate>,

    pub notas_membresia: Option<String>,

    pub estado: CompanyStatus,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Visão hidratada: nunca é persistida, montada a cada consulta.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithDetails {
    #[serde(flatten)]
    pub company: Company,

    pub categories: Vec<Category>,
    pub certificates: Vec<Certificate>,
    pub membership_type: Option<MembershipType>,
    pub user: Option<User>,
}

// --- ENTRADA (POST e resultado do merge do PUT) ---

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Acme Corp")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "contacto@acme.com")]
    pub email: String,

    #[validate(email(message = "invalid_email"))]
    pub email_secundario: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email_terciario: Option<String>,

    #[serde(default)]
    #[validate(length(max = 3, message = "Máximo de 3 telefones."))]
    pub phones: Vec<String>,

    #[validate(url(message = "invalid_url"))]
    pub website: Option<String>,

    pub description: Option<String>,
    pub address: Option<String>,

    #[validate(nested)]
    pub location: Option<GeoPoint>,

    #[validate(url(message = "invalid_url"))]
    pub logo_url: Option<String>,

    #[validate(url(message = "invalid_url"))]
    pub catalog_url: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "Máximo de 10 imagens."), custom(function = "validate_urls"))]
    pub gallery: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 5, message = "Máximo de 5 vídeos."), custom(function = "validate_urls"))]
    pub videos: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub social_links: Vec<SocialLink>,

    #[serde(default)]
    pub representatives: Vec<String>,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "Informe ao menos uma categoria."),
        custom(function = "validate_unique_ids")
    )]
    #[schema(example = json!([1, 4]))]
    pub categories_ids: Vec<i32>,

    #[serde(default)]
    #[validate(custom(function = "validate_unique_ids"))]
    pub certificate_ids: Vec<i32>,

    pub membership_type_id: Option<i32>,
    pub membership_periodicidad: Option<Periodicity>,
    pub metodo_pago_membresia: Option<PaymentMethod>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-15")]
    pub fecha_inicio_membresia: Option<NaiveDate>,

    // Calculada a partir do início + periodicidade; só um admin pode forçar outro valor
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_fin_membresia: Option<NaiveDate>,

    pub notas_membresia: Option<String>,

    #[serde(default)]
    pub estado: CompanyStatus,

    pub user_id: Option<i32>,
}

impl From<&Company> for CompanyInput {
    fn from(c: &Company) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            email_secundario: c.email_secundario.clone(),
            email_terciario: c.email_terciario.clone(),
            phones: c.phones.clone(),
            website: c.website.clone(),
            description: c.description.clone(),
            address: c.address.clone(),
            location: c.location.clone(),
            logo_url: c.logo_url.clone(),
            catalog_url: c.catalog_url.clone(),
            gallery: c.gallery.clone(),
            videos: c.videos.clone(),
            social_links: c.social_links.clone(),
            representatives: c.representatives.clone(),
            categories_ids: c.categories_ids.clone(),
            certificate_ids: c.certificate_ids.clone(),
            membership_type_id: c.membership_type_id,
            membership_periodicidad: c.membership_periodicidad,
            metodo_pago_membresia: c.metodo_pago_membresia,
            fecha_inicio_membresia: c.fecha_inicio_membresia,
            fecha_fin_membresia: c.fecha_fin_membresia,
            notas_membresia: c.notas_membresia.clone(),
            estado: c.estado,
            user_id: c.user_id,
        }
    }
}

// --- PUT parcial ---
// Ausente = mantém; `null` explícito limpa os campos opcionais.

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub email: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email_secundario: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email_terciario: Option<Option<String>>,

    pub phones: Option<Vec<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<GeoPoint>)]
    pub location: Option<Option<GeoPoint>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub logo_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub catalog_url: Option<Option<String>>,

    pub gallery: Option<Vec<String>>,
    pub videos: Option<Vec<String>>,
    pub social_links: Option<Vec<SocialLink>>,
    pub representatives: Option<Vec<String>>,
    pub categories_ids: Option<Vec<i32>>,
    pub certificate_ids: Option<Vec<i32>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub membership_type_id: Option<Option<i32>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Periodicity>)]
    pub membership_periodicidad: Option<Option<Periodicity>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<PaymentMethod>)]
    pub metodo_pago_membresia: Option<Option<PaymentMethod>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_inicio_membresia: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_fin_membresia: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notas_membresia: Option<Option<String>>,

    pub estado: Option<CompanyStatus>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub user_id: Option<Option<i32>>,
}

impl CompanyPatch {
    /// O PUT mexeu em algum insumo da data de término?
    pub fn touches_membership_dates(&self) -> bool {
        self.fecha_inicio_membresia.is_some() || self.membership_periodicidad.is_some()
    }

    pub fn sets_end_date(&self) -> bool {
        self.fecha_fin_membresia.is_some()
    }

    pub fn apply_to(self, current: &Company) -> CompanyInput {
        let mut merged = CompanyInput::from(current);

        if let Some(v) = self.name { merged.name = v; }
        if let Some(v) = self.email { merged.email = v; }
        if let Some(v) = self.email_secundario { merged.email_secundario = v; }
        if let Some(v) = self.email_terciario { merged.email_terciario = v; }
        if let Some(v) = self.phones { merged.phones = v; }
        if let Some(v) = self.website { merged.website = v; }
        if let Some(v) = self.description { merged.description = v; }
        if let Some(v) = self.address { merged.address = v; }
        if let Some(v) = self.location { merged.location = v; }
        if let Some(v) = self.logo_url { merged.logo_url = v; }
        if let Some(v) = self.catalog_url { merged.catalog_url = v; }
        if let Some(v) = self.gallery { merged.gallery = v; }
        if let Some(v) = self.videos { merged.videos = v; }
        if let Some(v) = self.social_links { merged.social_links = v; }
        if let Some(v) = self.representatives { merged.representatives = v; }
        if let Some(v) = self.categories_ids { merged.categories_ids = v; }
        if let Some(v) = self.certificate_ids { merged.certificate_ids = v; }
        if let Some(v) = self.membership_type_id { merged.membership_type_id = v; }
        if let Some(v) = self.membership_periodicidad { merged.membership_periodicidad = v; }
        if let Some(v) = self.metodo_pago_membresia { merged.metodo_pago_membresia = v; }
        if let Some(v) = self.fecha_inicio_membresia { merged.fecha_inicio_membresia = v; }
        if let Some(v) = self.fecha_fin_membresia { merged.fecha_fin_membresia = v; }
        if let Some(v) = self.notas_membresia { merged.notas_membresia = v; }
        if let Some(v) = self.estado { merged.estado = v; }
        if let Some(v) = self.user_id { merged.user_id = v; }

        merged
    }
}

// --- CONSULTA ---

/// Predicado da listagem. Todos os filtros presentes combinam com AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub membership_type_id: Option<i32>,
    pub estado: Option<CompanyStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPage {
    pub companies: Vec<CompanyWithDetails>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_company(id: i32) -> Company {
        Company {
            id,
            name: "Acme Corp".into(),
            email: "contacto@acme.com".into(),
            email_secundario: Some("ventas@acme.com".into()),
            email_terciario: None,
            phones: vec!["+57 300 000 0000".into()],
            website: Some("https://acme.com".into()),
            description: Some("Fabricantes de todo".into()),
            address: Some("Calle 1 # 2-3".into()),
            location: None,
            logo_url: None,
            catalog_url: None,
            gallery: vec![],
            videos: vec![],
            social_links: vec![],
            representatives: vec![],
            categories_ids: vec![1, 2],
            certificate_ids: vec![],
            membership_type_id: Some(1),
            membership_periodicidad: None,
            metodo_pago_membresia: None,
            fecha_inicio_membresia: None,
            fecha_fin_membresia: None,
            notas_membresia: None,
            estado: CompanyStatus::Activo,
            user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn valid_input() -> CompanyInput {
        CompanyInput {
            name: "Acme Corp".into(),
            email: "contacto@acme.com".into(),
            categories_ids: vec![1],
            ..Default::default()
        }
    }

    #[test]
    fn empty_categories_are_rejected() {
        let input = CompanyInput { categories_ids: vec![], ..valid_input() };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("categories_ids"));
    }

    #[test]
    fn missing_categories_in_json_are_rejected() {
        let input: CompanyInput =
            serde_json::from_str(r#"{"name": "Acme", "email": "a@acme.com"}"#).unwrap();
        assert!(input.categories_ids.is_empty());
        assert!(input.validate().is_err());
    }

    #[test]
    fn duplicated_category_ids_are_rejected() {
        let input = CompanyInput { categories_ids: vec![1, 2, 1], ..valid_input() };
        assert!(input.validate().is_err());
    }

    #[test]
    fn bounded_lists_and_formats() {
        assert!(valid_input().validate().is_ok());

        let too_many_phones = CompanyInput { phones: vec!["1".into(); 4], ..valid_input() };
        assert!(too_many_phones.validate().is_err());

        let bad_email = CompanyInput { email_secundario: Some("no-es-email".into()), ..valid_input() };
        assert!(bad_email.validate().is_err());

        let bad_gallery = CompanyInput { gallery: vec!["ftp//x".into()], ..valid_input() };
        assert!(bad_gallery.validate().is_err());

        let bad_social = CompanyInput {
            social_links: vec![SocialLink { platform: "x".into(), url: "nope".into() }],
            ..valid_input()
        };
        assert!(bad_social.validate().is_err());
    }

    #[test]
    fn new_companies_start_pending() {
        let input: CompanyInput = serde_json::from_str(
            r#"{"name": "Acme", "email": "a@acme.com", "categoriesIds": [3]}"#,
        )
        .unwrap();
        assert_eq!(input.estado, CompanyStatus::Pendiente);
    }

    #[test]
    fn patch_keeps_absent_fields_and_clears_nulls() {
        let current = sample_company(10);
        let patch: CompanyPatch = serde_json::from_str(
            r#"{"name": "Acme SAS", "emailSecundario": null, "categoriesIds": [5]}"#,
        )
        .unwrap();
        let merged = patch.apply_to(&current);

        assert_eq!(merged.name, "Acme SAS");
        assert_eq!(merged.email_secundario, None);
        assert_eq!(merged.categories_ids, vec![5]);
        // intocados
        assert_eq!(merged.email, current.email);
        assert_eq!(merged.website, current.website);
        assert_eq!(merged.membership_type_id, Some(1));
        assert_eq!(merged.estado, CompanyStatus::Activo);
    }

    #[test]
    fn patch_reports_membership_inputs() {
        let untouched: CompanyPatch = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(!untouched.touches_membership_dates());

        let touched: CompanyPatch =
            serde_json::from_str(r#"{"fechaInicioMembresia": "2024-01-15"}"#).unwrap();
        assert!(touched.touches_membership_dates());
        assert!(!touched.sets_end_date());
    }

    #[test]
    fn details_flatten_company_fields() {
        let details = CompanyWithDetails {
            company: sample_company(10),
            categories: vec![],
            certificates: vec![],
            membership_type: None,
            user: None,
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["id"], 10);
        assert_eq!(value["categoriesIds"], json!([1, 2]));
        assert_eq!(value["categories"], json!([]));
        assert!(value["membershipType"].is_null());
    }
}
