// src/models/certificate.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::serde_utils::double_option;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[schema(example = 5)]
    pub id: i32,

    #[schema(example = "ISO 9001")]
    pub name: String,

    #[schema(example = "ICONTEC")]
    pub entidad_emisora: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2026-12-31")]
    pub fecha_vencimiento: Option<NaiveDate>,

    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    pub entidad_emisora: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_vencimiento: Option<NaiveDate>,

    #[validate(url(message = "invalid_url"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePatch {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub entidad_emisora: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_vencimiento: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
}

impl CertificatePatch {
    pub fn apply_to(self, current: &Certificate) -> CertificatePayload {
        CertificatePayload {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            entidad_emisora: self.entidad_emisora.unwrap_or_else(|| current.entidad_emisora.clone()),
            fecha_vencimiento: self.fecha_vencimiento.unwrap_or(current.fecha_vencimiento),
            image_url: self.image_url.unwrap_or_else(|| current.image_url.clone()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePage {
    pub certificates: Vec<Certificate>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}
