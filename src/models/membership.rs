// src/models/membership.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::serde_utils::double_option;

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "plan_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanVisibility {
    #[default]
    Publica,
    Privada,
}

/// Uma cadência de cobrança do plano. `periodicidad` é texto livre ("Mensual", "Anual", "Trimestral"...).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceOption {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Mensual")]
    pub periodicidad: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 99.0)]
    pub costo: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipType {
    #[schema(example = 1)]
    pub id: i32,

    #[schema(example = "Plan Oro")]
    pub nombre_plan: String,

    pub description: Option<String>,

    // JSONB: [{ "periodicidad": "Mensual", "costo": 99 }]
    #[sqlx(json)]
    #[schema(example = json!([{"periodicidad": "Mensual", "costo": 99}, {"periodicidad": "Anual", "costo": 999}]))]
    pub opciones_precios: Vec<PriceOption>,

    pub beneficios: Vec<String>,
    pub visibilidad: PlanVisibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTypePayload {
    #[validate(length(min = 1, message = "required"))]
    pub nombre_plan: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Informe ao menos uma opção de preço."), nested)]
    pub opciones_precios: Vec<PriceOption>,

    #[serde(default)]
    #[schema(example = json!(["Logo en portada", "Soporte prioritario"]))]
    pub beneficios: Vec<String>,

    #[serde(default)]
    pub visibilidad: PlanVisibility,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTypePatch {
    pub nombre_plan: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub opciones_precios: Option<Vec<PriceOption>>,
    pub beneficios: Option<Vec<String>>,
    pub visibilidad: Option<PlanVisibility>,
}

impl MembershipTypePatch {
    pub fn apply_to(self, current: &MembershipType) -> MembershipTypePayload {
        MembershipTypePayload {
            nombre_plan: self.nombre_plan.unwrap_or_else(|| current.nombre_plan.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            opciones_precios: self.opciones_precios.unwrap_or_else(|| current.opciones_precios.clone()),
            beneficios: self.beneficios.unwrap_or_else(|| current.beneficios.clone()),
            visibilidad: self.visibilidad.unwrap_or(current.visibilidad),
        }
    }
}

/// Resultado da consulta de preço. Plano sem opções = "consulte".
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PriceQuote {
    Price {
        periodicidad: String,
        #[schema(value_type = f64)]
        costo: Decimal,
    },
    /// O plano tem preços, mas não nessa cadência
    NotOffered,
    ContactForPrice,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTypePage {
    pub membership_types: Vec<MembershipType>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}
