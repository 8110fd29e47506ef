// src/models/opinion.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "opinion_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OpinionStatus {
    #[default]
    Pendiente,
    // O painel antigo enviava o masculino
    #[serde(alias = "aprobado")]
    Aprobada,
    #[serde(alias = "rechazado")]
    Rechazada,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opinion {
    pub id: i32,

    #[schema(example = "Carlos Gómez")]
    pub author_name: String,

    #[schema(example = "carlos@correo.com")]
    pub author_email: String,

    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,

    pub comment: String,
    pub company_id: i32,
    pub estado: OpinionStatus,

    // Preenchidos quando um administrador aprova ou rejeita
    pub approved_by: Option<i32>,
    pub approved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpinionPayload {
    #[validate(length(min = 1, message = "required"))]
    pub author_name: String,

    #[validate(email(message = "invalid_email"))]
    pub author_email: String,

    #[validate(range(min = 1, max = 5, message = "A nota deve estar entre 1 e 5."))]
    pub rating: i32,

    #[validate(length(min = 1, message = "required"))]
    pub comment: String,

    pub company_id: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpinionPatch {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl OpinionPatch {
    pub fn apply_to(self, current: &Opinion) -> OpinionPayload {
        OpinionPayload {
            author_name: self.author_name.unwrap_or_else(|| current.author_name.clone()),
            author_email: self.author_email.unwrap_or_else(|| current.author_email.clone()),
            rating: self.rating.unwrap_or(current.rating),
            comment: self.comment.unwrap_or_else(|| current.comment.clone()),
            company_id: current.company_id,
        }
    }
}

/// Filtros de GET /api/opinions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpinionFilter {
    pub estado: Option<OpinionStatus>,
    pub company_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpinionPage {
    pub opinions: Vec<Opinion>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masculine_status_aliases_are_accepted() {
        let approved: OpinionStatus = serde_json::from_str(r#""aprobado""#).unwrap();
        let rejected: OpinionStatus = serde_json::from_str(r#""rechazado""#).unwrap();
        assert_eq!(approved, OpinionStatus::Aprobada);
        assert_eq!(rejected, OpinionStatus::Rechazada);
        assert_eq!(serde_json::to_string(&approved).unwrap(), r#""aprobada""#);
    }

    #[test]
    fn rating_must_be_between_one_and_five() {
        let mut payload = OpinionPayload {
            author_name: "Carlos".into(),
            author_email: "carlos@correo.com".into(),
            rating: 5,
            comment: "Excelente servicio".into(),
            company_id: 1,
        };
        assert!(payload.validate().is_ok());

        payload.rating = 0;
        assert!(payload.validate().unwrap_err().field_errors().contains_key("rating"));

        payload.rating = 6;
        assert!(payload.validate().is_err());
    }
}
