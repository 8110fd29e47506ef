// src/models/role.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::serde_utils::double_option;
use crate::models::user::RecordStatus;

// Permissões no formato "area.acao" (ex: "companies.write")
fn validate_permissions(permissions: &[String]) -> Result<(), ValidationError> {
    let is_valid = |slug: &str| {
        let mut parts = slug.split('.');
        let valid_part = |p: &str| {
            !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c == '_' || c == '-')
        };
        matches!((parts.next(), parts.next(), parts.next()), (Some(a), Some(b), None) if valid_part(a) && valid_part(b))
    };

    if let Some(bad) = permissions.iter().find(|p| !is_valid(p)) {
        let mut err = ValidationError::new("invalid_permission");
        err.message = Some(format!("Permissão '{}' fora do formato area.acao.", bad).into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = 2)]
    pub id: i32,

    #[schema(example = "Moderador")]
    pub name: String,

    // Texto rico (HTML) vindo do editor do painel
    pub description: Option<String>,

    #[schema(example = json!(["opinions.read", "opinions.moderate"]))]
    pub permissions: Vec<String>,

    pub estado: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Moderador")]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_permissions"))]
    #[schema(example = json!(["companies.read", "companies.write"]))]
    pub permissions: Vec<String>,

    #[serde(default)]
    pub estado: RecordStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePatch {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub permissions: Option<Vec<String>>,
    pub estado: Option<RecordStatus>,
}

impl RolePatch {
    pub fn apply_to(self, current: &Role) -> RolePayload {
        RolePayload {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            permissions: self.permissions.unwrap_or_else(|| current.permissions.clone()),
            estado: self.estado.unwrap_or(current.estado),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePage {
    pub roles: Vec<Role>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_with(permissions: &[&str]) -> RolePayload {
        RolePayload {
            name: "Editor".into(),
            description: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            estado: RecordStatus::Activo,
        }
    }

    #[test]
    fn accepts_area_action_permissions() {
        assert!(role_with(&["companies.write", "membership_types.read"]).validate().is_ok());
        assert!(role_with(&[]).validate().is_ok());
    }

    #[test]
    fn rejects_malformed_permissions() {
        for bad in ["companies", "companies.", "Companies.write", "a.b.c", ".write"] {
            assert!(role_with(&[bad]).validate().is_err(), "{bad} deveria ser rejeitada");
        }
    }
}
