// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Representante,
    #[default]
    User,
}

// Usado por usuários e cargos
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "record_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Activo,
    Inactivo,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 1)]
    pub id: i32,

    /// Identificador no provedor de identidade externo
    #[schema(example = "auth0|64f1c2")]
    pub auth_id: String,

    #[schema(example = "ana@empresa.com")]
    pub email: String,

    #[schema(example = "Ana Pérez")]
    pub display_name: String,

    pub role: UserRole,
    pub estado: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub auth_id: String,

    #[validate(email(message = "invalid_email"))]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    pub display_name: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub estado: RecordStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub auth_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub estado: Option<RecordStatus>,
}

impl UserPatch {
    pub fn apply_to(self, current: &User) -> UserPayload {
        UserPayload {
            auth_id: self.auth_id.unwrap_or_else(|| current.auth_id.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            display_name: self.display_name.unwrap_or_else(|| current.display_name.clone()),
            role: self.role.unwrap_or(current.role),
            estado: self.estado.unwrap_or(current.estado),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}
