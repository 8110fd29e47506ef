// src/models/auth.rs

use serde::{Deserialize, Serialize};

use crate::models::user::{User, UserRole};

// Claims do JWT emitido pelo provedor de identidade.
// Aqui só verificamos; a emissão fica fora desta API.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,   // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    #[serde(default)]
    pub iat: usize, // Issued At
}

/// Quem está chamando, já verificado pelo middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, role: user.role }
    }
}

/// Chamador opcional: `None` = anônimo.
pub type Caller = Option<AuthenticatedUser>;

pub fn is_admin(caller: &Caller) -> bool {
    caller.is_some_and(|c| c.is_admin())
}
