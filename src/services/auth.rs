// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{AuthenticatedUser, Claims},
        user::RecordStatus,
    },
};

/// Verifica tokens emitidos pelo provedor de identidade. Não emite tokens.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    /// Assinatura (HS256) e expiração.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(token_data.claims)
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.decode_claims(token)?;

        // Token válido mas usuário apagado ou inativo: tratado como não autenticado
        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.estado != RecordStatus::Activo {
            tracing::warn!("🔒 Token de usuário inativo rejeitado (id {})", user.id);
            return Err(AppError::Unauthorized);
        }

        Ok(AuthenticatedUser::from(&user))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use sqlx::postgres::PgPoolOptions;

    pub(crate) const TEST_SECRET: &str = "segredo-de-teste";

    pub(crate) fn sign(sub: i32, secret: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            exp: (now + exp_offset_secs) as usize,
            iat: now as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn service() -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/directorio_test")
            .unwrap();
        AuthService::new(UserRepository::new(pool), TEST_SECRET.to_string())
    }

    #[tokio::test]
    async fn accepts_a_well_signed_token() {
        let claims = service().decode_claims(&sign(42, TEST_SECRET, 3600)).unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[tokio::test]
    async fn rejects_a_foreign_signature() {
        let err = service().decode_claims(&sign(42, "outro-segredo", 3600)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_an_expired_token() {
        let err = service().decode_claims(&sign(42, TEST_SECRET, -3600)).unwrap_err();
        assert!(matches!(err, AppError::JwtError(_)));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        assert!(service().decode_claims("nao.e.jwt").is_err());
    }
}
