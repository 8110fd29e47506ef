// src/middleware/auth.rs

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AuthenticatedUser, Caller},
};

// Sem cabeçalho = anônimo. Cabeçalho presente mas malformado = 401.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| Some(t.to_string()))
        .ok_or(AppError::Unauthorized)
}

/// Identifica o chamador (se houver token) e deixa o resultado nas extensions.
pub async fn identify(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers())? {
        let user = app_state.auth_service.validate_token(&token).await?;
        request.extensions_mut().insert(user);
    }
    Ok(next.run(request).await)
}

/// Barreira para routers inteiros que são só do painel.
pub async fn admin_guard(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AuthenticatedUser>() {
        None => Err(AppError::Unauthorized),
        Some(user) if !user.is_admin() => Err(AppError::Forbidden),
        Some(_) => Ok(next.run(request).await),
    }
}

// --- Extratores ---

/// Chamador opcional (rotas públicas com comportamento por papel).
pub struct MaybeUser(pub Caller);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthenticatedUser>().copied()))
    }
}

/// Qualquer usuário autenticado.
pub struct CurrentUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Só administradores: 401 para anônimo, 403 para os demais.
pub struct AdminUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AppError::Unauthorized)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(bearer_token(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn extracts_the_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(matches!(bearer_token(&headers_with("Basic dXNlcg==")), Err(AppError::Unauthorized)));
        assert!(matches!(bearer_token(&headers_with("Bearer ")), Err(AppError::Unauthorized)));
    }
}
