// src/handlers/users.rs
// Rotas atrás do admin_guard (ver main.rs).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath},
        pagination::{page_meta, text_param, PageRequest, QueryParams},
    },
    config::AppState,
    models::user::{User, UserPage, UserPatch, UserPayload},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(
        ("search" = Option<String>, Query, description = "Trecho do nome ou do e-mail"),
        ("page" = Option<i64>, Query),
        ("limit" = Option<i64>, Query)
    ),
    responses((status = 200, body = UserPage)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::optional_from_params(&params)?;
    let search = text_param(&params, "search");

    let (users, total) = app_state.user_repo.list(search.as_deref(), page).await?;
    let (page, total_pages) = page_meta(total, page);

    Ok(Json(UserPage { users, total, page, total_pages }))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path)),
    responses((status = 200, body = User), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("usuário", id))?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = UserPayload,
    responses((status = 201, body = User), (status = 409, description = "E-mail ou authId já cadastrado")),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<UserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = app_state.user_repo.create(&payload).await?;
    tracing::info!("👤 Usuário criado (id {})", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UserPatch,
    params(("id" = i32, Path)),
    responses((status = 200, body = User), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<UserPatch>,
) -> Result<impl IntoResponse, AppError> {
    let current = app_state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("usuário", id))?;

    let merged = patch.apply_to(&current);
    merged.validate()?;

    let user = app_state
        .user_repo
        .update(id, &merged)
        .await?
        .ok_or(AppError::not_found("usuário", id))?;
    tracing::info!("✏️ Usuário atualizado (id {})", id);
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path)),
    responses((status = 204, description = "Removido; empresas ficam sem dono"), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.user_repo.delete(id).await? {
        return Err(AppError::not_found("usuário", id));
    }
    tracing::info!("🗑️ Usuário removido (id {})", id);
    Ok(StatusCode::NO_CONTENT)
}
