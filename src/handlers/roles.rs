// src/handlers/roles.rs
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
    models::role::{Role, RolePage, RolePatch, RolePayload},
};

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    params(
        ("search" = Option<String>, Query),
        ("page" = Option<i64>, Query),
        ("limit" = Option<i64>, Query)
    ),
    responses((status = 200, body = RolePage)),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::optional_from_params(&params)?;
    let search = text_param(&params, "search");

    let (roles, total) = app_state.role_repo.list(search.as_deref(), page).await?;
    let (page, total_pages) = page_meta(total, page);

    Ok(Json(RolePage { roles, total, page, total_pages }))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "Roles",
    params(("id" = i32, Path)),
    responses((status = 200, body = Role), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn get_role(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state
        .role_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("cargo", id))?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Roles",
    request_body = RolePayload,
    responses((status = 201, body = Role), (status = 409, description = "Nome já existe")),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let role = app_state.role_repo.create(&payload).await?;
    tracing::info!("🔑 Cargo criado (id {})", role.id);
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "Roles",
    request_body = RolePatch,
    params(("id" = i32, Path)),
    responses((status = 200, body = Role), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<RolePatch>,
) -> Result<impl IntoResponse, AppError> {
    let current = app_state
        .role_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("cargo", id))?;

    let merged = patch.apply_to(&current);
    merged.validate()?;

    let role = app_state
        .role_repo
        .update(id, &merged)
        .await?
        .ok_or(AppError::not_found("cargo", id))?;
    tracing::info!("✏️ Cargo atualizado (id {})", id);
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "Roles",
    params(("id" = i32, Path)),
    responses((status = 204), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.role_repo.delete(id).await? {
        return Err(AppError::not_found("cargo", id));
    }
    tracing::info!("🗑️ Cargo removido (id {})", id);
    Ok(StatusCode::NO_CONTENT)
}
