// src/handlers/categories.rs

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
    middleware::auth::AdminUser,
    models::category::{Category, CategoryPage, CategoryPatch, CategoryPayload},
};

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    params(
        ("search" = Option<String>, Query, description = "Trecho do nome"),
        ("page" = Option<i64>, Query, description = "Sem page/limit devolve tudo"),
        ("limit" = Option<i64>, Query)
    ),
    responses((status = 200, description = "Lista de categorias", body = CategoryPage))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::optional_from_params(&params)?;
    let search = text_param(&params, "search");

    let (categories, total) = app_state.category_repo.list(search.as_deref(), page).await?;
    let (page, total_pages) = page_meta(total, page);

    Ok(Json(CategoryPage { categories, total, page, total_pages }))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria", body = Category),
        (status = 404, description = "Categoria não encontrada")
    )
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .category_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("categoria", id))?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state.category_repo.create(&payload).await?;
    tracing::info!("🏷️ Categoria criada (id {})", category.id);

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    request_body = CategoryPatch,
    params(("id" = i32, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<CategoryPatch>,
) -> Result<impl IntoResponse, AppError> {
    let current = app_state
        .category_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("categoria", id))?;

    let merged = patch.apply_to(&current);
    merged.validate()?;

    let category = app_state
        .category_repo
        .update(id, &merged)
        .await?
        .ok_or(AppError::not_found("categoria", id))?;
    tracing::info!("✏️ Categoria atualizada (id {})", id);

    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Removida (e retirada das empresas)"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.category_repo.delete(id).await? {
        return Err(AppError::not_found("categoria", id));
    }
    tracing::info!("🗑️ Categoria removida (id {})", id);
    Ok(StatusCode::NO_CONTENT)
}
