// src/handlers/membership_types.rs
// CRUD é do admin; a vitrine (/public) e a consulta de preço são abertas.

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
    middleware::auth::{AdminUser, MaybeUser},
    models::{
        auth::is_admin,
        membership::{
            MembershipType, MembershipTypePage, MembershipTypePatch, MembershipTypePayload,
            PlanVisibility, PriceQuote,
        },
    },
    services::membership_pricing::price_for,
};

#[utoipa::path(
    get,
    path = "/api/membership-types",
    tag = "Membership Types",
    params(
        ("search" = Option<String>, Query, description = "Trecho do nome do plano"),
        ("page" = Option<i64>, Query),
        ("limit" = Option<i64>, Query)
    ),
    responses((status = 200, body = MembershipTypePage)),
    security(("api_jwt" = []))
)]
pub async fn list_membership_types(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::optional_from_params(&params)?;
    let search = text_param(&params, "search");

    let (membership_types, total) = app_state
        .membership_repo
        .list(search.as_deref(), None, page)
        .await?;
    let (page, total_pages) = page_meta(total, page);

    Ok(Json(MembershipTypePage { membership_types, total, page, total_pages }))
}

/// Planos com `visibilidad = publica`, para a página de preços.
#[utoipa::path(
    get,
    path = "/api/membership-types/public",
    tag = "Membership Types",
    responses((status = 200, body = MembershipTypePage))
)]
pub async fn list_public_membership_types(
    State(app_state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::optional_from_params(&params)?;
    let search = text_param(&params, "search");

    let (membership_types, total) = app_state
        .membership_repo
        .list(search.as_deref(), Some(PlanVisibility::Publica), page)
        .await?;
    let (page, total_pages) = page_meta(total, page);

    Ok(Json(MembershipTypePage { membership_types, total, page, total_pages }))
}

#[utoipa::path(
    get,
    path = "/api/membership-types/{id}",
    tag = "Membership Types",
    params(("id" = i32, Path)),
    responses((status = 200, body = MembershipType), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn get_membership_type(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let plan = app_state
        .membership_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("plano", id))?;
    Ok(Json(plan))
}

#[utoipa::path(
    get,
    path = "/api/membership-types/{id}/price",
    tag = "Membership Types",
    params(
        ("id" = i32, Path),
        ("periodicidad" = String, Query, description = "Cadência de cobrança, ex.: Mensual")
    ),
    responses(
        (status = 200, description = "Preço, cadência não oferecida ou sob consulta", body = PriceQuote),
        (status = 400, description = "periodicidad ausente"),
        (status = 404, description = "Plano inexistente (ou privado para não-admin)")
    )
)]
pub async fn get_membership_price(
    State(app_state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    AppPath(id): AppPath<i32>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let periodicidad = text_param(&params, "periodicidad")
        .ok_or_else(|| AppError::invalid_param("periodicidad", "required"))?;

    let plan = app_state
        .membership_repo
        .find_by_id(id)
        .await?
        .filter(|plan| plan.visibilidad == PlanVisibility::Publica || is_admin(&caller))
        .ok_or(AppError::not_found("plano", id))?;

    Ok(Json(price_for(&plan.opciones_precios, &periodicidad)))
}

#[utoipa::path(
    post,
    path = "/api/membership-types",
    tag = "Membership Types",
    request_body = MembershipTypePayload,
    responses((status = 201, body = MembershipType), (status = 400)),
    security(("api_jwt" = []))
)]
pub async fn create_membership_type(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppJson(payload): AppJson<MembershipTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let plan = app_state.membership_repo.create(&payload).await?;
    tracing::info!("💳 Plano '{}' criado (id {})", plan.nombre_plan, plan.id);
    Ok((StatusCode::CREATED, Json(plan)))
}

#[utoipa::path(
    put,
    path = "/api/membership-types/{id}",
    tag = "Membership Types",
    request_body = MembershipTypePatch,
    params(("id" = i32, Path)),
    responses((status = 200, body = MembershipType), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn update_membership_type(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<MembershipTypePatch>,
) -> Result<impl IntoResponse, AppError> {
    let current = app_state
        .membership_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("plano", id))?;

    let merged = patch.apply_to(&current);
    merged.validate()?;

    let plan = app_state
        .membership_repo
        .update(id, &merged)
        .await?
        .ok_or(AppError::not_found("plano", id))?;
    tracing::info!("✏️ Plano atualizado (id {})", id);
    Ok(Json(plan))
}

#[utoipa::path(
    delete,
    path = "/api/membership-types/{id}",
    tag = "Membership Types",
    params(("id" = i32, Path)),
    responses((status = 204, description = "Removido; empresas ficam sem plano"), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn delete_membership_type(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.membership_repo.delete(id).await? {
        return Err(AppError::not_found("plano", id));
    }
    tracing::info!("🗑️ Plano removido (id {})", id);
    Ok(StatusCode::NO_CONTENT)
}
