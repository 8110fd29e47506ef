// src/handlers/opinions.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, extract::{AppJson, AppPath}, pagination::QueryParams},
    config::AppState,
    middleware::auth::{AdminUser, MaybeUser},
    models::opinion::{Opinion, OpinionPage, OpinionPatch, OpinionPayload, OpinionStatus},
};

#[utoipa::path(
    get,
    path = "/api/opinions",
    tag = "Opinions",
    params(
        ("estado" = Option<String>, Query, description = "pendiente | aprobada | rechazada (só admin)"),
        ("companyId" = Option<i32>, Query),
        ("page" = Option<i64>, Query),
        ("limit" = Option<i64>, Query)
    ),
    responses((status = 200, body = OpinionPage), (status = 400))
)]
pub async fn list_opinions(
    State(app_state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.opinion_service.list(&params, &caller).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/opinions/{id}",
    tag = "Opinions",
    params(("id" = i32, Path)),
    responses((status = 200, body = Opinion), (status = 404))
)]
pub async fn get_opinion(
    State(app_state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let opinion = app_state.opinion_service.get(id, &caller).await?;
    Ok(Json(opinion))
}

#[utoipa::path(
    post,
    path = "/api/opinions",
    tag = "Opinions",
    request_body = OpinionPayload,
    responses(
        (status = 201, description = "Opinião recebida, pendente de moderação", body = Opinion),
        (status = 400, description = "Dados inválidos ou empresa inexistente")
    )
)]
pub async fn create_opinion(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<OpinionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let opinion = app_state.opinion_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(opinion)))
}

#[utoipa::path(
    put,
    path = "/api/opinions/{id}",
    tag = "Opinions",
    request_body = OpinionPatch,
    params(("id" = i32, Path)),
    responses((status = 200, body = Opinion), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn update_opinion(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<OpinionPatch>,
) -> Result<impl IntoResponse, AppError> {
    let opinion = app_state.opinion_service.update(id, patch).await?;
    Ok(Json(opinion))
}

#[utoipa::path(
    delete,
    path = "/api/opinions/{id}",
    tag = "Opinions",
    params(("id" = i32, Path)),
    responses((status = 204), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn delete_opinion(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.opinion_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/opinions/{id}/approve",
    tag = "Opinions",
    params(("id" = i32, Path)),
    responses((status = 200, description = "Opinião aprovada", body = Opinion), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn approve_opinion(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let opinion = app_state
        .opinion_service
        .moderate(id, OpinionStatus::Aprobada, admin)
        .await?;
    Ok(Json(opinion))
}

#[utoipa::path(
    post,
    path = "/api/opinions/{id}/reject",
    tag = "Opinions",
    params(("id" = i32, Path)),
    responses((status = 200, description = "Opinião rejeitada", body = Opinion), (status = 404)),
    security(("api_jwt" = []))
)]
pub async fn reject_opinion(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let opinion = app_state
        .opinion_service
        .moderate(id, OpinionStatus::Rechazada, admin)
        .await?;
    Ok(Json(opinion))
}
