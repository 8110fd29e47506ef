// src/handlers/companies.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, extract::{AppJson, AppPath}, pagination::QueryParams},
    config::AppState,
    middleware::auth::{AdminUser, CurrentUser, MaybeUser},
    models::company::{CompanyInput, CompanyPage, CompanyPatch, CompanyWithDetails},
    services::{
        company_query::{filter_from_params, CompanyQuery},
        import_export::{export_companies, import_companies, ImportReport},
    },
};

#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    params(
        ("search" = Option<String>, Query, description = "Trecho do nome ou da descrição (sem diferenciar maiúsculas)"),
        ("categoryId" = Option<i32>, Query, description = "Empresas que contêm esta categoria"),
        ("membershipTypeId" = Option<i32>, Query, description = "Plano de membresía"),
        ("estado" = Option<String>, Query, description = "activo | inactivo | pendiente (só admin)"),
        ("page" = Option<i64>, Query, description = "Página (>= 1, padrão 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (1..100, padrão 10)")
    ),
    responses(
        (status = 200, description = "Página de empresas hidratadas", body = CompanyPage),
        (status = 400, description = "Parâmetro inválido")
    )
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = CompanyQuery::from_params(&params, &caller)?;
    let page = app_state.company_service.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa hidratada", body = CompanyWithDetails),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get(id, &caller).await?;
    Ok(Json(company))
}

#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CompanyInput,
    responses(
        (status = 201, description = "Empresa criada", body = CompanyWithDetails),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Papel sem permissão de cadastro")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<CompanyInput>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.create(user, payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    request_body = CompanyPatch,
    params(("id" = i32, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa atualizada", body = CompanyWithDetails),
        (status = 400, description = "O resultado do merge é inválido"),
        (status = 403, description = "Não é admin nem dono"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<CompanyPatch>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.update(id, user, patch).await?;
    Ok(Json(company))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses(
        (status = 204, description = "Empresa removida"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.company_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/companies/import",
    tag = "Companies",
    request_body(content = String, content_type = "text/csv", description = "CSV separado por ';' com cabeçalho"),
    responses(
        (status = 200, description = "Resumo da importação", body = ImportReport),
        (status = 400, description = "Arquivo vazio ou ilegível")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_companies_csv(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let report = import_companies(&app_state.company_service, admin, &body).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/companies/export",
    tag = "Companies",
    params(
        ("search" = Option<String>, Query, description = "Mesmos filtros da listagem"),
        ("categoryId" = Option<i32>, Query),
        ("membershipTypeId" = Option<i32>, Query),
        ("estado" = Option<String>, Query)
    ),
    responses(
        (status = 200, description = "Arquivo CSV", body = String, content_type = "text/csv")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_companies_csv(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = filter_from_params(&params, &Some(admin))?;
    let companies = app_state.company_service.list_all(&filter).await?;
    let csv = export_companies(&companies)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"empresas.csv\""),
        ],
        csv,
    ))
}
