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
    models::certificate::{Certificate, CertificatePage, CertificatePatch, CertificatePayload},
};

#[utoipa::path(
    get,
    path = "/api/certificates",
    tag = "Certificates",
    params(
        ("search" = Option<String>, Query, description = "Trecho do nome ou da entidade emissora"),
        ("page" = Option<i64>, Query),
        ("limit" = Option<i64>, Query)
    ),
    responses((status = 200, description = "Lista de certificados", body = CertificatePage))
)]
pub async fn list_certificates(
    State(app_state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::optional_from_params(&params)?;
    let search = text_param(&params, "search");

    let (certificates, total) = app_state.certificate_repo.list(search.as_deref(), page).await?;
    let (page, total_pages) = page_meta(total, page);

    Ok(Json(CertificatePage { certificates, total, page, total_pages }))
}

#[utoipa::path(
    get,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    params(("id" = i32, Path)),
    responses(
        (status = 200, body = Certificate),
        (status = 404, description = "Certificado não encontrado")
    )
)]
pub async fn get_certificate(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let certificate = app_state
        .certificate_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("certificado", id))?;
    Ok(Json(certificate))
}

#[utoipa::path(
    post,
    path = "/api/certificates",
    tag = "Certificates",
    request_body = CertificatePayload,
    responses((status = 201, description = "Certificado criado", body = Certificate)),
    security(("api_jwt" = []))
)]
pub async fn create_certificate(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppJson(payload): AppJson<CertificatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let certificate = app_state.certificate_repo.create(&payload).await?;
    tracing::info!("📜 Certificado criado (id {})", certificate.id);
    Ok((StatusCode::CREATED, Json(certificate)))
}

#[utoipa::path(
    put,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    request_body = CertificatePatch,
    params(("id" = i32, Path)),
    responses(
        (status = 200, body = Certificate),
        (status = 404, description = "Certificado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_certificate(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<CertificatePatch>,
) -> Result<impl IntoResponse, AppError> {
    let current = app_state
        .certificate_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::not_found("certificado", id))?;

    let merged = patch.apply_to(&current);
    merged.validate()?;

    let certificate = app_state
        .certificate_repo
        .update(id, &merged)
        .await?
        .ok_or(AppError::not_found("certificado", id))?;
    tracing::info!("✏️ Certificado atualizado (id {})", id);
    Ok(Json(certificate))
}

#[utoipa::path(
    delete,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    params(("id" = i32, Path)),
    responses(
        (status = 204, description = "Removido (e retirado das empresas)"),
        (status = 404, description = "Certificado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_certificate(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.certificate_repo.delete(id).await? {
        return Err(AppError::not_found("certificado", id));
    }
    tracing::info!("🗑️ Certificado removido (id {})", id);
    Ok(StatusCode::NO_CONTENT)
}
