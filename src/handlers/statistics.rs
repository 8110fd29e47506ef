use axum::{extract::State, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::statistics::Statistics};

/// Contadores dos cards do painel (rota atrás do admin_guard).
#[utoipa::path(
    get,
    path = "/api/statistics",
    tag = "Statistics",
    responses(
        (status = 200, description = "Contadores do painel", body = Statistics),
        (status = 401), (status = 403)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_statistics(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.statistics_repo.snapshot().await?;
    Ok(Json(stats))
}
