//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::{admin_guard, identify};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}

/// Monta todas as rotas. Separado do `main` para os testes usarem o mesmo Router.
pub fn app(app_state: AppState) -> Router {
    // import/export antes de /{id}
    let company_routes = Router::new()
        .route(
            "/",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route("/import", post(handlers::companies::import_companies_csv))
        .route("/export", get(handlers::companies::export_companies_csv))
        .route(
            "/{id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        );

    let category_routes = Router::new()
        .route(
            "/",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/{id}",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        );

    let certificate_routes = Router::new()
        .route(
            "/",
            get(handlers::certificates::list_certificates)
                .post(handlers::certificates::create_certificate),
        )
        .route(
            "/{id}",
            get(handlers::certificates::get_certificate)
                .put(handlers::certificates::update_certificate)
                .delete(handlers::certificates::delete_certificate),
        );

    // /public e /{id}/price são abertas; o resto pede AdminUser no próprio handler
    let membership_routes = Router::new()
        .route(
            "/",
            get(handlers::membership_types::list_membership_types)
                .post(handlers::membership_types::create_membership_type),
        )
        .route("/public", get(handlers::membership_types::list_public_membership_types))
        .route(
            "/{id}",
            get(handlers::membership_types::get_membership_type)
                .put(handlers::membership_types::update_membership_type)
                .delete(handlers::membership_types::delete_membership_type),
        )
        .route("/{id}/price", get(handlers::membership_types::get_membership_price));

    let opinion_routes = Router::new()
        .route(
            "/",
            get(handlers::opinions::list_opinions).post(handlers::opinions::create_opinion),
        )
        .route(
            "/{id}",
            get(handlers::opinions::get_opinion)
                .put(handlers::opinions::update_opinion)
                .delete(handlers::opinions::delete_opinion),
        )
        .route("/{id}/approve", post(handlers::opinions::approve_opinion))
        .route("/{id}/reject", post(handlers::opinions::reject_opinion));

    // Grupos inteiramente administrativos
    let role_routes = Router::new()
        .route("/", get(handlers::roles::list_roles).post(handlers::roles::create_role))
        .route(
            "/{id}",
            get(handlers::roles::get_role)
                .put(handlers::roles::update_role)
                .delete(handlers::roles::delete_role),
        )
        .route_layer(axum_middleware::from_fn(admin_guard));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users).post(handlers::users::create_user))
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route_layer(axum_middleware::from_fn(admin_guard));

    let statistics_routes = Router::new()
        .route("/", get(handlers::statistics::get_statistics))
        .route_layer(axum_middleware::from_fn(admin_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/companies", company_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/certificates", certificate_routes)
        .nest("/api/membership-types", membership_routes)
        .nest("/api/opinions", opinion_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/users", user_routes)
        .nest("/api/statistics", statistics_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), identify))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::services::auth::tests::{sign, TEST_SECRET};

    // Nenhum destes casos chega ao banco: o pool preguiçoso nunca conecta.
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/directorio_test")
            .unwrap();
        app(AppState::from_pool(pool, TEST_SECRET.to_string()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app().oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_numeric_page_is_rejected_naming_the_field() {
        let (status, body) = send(get("/api/companies?page=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].get("page").is_some());
    }

    #[tokio::test]
    async fn oversized_limit_is_rejected() {
        let (status, body) = send(get("/api/companies?limit=500")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].get("limit").is_some());
    }

    #[tokio::test]
    async fn unknown_estado_is_rejected() {
        let (status, body) = send(get("/api/companies?estado=borrado")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].get("estado").is_some());
    }

    #[tokio::test]
    async fn admin_groups_require_a_token() {
        for uri in ["/api/users", "/api/roles", "/api/statistics"] {
            let (status, _) = send(get(uri)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn catalog_writes_require_a_token() {
        let request = Request::post("/api/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Tecnología"}"#))
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let token = sign(1, "outro-segredo", 3600);
        let request = Request::get("/api/companies")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let token = sign(1, TEST_SECRET, -3600);
        let request = Request::get("/api/users")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn price_lookup_needs_a_periodicity() {
        let (status, body) = send(get("/api/membership-types/1/price")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].get("periodicidad").is_some());
    }

    #[tokio::test]
    async fn body_missing_a_field_is_a_400_with_details() {
        let request = Request::post("/api/opinions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"authorName":"Carlos","authorEmail":"carlos@correo.com","comment":"Bien","companyId":1}"#,
            ))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["body"][0].as_str().unwrap().contains("rating"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_400_with_details() {
        let request = Request::post("/api/opinions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(body["details"].get("body").is_some());
    }

    #[tokio::test]
    async fn non_numeric_path_id_is_a_400_naming_id() {
        let (status, body) = send(get("/api/companies/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].get("id").is_some());
    }

    #[tokio::test]
    async fn overflowing_page_is_a_400_not_a_panic() {
        let (status, body) = send(get("/api/companies?page=9223372036854775807&limit=100")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].get("page").is_some());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/companies").is_some());
    }
}
