use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrorsKind;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Parâmetro '{field}' inválido: {reason}")]
    InvalidQueryParam { field: &'static str, reason: String },

    // Corpo ilegível: JSON malformado, campo obrigatório ausente, enum desconhecido
    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Registro não encontrado: {entity} {id}")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{0}")]
    UniqueConstraintViolation(String),

    #[error("Token de autenticação inválido ou ausente")]
    Unauthorized,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Arquivo de importação inválido: {0}")]
    InvalidImportFile(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` guarda o contexto do erro para o log.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn invalid_param(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::InvalidQueryParam { field, reason: reason.into() }
    }

    /// Erro de validação de um único campo, no mesmo formato do `validator`.
    pub fn field_error(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message.into().into());

        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidQueryParam { .. }
            | AppError::InvalidBody(_)
            | AppError::InvalidImportFile(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::Unauthorized | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            // Todos os detalhes da validação, campo -> mensagens
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                collect_validation_details(&errors, "", &mut details);
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::InvalidQueryParam { field, reason } => {
                let mut details = serde_json::Map::new();
                details.insert(field.to_string(), json!([reason]));
                json!({
                    "error": format!("Parâmetro '{}' inválido.", field),
                    "details": details,
                })
            }
            AppError::InvalidBody(reason) => json!({
                "error": "Corpo da requisição inválido.",
                "details": { "body": [reason] },
            }),
            AppError::InvalidImportFile(reason) => json!({
                "error": "Arquivo de importação inválido.",
                "details": { "file": [reason] },
            }),
            AppError::JwtError(_) => json!({ "error": AppError::Unauthorized.to_string() }),
            // 500: a mensagem detalhada só vai para o log
            ref e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

// Achata erros aninhados ("opcionesPrecios[0].costo") usando os nomes do JSON.
fn collect_validation_details(
    errors: &validator::ValidationErrors,
    prefix: &str,
    details: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = format!("{}{}", prefix, to_camel_case(field));
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                });
                details.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_details(inner, &format!("{}.", path), details);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_details(inner, &format!("{}[{}].", path, index), details);
                }
            }
        }
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Converte violações de integridade do Postgres em erros de negócio.
/// `unique_message` é usado para UNIQUE; `fk_field` recebe o erro de FOREIGN KEY.
pub fn map_constraint_error(e: sqlx::Error, unique_message: &str, fk_field: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(unique_message.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::field_error(fk_field, "unknown_reference", "Referência inexistente.");
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_lists_fields() {
        let response = AppError::field_error("categories_ids", "length", "required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"]["categoriesIds"][0], "required");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn nested_errors_are_flattened_with_json_names() {
        use validator::Validate;

        #[derive(Validate)]
        struct Price {
            #[validate(range(min = 0, message = "negativo"))]
            unit_cost: i32,
        }

        #[derive(Validate)]
        struct Plan {
            #[validate(nested)]
            price_options: Vec<Price>,
        }

        let plan = Plan { price_options: vec![Price { unit_cost: 1 }, Price { unit_cost: -1 }] };
        let response = AppError::ValidationError(plan.validate().unwrap_err()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["details"]["priceOptions[1].unitCost"][0], "negativo");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(to_camel_case("fecha_inicio_membresia"), "fechaInicioMembresia");
        assert_eq!(to_camel_case("name"), "name");
    }

    #[tokio::test]
    async fn invalid_param_names_the_field() {
        let response = AppError::invalid_param("page", "deve ser um inteiro").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"]["page"][0], "deve ser um inteiro");
    }

    #[tokio::test]
    async fn not_found_is_404_with_message() {
        let response = AppError::not_found("empresa", 42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Registro não encontrado: empresa 42");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = AppError::InternalServerError(anyhow::anyhow!("senha do banco")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Ocorreu um erro inesperado.");
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::UniqueConstraintViolation("x".into()).status(),
            StatusCode::CONFLICT
        );
    }
}
