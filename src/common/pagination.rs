// src/common/pagination.rs
//
// Leitura explícita dos parâmetros de query. Nada é convertido "no silêncio":
// um valor inválido vira 400 com o nome do campo.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::common::error::AppError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

pub type QueryParams = HashMap<String, String>;

/// Valor textual do parâmetro, sem espaços. Vazio conta como ausente.
pub fn text_param(params: &QueryParams, field: &str) -> Option<String> {
    params
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn int_param(params: &QueryParams, field: &'static str) -> Result<Option<i64>, AppError> {
    match text_param(params, field) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::invalid_param(field, format!("'{}' não é um número inteiro", raw))),
    }
}

/// Ids são inteiros positivos de 32 bits.
pub fn id_param(params: &QueryParams, field: &'static str) -> Result<Option<i32>, AppError> {
    match int_param(params, field)? {
        None => Ok(None),
        Some(v) if v >= 1 && v <= i64::from(i32::MAX) => Ok(Some(v as i32)),
        Some(v) => Err(AppError::invalid_param(field, format!("{} não é um id válido", v))),
    }
}

/// Enums no mesmo formato do JSON (ex: `estado=activo`).
pub fn enum_param<T: DeserializeOwned>(
    params: &QueryParams,
    field: &'static str,
) -> Result<Option<T>, AppError> {
    match text_param(params, field) {
        None => Ok(None),
        Some(raw) => serde_json::from_value(serde_json::Value::String(raw.clone()))
            .map(Some)
            .map_err(|_| AppError::invalid_param(field, format!("valor desconhecido '{}'", raw))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    /// `page >= 1` (padrão 1), `limit >= 1` (padrão 10, máximo 100).
    pub fn from_params(params: &QueryParams) -> Result<Self, AppError> {
        let page = int_param(params, "page")?.unwrap_or(1);
        if page < 1 {
            return Err(AppError::invalid_param("page", "deve ser maior ou igual a 1"));
        }

        let limit = int_param(params, "limit")?.unwrap_or(DEFAULT_LIMIT);
        if limit < 1 {
            return Err(AppError::invalid_param("limit", "deve ser maior que 0"));
        }
        if limit > MAX_LIMIT {
            return Err(AppError::invalid_param("limit", format!("máximo permitido é {}", MAX_LIMIT)));
        }

        // O OFFSET precisa caber em i64
        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::invalid_param("page", "página fora do intervalo"));
        }

        Ok(Self { page, limit })
    }

    /// Para as listas simples: sem `page` nem `limit`, devolve tudo numa página só.
    pub fn optional_from_params(params: &QueryParams) -> Result<Option<Self>, AppError> {
        if text_param(params, "page").is_none() && text_param(params, "limit").is_none() {
            return Ok(None);
        }
        Self::from_params(params).map(Some)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        total_pages(total, self.limit)
    }
}

/// `ceil(total / limit)`
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Metadados (page, totalPages) de uma lista que pode ou não estar paginada.
pub fn page_meta(total: i64, page: Option<PageRequest>) -> (i64, i64) {
    match page {
        Some(p) => (p.page, p.total_pages(total)),
        None => (1, if total > 0 { 1 } else { 0 }),
    }
}
