// src/models/statistics.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Os cards do topo do painel
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_companies: i64,

    // Contagem simples de usuários cadastrados (sem filtro de atividade)
    pub active_users: i64,

    // Empresas criadas nos últimos 30 dias
    pub new_registrations: i64,

    // Não existe livro de receitas ainda: sempre zero
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
}
