// src/models/dashboard.rs

use async_graphql::SimpleObject;
use rust_decimal::Decimal;

// Resumo agregado (os cards do topo do dashboard). Não é persistido.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
#[graphql(complex)]
pub struct DashboardStats {
    pub total_customers: i64,
    pub active_customers: i64,
    pub total_deals: i64,
    pub won_deals: i64,

    // Soma de `value` dos deals com status WON
    #[graphql(skip)]
    pub total_revenue: Decimal,
}
