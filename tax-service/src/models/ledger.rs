//! Order transaction payloads for TaxJar's ledger.
//!
//! Amounts are exact decimals in memory and serialize as JSON numbers, which
//! is what the transactions API accepts.

use super::order::{Address, Order, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amounts still reportable for an order after refunds and vouchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciledTotals {
    /// Net amount including shipping, excluding tax.
    pub amount: Decimal,
    /// Shipping, excluding tax.
    pub shipping: Decimal,
    pub sales_tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrderTransaction {
    pub transaction_id: String,
    pub transaction_date: String,
    pub to_country: String,
    pub to_zip: String,
    pub to_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_street: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub shipping: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub sales_tax: Decimal,
}

impl CreateOrderTransaction {
    /// Caller has already checked that `to_zip` and `to_state` exist.
    pub fn new(
        order: &Order,
        address: &Address,
        zip: &str,
        state: &str,
        totals: &ReconciledTotals,
    ) -> Self {
        Self {
            transaction_id: order.id.to_string(),
            transaction_date: order.created.to_rfc3339(),
            to_country: address.country.clone(),
            to_zip: zip.to_string(),
            to_state: state.to_string(),
            to_city: address.city().map(str::to_string),
            to_street: address.street().map(str::to_string),
            amount: totals.amount,
            shipping: totals.shipping,
            sales_tax: totals.sales_tax,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOrderTransaction {
    pub transaction_id: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub shipping: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub sales_tax: Decimal,
}

impl UpdateOrderTransaction {
    pub fn new(order_id: OrderId, totals: &ReconciledTotals) -> Self {
        Self {
            transaction_id: order_id.to_string(),
            amount: totals.amount,
            shipping: totals.shipping,
            sales_tax: totals.sales_tax,
        }
    }
}

/// Order transaction as stored by TaxJar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerRecord {
    pub transaction_id: String,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default)]
    pub to_country: Option<String>,
    #[serde(default)]
    pub to_zip: Option<String>,
    #[serde(default)]
    pub to_state: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub shipping: Option<Decimal>,
    #[serde(default)]
    pub sales_tax: Option<Decimal>,
}
