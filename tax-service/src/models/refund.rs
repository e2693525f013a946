//! Refund records kept by a companion transaction-log module.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundRecordStatus {
    Refunded,
    #[serde(other)]
    Other,
}

/// Decomposed amounts of one refund issued against a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecord {
    pub id: i64,
    pub payment_id: i64,
    pub status: RefundRecordStatus,
    /// Principal refunded, excluding tax and delivery.
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub delivery: Decimal,
    #[serde(default)]
    pub discount: Decimal,
}

impl RefundRecord {
    pub fn is_refunded(&self) -> bool {
        self.status == RefundRecordStatus::Refunded
    }
}
