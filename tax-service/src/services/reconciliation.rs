//! Reconcile an order's totals against what has already been refunded.
//!
//! The ledger must hold the net amount the merchant currently retains for
//! an order, not the amount originally charged.

use super::RefundRecordSource;
use crate::error::SyncError;
use crate::models::{Order, PaymentStatus, ReconciledTotals, RefundRecord};
use rust_decimal::Decimal;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RefundSums {
    principal: Decimal,
    tax: Decimal,
    delivery: Decimal,
    discount: Decimal,
}

impl RefundSums {
    fn add(self, record: &RefundRecord) -> Self {
        Self {
            principal: self.principal + record.amount,
            tax: self.tax + record.tax,
            delivery: self.delivery + record.delivery,
            discount: self.discount + record.discount,
        }
    }
}

/// Totals to report for `order`, pulling refund records from `refunds` when
/// the transaction-log module is installed.
pub async fn reconcile(
    order: &Order,
    refunds: Option<&dyn RefundRecordSource>,
) -> Result<ReconciledTotals, SyncError> {
    let records = match refunds {
        Some(source) => source
            .refund_records(order)
            .await
            .map_err(|source| SyncError::RefundRecords {
                order_id: order.id,
                source,
            })?,
        None => Vec::new(),
    };

    reconcile_with_records(order, &records)
}

/// Totals to report for `order` given its refund records.
///
/// Only records in refunded status count. Without any, the most recent
/// payment decides: a confirmed payment reports what was actually captured,
/// net of tax. Results are not clamped; a full refund can go negative.
pub fn reconcile_with_records(
    order: &Order,
    records: &[RefundRecord],
) -> Result<ReconciledTotals, SyncError> {
    let mut totals = ReconciledTotals {
        amount: order.total_net().amount,
        shipping: order.shipping_net().amount,
        sales_tax: order.total_tax().amount,
    };

    if order.voucher.as_ref().is_some_and(|v| v.discounts_shipping()) {
        totals.shipping -= order.discount_amount.amount();
    }

    let refunded: Vec<&RefundRecord> = records.iter().filter(|r| r.is_refunded()).collect();

    if refunded.is_empty() {
        let payment = order
            .last_payment()
            .ok_or(SyncError::MissingPayment { order_id: order.id })?;
        if payment.status == PaymentStatus::Confirmed {
            totals.amount = payment.captured_price().amount - totals.sales_tax;
        }
    } else {
        let sums = refunded
            .iter()
            .fold(RefundSums::default(), |acc, record| acc.add(record));
        totals.amount -= sums.principal + sums.delivery + sums.discount;
        totals.shipping -= sums.delivery;
        totals.sales_tax -= sums.tax;
    }

    Ok(totals)
}
