//! Keep one TaxJar order transaction per settled order.
//!
//! Whether TaxJar already holds a record for an order is not known locally.
//! A create is attempted first; a rejected create is taken to mean the record
//! exists, and the same totals are written with an update instead.

use super::metrics::record_sync;
use super::reconciliation::reconcile;
use super::{LedgerApi, RefundRecordSource};
use crate::error::SyncError;
use crate::models::{Address, CreateOrderTransaction, Order, UpdateOrderTransaction};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Address fields TaxJar requires, resolved from an order.
#[derive(Debug, Clone, Copy)]
pub struct LedgerDestination<'a> {
    pub address: &'a Address,
    pub zip: &'a str,
    pub state: &'a str,
}

/// Resolve the destination, preferring the shipping address.
pub fn resolve_destination(order: &Order) -> Result<LedgerDestination<'_>, SyncError> {
    let address = order
        .destination()
        .ok_or(SyncError::MissingAddress { order_id: order.id })?;
    let zip = address.postal_code().ok_or(SyncError::IncompleteAddress {
        order_id: order.id,
        field: "postal code",
    })?;
    let state = address.region().ok_or(SyncError::IncompleteAddress {
        order_id: order.id,
        field: "region",
    })?;

    Ok(LedgerDestination {
        address,
        zip,
        state,
    })
}

#[derive(Clone)]
pub struct LedgerSync {
    ledger: Arc<dyn LedgerApi>,
    refunds: Option<Arc<dyn RefundRecordSource>>,
}

impl LedgerSync {
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        refunds: Option<Arc<dyn RefundRecordSource>>,
    ) -> Self {
        Self { ledger, refunds }
    }

    /// False when the ledger has no credentials to write with.
    pub fn is_configured(&self) -> bool {
        self.ledger.is_configured()
    }

    pub fn has_refund_records(&self) -> bool {
        self.refunds.is_some()
    }

    /// Create or update the order's ledger record with reconciled totals.
    ///
    /// Precondition failures return before any remote call.
    pub async fn upsert(&self, order: &Order) -> Result<SyncOutcome, SyncError> {
        let destination = resolve_destination(order)?;
        let totals = reconcile(order, self.refunds.as_deref()).await?;

        let create = CreateOrderTransaction::new(
            order,
            destination.address,
            destination.zip,
            destination.state,
            &totals,
        );

        let outcome = match self.ledger.create_order(&create).await {
            Ok(_) => SyncOutcome::Created,
            Err(create_error) => {
                tracing::debug!(
                    order_id = order.id,
                    error = %create_error,
                    "Ledger create rejected, updating existing transaction"
                );
                let update = UpdateOrderTransaction::new(order.id, &totals);
                self.ledger
                    .update_order(&update)
                    .await
                    .map_err(|source| SyncError::Remote {
                        order_id: order.id,
                        create_error: create_error.to_string(),
                        source,
                    })?;
                SyncOutcome::Updated
            }
        };

        record_sync(outcome.as_str());
        tracing::info!(
            order_id = order.id,
            outcome = outcome.as_str(),
            amount = %totals.amount,
            shipping = %totals.shipping,
            sales_tax = %totals.sales_tax,
            "Order synchronized to TaxJar ledger"
        );

        Ok(outcome)
    }
}
