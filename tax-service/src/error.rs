use crate::models::OrderId;
use crate::services::ProviderError;
use thiserror::Error;

/// Why an order could not be pushed to the TaxJar ledger.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Order {order_id} has no shipping or billing address")]
    MissingAddress { order_id: OrderId },

    #[error("Order {order_id} address has no {field}")]
    IncompleteAddress {
        order_id: OrderId,
        field: &'static str,
    },

    #[error("Order {order_id} has no payment to reconcile against")]
    MissingPayment { order_id: OrderId },

    #[error("Refund records for order {order_id} unavailable: {source}")]
    RefundRecords {
        order_id: OrderId,
        #[source]
        source: ProviderError,
    },

    #[error("Ledger update for order {order_id} failed after create was rejected ({create_error}): {source}")]
    Remote {
        order_id: OrderId,
        create_error: String,
        #[source]
        source: ProviderError,
    },
}

impl SyncError {
    /// Expected conditions, such as draft orders without an address yet.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SyncError::MissingAddress { .. }
                | SyncError::IncompleteAddress { .. }
                | SyncError::MissingPayment { .. }
        )
    }
}

/// Failures surfaced by the tax hooks to the host.
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Insufficient stock for {sku}: requested {requested}")]
    InsufficientStock { sku: String, requested: u32 },

    #[error("Quantity of {sku} overflows: {current} + {added}")]
    QuantityOverflow { sku: String, current: u32, added: u32 },

    #[error("Inventory error: {0}")]
    Inventory(String),
}
