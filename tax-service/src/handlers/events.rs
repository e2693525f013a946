//! Persistence events from the host and the ledger sync listener.
//!
//! Listeners run inline inside the host's save, so nothing here may fail
//! the save: every error ends up in the log instead.

use crate::config::SyncConfig;
use crate::models::{Order, TaxedMoney};
use crate::services::ledger_sync::LedgerSync;
use crate::services::metrics::record_sync;
use crate::services::SyncOutcome;
use async_trait::async_trait;
use std::sync::Arc;

/// Something the host persisted, with the order it belongs to.
#[derive(Debug, Clone, Copy)]
pub enum HostEvent<'a> {
    OrderSaved(&'a Order),
    OrderDeleting(&'a Order),
    PaymentSaved { payment_id: i64, order: &'a Order },
    PaymentDeleting { payment_id: i64, order: &'a Order },
    RefundRecordSaved { record_id: i64, order: &'a Order },
}

impl<'a> HostEvent<'a> {
    /// The owning order.
    pub fn order(&self) -> &'a Order {
        match *self {
            HostEvent::OrderSaved(order) | HostEvent::OrderDeleting(order) => order,
            HostEvent::PaymentSaved { order, .. }
            | HostEvent::PaymentDeleting { order, .. }
            | HostEvent::RefundRecordSaved { order, .. } => order,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::OrderSaved(_) => "order_saved",
            HostEvent::OrderDeleting(_) => "order_deleting",
            HostEvent::PaymentSaved { .. } => "payment_saved",
            HostEvent::PaymentDeleting { .. } => "payment_deleting",
            HostEvent::RefundRecordSaved { .. } => "refund_record_saved",
        }
    }
}

#[async_trait]
pub trait EventListener: Send + Sync {
    async fn on_event(&self, event: &HostEvent<'_>);
}

/// Listeners the host dispatches its persistence events to.
#[derive(Default, Clone)]
pub struct EventRegistry {
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run every listener in subscription order.
    pub async fn dispatch(&self, event: HostEvent<'_>) {
        for listener in &self.listeners {
            listener.on_event(&event).await;
        }
    }
}

/// Sum of payments in confirmed, preauthorized or refunded status.
///
/// Payments in another currency than the order's are left out.
pub fn total_paid(order: &Order) -> TaxedMoney {
    let currency = order.currency();
    order
        .payments
        .iter()
        .filter(|p| p.status.is_settling())
        .filter(|p| {
            let same = p.currency == currency;
            if !same {
                tracing::warn!(
                    order_id = order.id,
                    payment_id = p.id,
                    payment_currency = %p.currency,
                    order_currency = %currency,
                    "Payment currency differs from order, not counted as paid"
                );
            }
            same
        })
        .fold(TaxedMoney::zero(currency), |acc, p| acc + p.total_price())
}

/// An order is settled once qualifying payments cover its gross total.
pub fn is_settled(order: &Order) -> bool {
    total_paid(order).gross.amount >= order.total.gross.amount
}

/// What the listener did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    Disabled,
    Ignored,
    Unsettled,
    Synced(SyncOutcome),
    Skipped,
    Failed,
}

/// Pushes settled orders to the TaxJar ledger on every qualifying save.
pub struct OrderSyncListener {
    sync: LedgerSync,
    enabled: bool,
}

impl OrderSyncListener {
    /// Disabled by `sync.enabled = false` or by a ledger without credentials.
    pub fn new(sync: LedgerSync, config: &SyncConfig) -> Self {
        let enabled = config.enabled && sync.is_configured();
        if config.enabled && !enabled {
            tracing::warn!("TaxJar ledger not configured - order synchronization disabled");
        }
        Self { sync, enabled }
    }

    pub async fn handle(&self, event: &HostEvent<'_>) -> SyncDecision {
        if !self.enabled {
            return SyncDecision::Disabled;
        }
        if matches!(event, HostEvent::RefundRecordSaved { .. }) && !self.sync.has_refund_records() {
            return SyncDecision::Ignored;
        }

        let order = event.order();
        if !is_settled(order) {
            tracing::debug!(
                order_id = order.id,
                event = event.kind(),
                "Order not settled, skipping ledger sync"
            );
            return SyncDecision::Unsettled;
        }

        match self.sync.upsert(order).await {
            Ok(outcome) => SyncDecision::Synced(outcome),
            Err(err) if err.is_precondition() => {
                record_sync("skipped");
                tracing::info!(
                    order_id = order.id,
                    event = event.kind(),
                    reason = %err,
                    "Order not synchronized to TaxJar ledger"
                );
                SyncDecision::Skipped
            }
            Err(err) => {
                record_sync("failed");
                let address = order.destination();
                tracing::error!(
                    order_id = order.id,
                    event = event.kind(),
                    to_country = address.map(|a| a.country.as_str()),
                    to_zip = address.and_then(|a| a.postal_code()),
                    to_state = address.and_then(|a| a.region()),
                    to_city = address.and_then(|a| a.city()),
                    error = %err,
                    "TaxJar ledger synchronization failed"
                );
                SyncDecision::Failed
            }
        }
    }
}

#[async_trait]
impl EventListener for OrderSyncListener {
    async fn on_event(&self, event: &HostEvent<'_>) {
        self.handle(event).await;
    }
}
