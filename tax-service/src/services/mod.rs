//! Remote collaborators and the logic that talks to them.
//!
//! The traits here are the seams between this crate, the host application
//! and TaxJar, so each side can be swapped out in tests.

pub mod geolocation;
pub mod ledger_sync;
pub mod metrics;
pub mod reconciliation;
pub mod taxjar;

use crate::models::{
    CreateOrderTransaction, LedgerRecord, Order, OrderTax, OrderTaxRequest, RefundRecord,
    RegionRates, TaxCategory, UpdateOrderTransaction,
};
use async_trait::async_trait;
use thiserror::Error;

pub use geolocation::{detect_region, GeoLocator, Location};
pub use ledger_sync::{LedgerSync, SyncOutcome};
pub use reconciliation::{reconcile, reconcile_with_records};
pub use taxjar::TaxJarClient;

/// Error type for remote provider calls.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {error} - {detail}")]
    Api {
        status: u16,
        error: String,
        detail: String,
    },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),
}

/// TaxJar's order transaction ledger.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Whether calls can succeed at all, e.g. an API key is present.
    fn is_configured(&self) -> bool {
        true
    }

    async fn create_order(
        &self,
        transaction: &CreateOrderTransaction,
    ) -> Result<LedgerRecord, ProviderError>;

    async fn update_order(
        &self,
        transaction: &UpdateOrderTransaction,
    ) -> Result<LedgerRecord, ProviderError>;
}

/// Tax rates and order tax calculation.
#[async_trait]
pub trait TaxRateProvider: Send + Sync {
    /// Summary rates for a country, or one of its regions when given.
    async fn rates_for_region(
        &self,
        country_code: &str,
        region_code: Option<&str>,
    ) -> Result<Option<RegionRates>, ProviderError>;

    async fn tax_for_order(&self, request: &OrderTaxRequest) -> Result<OrderTax, ProviderError>;

    async fn categories(&self) -> Result<Vec<TaxCategory>, ProviderError>;
}

/// Refund records from the companion transaction-log module.
#[async_trait]
pub trait RefundRecordSource: Send + Sync {
    /// Every refund record for payments belonging to `order`.
    async fn refund_records(&self, order: &Order) -> Result<Vec<RefundRecord>, ProviderError>;
}
