pub mod config;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod models;
pub mod services;

use std::sync::Arc;

use config::Config;
use handlers::{EventRegistry, OrderSyncListener};
use hooks::{select_hooks, TaxHooks};
use services::{
    LedgerApi, LedgerSync, ProviderError, RefundRecordSource, TaxJarClient, TaxRateProvider,
};

/// Everything the host wires in: tax hooks plus the ledger sync listener.
pub struct TaxPlugin {
    config: Config,
    hooks: Arc<dyn TaxHooks>,
    sync: LedgerSync,
    events: EventRegistry,
}

impl TaxPlugin {
    /// Build against the TaxJar API using `config.taxjar`.
    pub fn build(
        config: Config,
        refunds: Option<Arc<dyn RefundRecordSource>>,
    ) -> Result<Self, ProviderError> {
        let client = TaxJarClient::new(config.taxjar.clone())?;
        if client.is_configured() {
            tracing::info!(
                base_url = %config.taxjar.api_base_url,
                api_version = %config.taxjar.api_version,
                "TaxJar client initialized"
            );
        } else {
            tracing::warn!("TaxJar credentials not configured - tax features will be disabled");
        }

        let client = Arc::new(client);
        Ok(Self::with_providers(config, client.clone(), client, refunds))
    }

    /// Build against arbitrary providers.
    ///
    /// Refund records are only consulted when `sync.refund_records` is set.
    pub fn with_providers(
        config: Config,
        ledger: Arc<dyn LedgerApi>,
        rates: Arc<dyn TaxRateProvider>,
        refunds: Option<Arc<dyn RefundRecordSource>>,
    ) -> Self {
        let refunds = refunds.filter(|_| config.sync.refund_records);
        let hooks = select_hooks(&config, rates);
        let sync = LedgerSync::new(ledger, refunds);

        let mut events = EventRegistry::new();
        events.subscribe(Arc::new(OrderSyncListener::new(sync.clone(), &config.sync)));

        Self {
            config,
            hooks,
            sync,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hooks(&self) -> Arc<dyn TaxHooks> {
        self.hooks.clone()
    }

    /// Registry the host dispatches order, payment and refund events to.
    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn ledger_sync(&self) -> &LedgerSync {
        &self.sync
    }
}
