//! Per-request tax context for storefront requests.

use super::TaxHooks;
use crate::config::Config;
use crate::error::HookError;
use crate::models::TaxRateTable;
use crate::services::{detect_region, GeoLocator};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Taxes for the request's country and region, looked up on first use.
pub struct LazyTaxes {
    hooks: Arc<dyn TaxHooks>,
    country: Option<String>,
    region: Option<String>,
    taxes: OnceCell<Option<TaxRateTable>>,
}

impl LazyTaxes {
    pub fn new(hooks: Arc<dyn TaxHooks>, country: Option<String>, region: Option<String>) -> Self {
        Self {
            hooks,
            country,
            region,
            taxes: OnceCell::new(),
        }
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Resolve once; later calls reuse the first result.
    pub async fn get(&self) -> Result<Option<&TaxRateTable>, HookError> {
        let taxes = self
            .taxes
            .get_or_try_init(|| async {
                match self.country.as_deref() {
                    Some(country) => {
                        self.hooks
                            .taxes_for_country_region(country, self.region.as_deref())
                            .await
                    }
                    None => Ok(None),
                }
            })
            .await?;
        Ok(taxes.as_ref())
    }
}

/// Country, region and lazily resolved taxes for one storefront request.
pub struct RequestTaxes {
    pub region: Option<String>,
    /// `None` when TaxJar is not configured.
    pub taxes: Option<LazyTaxes>,
}

impl RequestTaxes {
    pub fn resolve(
        config: &Config,
        hooks: Arc<dyn TaxHooks>,
        client_ip: Option<IpAddr>,
        country: Option<&str>,
        locator: &dyn GeoLocator,
    ) -> Self {
        let region = detect_region(client_ip, country, locator);
        let taxes = config.taxjar_enabled().then(|| {
            LazyTaxes::new(hooks, country.map(str::to_string), region.clone())
        });

        Self { region, taxes }
    }
}
