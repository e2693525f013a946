//! TaxJar API client.
//!
//! Covers the order transactions API used for the ledger, summary rates for
//! region lookups, order tax calculation and product tax categories.

use super::metrics::record_request;
use super::{LedgerApi, ProviderError, TaxRateProvider};
use crate::config::TaxJarConfig;
use crate::models::{
    CreateOrderTransaction, LedgerRecord, LineItem, OrderTax, OrderTaxRequest, RegionRates,
    TaxCategory, TaxableAmount, UpdateOrderTransaction,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// TaxJar client shared by the tax hooks and the ledger sync.
#[derive(Clone)]
pub struct TaxJarClient {
    client: Client,
    config: TaxJarConfig,
    summary_rates: Arc<RwLock<Option<CachedRates>>>,
}

struct CachedRates {
    fetched_at: Instant,
    rates: Arc<Vec<RegionRates>>,
}

/// Body of `POST /v2/taxes`.
#[derive(Debug, Serialize)]
struct TaxForOrderBody<'a> {
    to_country: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_zip: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_street: Option<&'a str>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    shipping: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    line_items: Vec<LineItemBody<'a>>,
}

#[derive(Debug, Serialize)]
struct LineItemBody<'a> {
    id: &'a str,
    quantity: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_tax_code: Option<&'a str>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    discount: Decimal,
}

impl<'a> From<&'a LineItem> for LineItemBody<'a> {
    fn from(item: &'a LineItem) -> Self {
        Self {
            id: &item.id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            product_tax_code: item.product_tax_code.as_deref(),
            discount: item.discount,
        }
    }
}

impl<'a> From<&'a OrderTaxRequest> for TaxForOrderBody<'a> {
    fn from(request: &'a OrderTaxRequest) -> Self {
        let destination = &request.destination;
        let (amount, line_items) = match &request.taxable {
            TaxableAmount::Amount(amount) => (Some(*amount), Vec::new()),
            TaxableAmount::LineItems(items) => (None, items.iter().map(Into::into).collect()),
        };
        Self {
            to_country: &destination.country,
            to_zip: destination.zip.as_deref(),
            to_state: destination.state.as_deref(),
            to_city: destination.city.as_deref(),
            to_street: destination.street.as_deref(),
            shipping: request.shipping,
            amount,
            line_items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: LedgerRecord,
}

#[derive(Debug, Deserialize)]
struct TaxEnvelope {
    tax: OrderTax,
}

#[derive(Debug, Deserialize)]
struct SummaryRatesEnvelope {
    summary_rates: Vec<RegionRates>,
}

#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<TaxCategory>,
}

/// TaxJar API error response.
#[derive(Debug, Deserialize)]
struct TaxJarErrorBody {
    error: String,
    detail: String,
}

impl TaxJarClient {
    /// Create a new TaxJar client with the configured request timeout.
    pub fn new(config: TaxJarConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            summary_rates: Arc::new(RwLock::new(None)),
        })
    }

    /// Check if TaxJar is configured (API key is set).
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "TaxJar API key not configured".to_string(),
            ));
        }

        let response = request
            .bearer_auth(self.config.api_key.expose_secret())
            .header("x-api-version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| {
                record_request(operation, 0);
                ProviderError::Network(format!("TaxJar {} request failed: {}", operation, e))
            })?;

        let status = response.status();
        record_request(operation, status.as_u16());
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to read TaxJar response: {}", e)))?;

        tracing::debug!(operation, status = %status, body = %body, "TaxJar response");

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                ProviderError::Decode(format!("Failed to parse TaxJar {} response: {}", operation, e))
            })
        } else {
            let error: TaxJarErrorBody =
                serde_json::from_str(&body).unwrap_or_else(|_| TaxJarErrorBody {
                    error: status
                        .canonical_reason()
                        .unwrap_or("Unknown")
                        .to_string(),
                    detail: body.clone(),
                });
            tracing::warn!(
                operation,
                status = status.as_u16(),
                error = %error.error,
                detail = %error.detail,
                "TaxJar request rejected"
            );
            Err(ProviderError::Api {
                status: status.as_u16(),
                error: error.error,
                detail: error.detail,
            })
        }
    }

    /// Summary rates for every country and region.
    ///
    /// Served from memory until `summary_rates_ttl_secs` have passed since
    /// the last fetch.
    pub async fn summary_rates(&self) -> Result<Arc<Vec<RegionRates>>, ProviderError> {
        let ttl = Duration::from_secs(self.config.summary_rates_ttl_secs);
        if let Some(cached) = self.summary_rates.read().await.as_ref() {
            if cached.fetched_at.elapsed() < ttl {
                return Ok(cached.rates.clone());
            }
        }

        let mut cache = self.summary_rates.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < ttl {
                return Ok(cached.rates.clone());
            }
        }
        let rates = self.fetch_summary_rates().await?;
        *cache = Some(CachedRates {
            fetched_at: Instant::now(),
            rates: rates.clone(),
        });
        Ok(rates)
    }

    /// Drop the cached summary rates and fetch them again.
    pub async fn refresh_summary_rates(&self) -> Result<Arc<Vec<RegionRates>>, ProviderError> {
        let mut cache = self.summary_rates.write().await;
        let rates = self.fetch_summary_rates().await?;
        *cache = Some(CachedRates {
            fetched_at: Instant::now(),
            rates: rates.clone(),
        });
        Ok(rates)
    }

    async fn fetch_summary_rates(&self) -> Result<Arc<Vec<RegionRates>>, ProviderError> {
        let envelope: SummaryRatesEnvelope = self
            .send("summary_rates", self.client.get(self.url("summary_rates")))
            .await?;
        tracing::info!(
            regions = envelope.summary_rates.len(),
            "TaxJar summary rates loaded"
        );
        Ok(Arc::new(envelope.summary_rates))
    }
}

/// Pick the summary entry for a country, or for one of its regions.
///
/// Without a region the country-wide entry wins, falling back to the first
/// entry listed for that country.
pub fn find_region_rates<'a>(
    rates: &'a [RegionRates],
    country_code: &str,
    region_code: Option<&str>,
) -> Option<&'a RegionRates> {
    let mut in_country = rates
        .iter()
        .filter(|r| r.country_code.eq_ignore_ascii_case(country_code));

    match region_code {
        Some(region) => in_country.find(|r| {
            r.region_code
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case(region))
        }),
        None => {
            let candidates: Vec<&RegionRates> = in_country.collect();
            candidates
                .iter()
                .find(|r| r.region_code.is_none())
                .or_else(|| candidates.first())
                .copied()
        }
    }
}

#[async_trait]
impl LedgerApi for TaxJarClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn create_order(
        &self,
        transaction: &CreateOrderTransaction,
    ) -> Result<LedgerRecord, ProviderError> {
        let request = self
            .client
            .post(self.url("transactions/orders"))
            .json(transaction);
        let envelope: OrderEnvelope = self.send("create_order", request).await?;

        tracing::info!(
            transaction_id = %envelope.order.transaction_id,
            "TaxJar order transaction created"
        );
        Ok(envelope.order)
    }

    async fn update_order(
        &self,
        transaction: &UpdateOrderTransaction,
    ) -> Result<LedgerRecord, ProviderError> {
        let path = format!("transactions/orders/{}", transaction.transaction_id);
        let request = self.client.put(self.url(&path)).json(transaction);
        let envelope: OrderEnvelope = self.send("update_order", request).await?;

        tracing::info!(
            transaction_id = %envelope.order.transaction_id,
            "TaxJar order transaction updated"
        );
        Ok(envelope.order)
    }
}

#[async_trait]
impl TaxRateProvider for TaxJarClient {
    async fn rates_for_region(
        &self,
        country_code: &str,
        region_code: Option<&str>,
    ) -> Result<Option<RegionRates>, ProviderError> {
        let rates = self.summary_rates().await?;
        Ok(find_region_rates(&rates, country_code, region_code).cloned())
    }

    async fn tax_for_order(&self, request: &OrderTaxRequest) -> Result<OrderTax, ProviderError> {
        let body = TaxForOrderBody::from(request);
        let envelope: TaxEnvelope = self
            .send("taxes", self.client.post(self.url("taxes")).json(&body))
            .await?;
        Ok(envelope.tax)
    }

    async fn categories(&self) -> Result<Vec<TaxCategory>, ProviderError> {
        let envelope: CategoriesEnvelope = self
            .send("categories", self.client.get(self.url("categories")))
            .await?;
        Ok(envelope.categories)
    }
}
