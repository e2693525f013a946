#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Mutex;
use tax_service::models::{
    Address, CreateOrderTransaction, LedgerRecord, Money, Order, OrderTax, OrderTaxRequest,
    Payment, PaymentStatus, RateInfo, RefundRecord, RefundRecordStatus, RegionRates, TaxCategory,
    TaxedMoney, UpdateOrderTransaction, Variant,
};
use tax_service::services::{LedgerApi, ProviderError, RefundRecordSource, TaxRateProvider};

pub const TEST_ORDER_ID: i64 = 1001;

pub fn usd(amount: i64) -> Money {
    Money::new(Decimal::from(amount), "USD")
}

pub fn san_francisco() -> Address {
    Address {
        country: "US".to_string(),
        postal_code: Some("94105".to_string()),
        country_area: Some("CA".to_string()),
        city: Some("San Francisco".to_string()),
        street_address_1: Some("600 Montgomery St".to_string()),
    }
}

pub fn payment(id: i64, status: PaymentStatus, total: i64, tax: i64, captured: i64) -> Payment {
    Payment {
        id,
        status,
        currency: "USD".to_string(),
        total: Decimal::from(total),
        tax: Decimal::from(tax),
        captured_amount: Decimal::from(captured),
        created: Utc
            .with_ymd_and_hms(2024, 3, 1, 12, id as u32, 0)
            .unwrap(),
    }
}

/// Order with total net 100, gross 108 and shipping 10, paid in full.
pub fn settled_order() -> Order {
    Order {
        id: TEST_ORDER_ID,
        created: Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap(),
        total: TaxedMoney::new(usd(100), usd(108)),
        shipping_price: TaxedMoney::untaxed(usd(10)),
        discount_amount: Default::default(),
        voucher: None,
        shipping_address: Some(san_francisco()),
        billing_address: None,
        shipping_method: None,
        lines: Vec::new(),
        payments: vec![payment(1, PaymentStatus::Confirmed, 108, 8, 118)],
    }
}

pub fn variant(id: i64, price: i64, tax_rate: &str) -> Variant {
    Variant {
        id,
        sku: format!("SKU-{id}"),
        name: format!("Variant {id}"),
        base_price: usd(price),
        tax_rate: tax_rate.to_string(),
        track_inventory: false,
        is_shipping_required: true,
    }
}

pub fn record(transaction_id: &str) -> LedgerRecord {
    LedgerRecord {
        transaction_id: transaction_id.to_string(),
        transaction_date: None,
        to_country: None,
        to_zip: None,
        to_state: None,
        amount: None,
        shipping: None,
        sales_tax: None,
    }
}

/// Ledger double recording every call it receives.
#[derive(Default)]
pub struct RecordingLedger {
    pub reject_create: bool,
    pub reject_update: bool,
    pub creates: Mutex<Vec<CreateOrderTransaction>>,
    pub updates: Mutex<Vec<UpdateOrderTransaction>>,
}

impl RecordingLedger {
    pub fn existing() -> Self {
        Self {
            reject_create: true,
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reject_create: true,
            reject_update: true,
            ..Self::default()
        }
    }

    pub fn creates(&self) -> Vec<CreateOrderTransaction> {
        self.creates.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<UpdateOrderTransaction> {
        self.updates.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.creates.lock().unwrap().len() + self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl LedgerApi for RecordingLedger {
    async fn create_order(
        &self,
        transaction: &CreateOrderTransaction,
    ) -> Result<LedgerRecord, ProviderError> {
        self.creates.lock().unwrap().push(transaction.clone());
        if self.reject_create {
            return Err(ProviderError::Api {
                status: 422,
                error: "Unprocessable Entity".to_string(),
                detail: "Provided transaction_id already exists".to_string(),
            });
        }
        Ok(record(&transaction.transaction_id))
    }

    async fn update_order(
        &self,
        transaction: &UpdateOrderTransaction,
    ) -> Result<LedgerRecord, ProviderError> {
        self.updates.lock().unwrap().push(transaction.clone());
        if self.reject_update {
            return Err(ProviderError::Network("connection reset".to_string()));
        }
        Ok(record(&transaction.transaction_id))
    }
}

/// Refund records served from memory.
pub struct FixedRefunds(pub Vec<RefundRecord>);

#[async_trait]
impl RefundRecordSource for FixedRefunds {
    async fn refund_records(&self, _order: &Order) -> Result<Vec<RefundRecord>, ProviderError> {
        Ok(self.0.clone())
    }
}

pub fn refund(id: i64, amount: i64, tax: i64, delivery: i64) -> RefundRecord {
    RefundRecord {
        id,
        payment_id: 1,
        status: RefundRecordStatus::Refunded,
        amount: Decimal::from(amount),
        tax: Decimal::from(tax),
        delivery: Decimal::from(delivery),
        discount: Decimal::ZERO,
    }
}

/// Rate provider charging a flat amount on every order.
pub struct FlatTax {
    pub amount_to_collect: Decimal,
    pub requests: Mutex<Vec<OrderTaxRequest>>,
}

impl FlatTax {
    pub fn new(amount_to_collect: Decimal) -> Self {
        Self {
            amount_to_collect,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<OrderTaxRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaxRateProvider for FlatTax {
    async fn rates_for_region(
        &self,
        country_code: &str,
        region_code: Option<&str>,
    ) -> Result<Option<RegionRates>, ProviderError> {
        Ok(Some(RegionRates {
            country_code: country_code.to_string(),
            country: None,
            region_code: region_code.map(str::to_string),
            region: None,
            minimum_rate: RateInfo {
                label: None,
                rate: Decimal::new(6, 2),
            },
            average_rate: RateInfo {
                label: None,
                rate: Decimal::new(8, 2),
            },
        }))
    }

    async fn tax_for_order(&self, request: &OrderTaxRequest) -> Result<OrderTax, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(OrderTax {
            order_total_amount: Decimal::ZERO,
            shipping: request.shipping,
            taxable_amount: Decimal::ZERO,
            amount_to_collect: self.amount_to_collect,
            rate: Decimal::ZERO,
            has_nexus: true,
            freight_taxable: false,
            tax_source: Some("destination".to_string()),
        })
    }

    async fn categories(&self) -> Result<Vec<TaxCategory>, ProviderError> {
        Ok(Vec::new())
    }
}
