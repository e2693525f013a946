pub mod cart;
pub mod ledger;
pub mod money;
pub mod order;
pub mod refund;
pub mod tax;

pub use cart::{Cart, CartLine};
pub use ledger::{CreateOrderTransaction, LedgerRecord, ReconciledTotals, UpdateOrderTransaction};
pub use money::{DiscountAmount, Money, TaxedMoney};
pub use order::{
    Address, Order, OrderId, OrderLine, Payment, PaymentStatus, ShippingMethod, Variant, Voucher,
    VoucherType,
};
pub use refund::{RefundRecord, RefundRecordStatus};
pub use tax::{
    LineItem, OrderTax, OrderTaxRequest, RateInfo, RegionRates, TaxCategory, TaxDestination,
    TaxRate, TaxRateTable, TaxableAmount, DEFAULT_TAX_RATE_NAME,
};
