//! Counters for TaxJar traffic and ledger synchronization.
//!
//! Emitted through the `metrics` facade; the host decides which recorder
//! (Prometheus or otherwise) collects them.

use metrics::counter;

pub const LEDGER_SYNC_TOTAL: &str = "tax_ledger_sync_total";
pub const TAXJAR_REQUESTS_TOTAL: &str = "taxjar_requests_total";

/// Record the outcome of one ledger synchronization attempt.
pub fn record_sync(outcome: &'static str) {
    counter!(LEDGER_SYNC_TOTAL, "outcome" => outcome).increment(1);
}

/// Record one TaxJar HTTP call. Transport failures use status `0`.
pub fn record_request(operation: &'static str, status: u16) {
    counter!(
        TAXJAR_REQUESTS_TOTAL,
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
}
