//! Data produced by the extractors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lowest advertised price and the vendor offering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub vendor: String,
    pub price: Decimal,
}

impl PriceObservation {
    pub fn new(vendor: impl Into<String>, price: Decimal) -> Self {
        Self { vendor: vendor.into(), price }
    }
}

/// Outbound purchase URL for a vendor on the pricing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLink {
    pub vendor: String,
    pub url: String,
}
