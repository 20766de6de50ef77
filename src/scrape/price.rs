//! Lowest-price extraction from the listing page.

use super::models::PriceObservation;
use super::selectors::{offsets, TYPOGRAPHY_SPAN};
use rust_decimal::Decimal;
use scraper::Html;
use std::str::FromStr;
use tracing::{debug, warn};

/// Finds the lowest price and its vendor for `product` in the listing page.
///
/// Returns `None` when the page has no typography spans or none of the
/// product markers is followed by a valid label/vendor/price triple.
pub fn extract_lowest_price(
    html: &str,
    product: &str,
    currency_symbol: &str,
) -> Option<PriceObservation> {
    let document = Html::parse_document(html);

    let texts: Vec<String> = document
        .select(&TYPOGRAPHY_SPAN)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .collect();

    if texts.is_empty() {
        warn!("No typography spans found on listing page");
        return None;
    }

    debug!("Collected {} typography spans", texts.len());
    find_lowest_offer(&texts, product, currency_symbol)
}

/// Applies the fixed-offset rule to an ordered list of marker texts.
///
/// For every position holding `product`, the label at +2 must read
/// "LOWEST PRICE", the vendor sits at +3 and the price at +4. The first
/// position that satisfies all three wins; failures move on to the next
/// marker.
pub fn find_lowest_offer(
    texts: &[String],
    product: &str,
    currency_symbol: &str,
) -> Option<PriceObservation> {
    for (index, text) in texts.iter().enumerate() {
        if text != product {
            continue;
        }

        let Some(label) = texts.get(index + offsets::LABEL) else {
            continue;
        };
        if label.to_uppercase() != offsets::LOWEST_PRICE_LABEL {
            debug!("Marker at {} has label {:?}, skipping", index, label);
            continue;
        }

        let Some(price) =
            texts.get(index + offsets::PRICE).and_then(|p| parse_price(p, currency_symbol))
        else {
            debug!("Marker at {} has no parsable price, skipping", index);
            continue;
        };

        let Some(vendor) = texts.get(index + offsets::VENDOR) else {
            continue;
        };

        return Some(PriceObservation::new(vendor.clone(), price));
    }

    warn!("No lowest-price offer found for {}", product);
    None
}

/// Parses a currency-prefixed price like "$1,042.50".
pub fn parse_price(text: &str, currency_symbol: &str) -> Option<Decimal> {
    let mut cleaned = text.trim();
    if !currency_symbol.is_empty() {
        cleaned = cleaned.trim_start_matches(currency_symbol).trim_end_matches(currency_symbol);
    }

    let cleaned = cleaned.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}
