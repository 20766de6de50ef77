//! Purchase-link extraction from the pricing page.

use super::models::PurchaseLink;
use super::selectors::{offsets, TYPOGRAPHY_ANCHOR};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

/// Finds the outbound purchase URL offered by `vendor`.
///
/// The first typography anchor whose text equals the vendor name is taken
/// as the anchor of the offer row. From there we climb four elements, take
/// the row's last element child and read the `href` of its first element
/// child. Only the first matching anchor is considered.
pub fn extract_purchase_link(html: &str, vendor: &str) -> Option<PurchaseLink> {
    let document = Html::parse_document(html);

    let Some(anchor) = document
        .select(&TYPOGRAPHY_ANCHOR)
        .find(|a| a.text().collect::<String>().trim() == vendor)
    else {
        warn!("No pricing-page anchor for vendor {}", vendor);
        return None;
    };

    let url = purchase_href(anchor);
    if url.is_none() {
        warn!("Pricing page layout changed: no purchase link next to {}", vendor);
    }

    url.map(|url| {
        debug!("Purchase link for {}: {}", vendor, url);
        PurchaseLink { vendor: vendor.to_string(), url }
    })
}

fn purchase_href(anchor: ElementRef<'_>) -> Option<String> {
    let mut row = anchor;
    for _ in 0..offsets::ROW_DEPTH {
        row = row.parent().and_then(ElementRef::wrap)?;
    }

    let last = row.children().filter_map(ElementRef::wrap).last()?;
    let target = last.children().find_map(ElementRef::wrap)?;

    target.value().attr("href").map(str::to_string)
}
