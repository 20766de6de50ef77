//! CSS selectors for the listing and pricing pages.
//!
//! Both pages are rendered with Material UI; every piece of text we care
//! about sits in an element carrying the `MuiTypography-root` class.
//!
//! **Update process**: When extraction starts missing, capture an HTML
//! sample, update the selectors or offsets, and add a test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Typography spans on the listing page, visited in document order.
pub static TYPOGRAPHY_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span[class*='MuiTypography-root']").unwrap());

/// Typography anchors on the pricing page, one per vendor.
pub static TYPOGRAPHY_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[class*='MuiTypography-root']").unwrap());

/// Offsets relative to the product-name marker in the ordered span list.
pub mod offsets {
    /// Label that must read "LOWEST PRICE".
    pub const LABEL: usize = 2;
    /// Vendor offering the lowest price.
    pub const VENDOR: usize = 3;
    /// Currency-prefixed price, e.g. "$42.50".
    pub const PRICE: usize = 4;

    /// Expected label text (compared upper-cased).
    pub const LOWEST_PRICE_LABEL: &str = "LOWEST PRICE";

    /// Parent elements to climb from the vendor anchor to the offer row.
    pub const ROW_DEPTH: usize = 4;
}
