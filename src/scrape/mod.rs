//! HTML scraping for the listing and pricing pages.
//!
//! Both extractors are position-based: they encode a fixed contract with the
//! third-party page layout, kept in one place so it is easy to update when
//! the markup changes.

pub mod link;
pub mod models;
pub mod price;
pub mod selectors;

pub use link::extract_purchase_link;
pub use models::{PriceObservation, PurchaseLink};
pub use price::{extract_lowest_price, find_lowest_offer, parse_price};
