//! Alert wording.

use crate::watch::{Direction, PriceChange};

/// Builds the plain-text email body for a price change.
///
/// A missing link leaves the trailing URL empty rather than dropping the
/// sentence.
pub fn compose_body(product: &str, change: &PriceChange, link: Option<&str>) -> String {
    let link = link.unwrap_or_default();

    match (change.direction, change.previous) {
        (Direction::Decreased, Some(previous)) => format!(
            "{} has gone down in price from {} to {}.\nIt's here if you want to grab it: {}",
            product, previous, change.current, link
        ),
        (Direction::Decreased, None) => format!(
            "{} is now listed at {}.\nIt's here if you want to grab it: {}",
            product, change.current, link
        ),
        (Direction::Increased, previous) => format!(
            "{} has gone up in price from {} to {}.\nLooks like you missed out. It's here if you want to grab it: {}",
            product,
            previous.map(|p| p.to_string()).unwrap_or_default(),
            change.current,
            link
        ),
    }
}
