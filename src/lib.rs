//! price-watch - Scheduled lowest-price watcher with email alerts
//!
//! Scrapes a listing page for the lowest advertised price, compares it with
//! the last recorded value and emails a fixed list of recipients when it
//! moves.

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod notify;
pub mod scrape;
pub mod store;
pub mod watch;

pub use config::Config;
pub use error::WatchError;
pub use scrape::{PriceObservation, PurchaseLink};
pub use watch::{CheckOutcome, PriceWatch};
