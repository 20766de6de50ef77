//! Persistence of the last recorded price.
//!
//! The store holds a single record keyed by a fixed partition/row pair.
//! Writes replace the record wholesale and never check for a stale version,
//! so the last writer wins.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::{DryRunStore, MemoryStore};

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The singleton price record as it sits on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPrice {
    pub partition_key: String,
    pub row_key: String,
    pub price: Decimal,
}

/// Repository for the last price this system acted upon.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Returns the full stored record, or `None` before the first write.
    async fn read_record(&self) -> Result<Option<PersistedPrice>>;

    /// Replaces the stored record with `price`.
    async fn write_price(&self, price: Decimal) -> Result<()>;

    /// Returns the stored price, or `None` before the first write.
    async fn read_last_price(&self) -> Result<Option<Decimal>> {
        Ok(self.read_record().await?.map(|r| r.price))
    }
}
