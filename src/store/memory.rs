use super::{PersistedPrice, PriceStore};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

/// In-process store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    price: Mutex<Option<Decimal>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `price`.
    pub fn with_price(price: Decimal) -> Self {
        Self { price: Mutex::new(Some(price)), writes: AtomicUsize::new(0) }
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn read_record(&self) -> Result<Option<PersistedPrice>> {
        let price = *self.price.lock().map_err(|_| anyhow::anyhow!("price lock poisoned"))?;
        Ok(price.map(|price| PersistedPrice {
            partition_key: "memory".to_string(),
            row_key: "0".to_string(),
            price,
        }))
    }

    async fn write_price(&self, price: Decimal) -> Result<()> {
        *self.price.lock().map_err(|_| anyhow::anyhow!("price lock poisoned"))? = Some(price);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reads through to another store but only logs writes.
pub struct DryRunStore<S> {
    inner: S,
}

impl<S: PriceStore> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: PriceStore> PriceStore for DryRunStore<S> {
    async fn read_record(&self) -> Result<Option<PersistedPrice>> {
        self.inner.read_record().await
    }

    async fn write_price(&self, price: Decimal) -> Result<()> {
        info!("Dry run: would store price {}", price);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.read_last_price().await.unwrap(), None);

        store.write_price(Decimal::new(3999, 2)).await.unwrap();
        assert_eq!(store.read_last_price().await.unwrap(), Some(Decimal::new(3999, 2)));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_store_never_writes() {
        let store = DryRunStore::new(MemoryStore::with_price(Decimal::new(4500, 2)));

        store.write_price(Decimal::new(3999, 2)).await.unwrap();

        assert_eq!(store.read_last_price().await.unwrap(), Some(Decimal::new(4500, 2)));
        assert_eq!(store.inner.write_count(), 0);
    }
}
