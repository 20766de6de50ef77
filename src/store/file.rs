use super::{PersistedPrice, PriceStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Keeps the price record in a small JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    partition_key: String,
    row_key: String,
}

impl JsonFileStore {
    pub fn new(
        path: impl Into<PathBuf>,
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
    ) -> Self {
        Self { path: path.into(), partition_key: partition_key.into(), row_key: row_key.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PriceStore for JsonFileStore {
    async fn read_record(&self) -> Result<Option<PersistedPrice>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No price file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read price file: {}", self.path.display()))
            }
        };

        let record: PersistedPrice = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse price file: {}", self.path.display()))?;

        if record.partition_key != self.partition_key || record.row_key != self.row_key {
            warn!(
                "Price file holds {}/{}, expected {}/{}; treating as empty",
                record.partition_key, record.row_key, self.partition_key, self.row_key
            );
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn write_price(&self, price: Decimal) -> Result<()> {
        let record = PersistedPrice {
            partition_key: self.partition_key.clone(),
            row_key: self.row_key.clone(),
            price,
        };
        let json = serde_json::to_string_pretty(&record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace price file: {}", self.path.display()))?;

        info!("Stored price {} at {}", price, self.path.display());
        Ok(())
    }
}
