//! The check routine: scrape, compare against the stored price, alert.

use crate::client::PageFetcher;
use crate::config::{Config, NotifyPolicy};
use crate::error::WatchError;
use crate::notify::{compose_body, Notifier};
use crate::scrape::{extract_lowest_price, extract_purchase_link, PriceObservation};
use crate::store::PriceStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Which way the price moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Decreased,
    Increased,
}

/// A detected price movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    pub direction: Direction,
    pub previous: Option<Decimal>,
    pub current: Decimal,
}

impl PriceChange {
    /// Compares `current` against the stored price.
    ///
    /// Returns `None` when they are equal. With no stored price the first
    /// observation counts as a decrease.
    pub fn detect(previous: Option<Decimal>, current: Decimal) -> Option<Self> {
        let direction = match previous {
            Some(p) if p == current => return None,
            Some(p) if p < current => Direction::Increased,
            _ => Direction::Decreased,
        };

        Some(Self { direction, previous, current })
    }
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The listing page had no recognizable lowest-price offer.
    NotFound,
    /// Same price as last time; nothing written or sent.
    Unchanged { observation: PriceObservation },
    /// Alert sent and the new price stored.
    Notified { observation: PriceObservation, change: PriceChange, link: Option<String> },
    /// A rise ignored under [`NotifyPolicy::DecreaseOnly`].
    Suppressed { observation: PriceObservation, change: PriceChange },
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::NotFound => write!(f, "no lowest price found"),
            CheckOutcome::Unchanged { observation } => {
                write!(f, "price unchanged at {} ({})", observation.price, observation.vendor)
            }
            CheckOutcome::Notified { observation, change, .. } => match change.previous {
                Some(previous) => write!(
                    f,
                    "price {} from {} to {} ({}), alert sent",
                    direction_verb(change.direction),
                    previous,
                    change.current,
                    observation.vendor
                ),
                None => write!(
                    f,
                    "first price recorded: {} ({}), alert sent",
                    change.current, observation.vendor
                ),
            },
            CheckOutcome::Suppressed { change, .. } => write!(
                f,
                "price went up to {}, ignored by policy",
                change.current
            ),
        }
    }
}

fn direction_verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Decreased => "went down",
        Direction::Increased => "went up",
    }
}

/// What to watch and who to tell.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub product: String,
    pub listing_url: String,
    pub pricing_url: String,
    pub currency_symbol: String,
    pub policy: NotifyPolicy,
    pub subject: String,
    pub recipients: Vec<String>,
}

impl From<&Config> for WatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            product: config.product.clone(),
            listing_url: config.listing_url.clone(),
            pricing_url: config.pricing_url.clone(),
            currency_symbol: config.currency_symbol.clone(),
            policy: config.policy,
            subject: config.mail.subject.clone(),
            recipients: config.mail.recipients.clone(),
        }
    }
}

/// Runs the scrape-compare-notify sequence against its collaborators.
pub struct PriceWatch<F, S, N> {
    fetcher: F,
    store: S,
    notifier: N,
    settings: WatchSettings,
}

impl<F, S, N> PriceWatch<F, S, N>
where
    F: PageFetcher,
    S: PriceStore,
    N: Notifier,
{
    pub fn new(fetcher: F, store: S, notifier: N, settings: WatchSettings) -> Self {
        Self { fetcher, store, notifier, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Performs one check.
    ///
    /// The alert is sent before the new price is stored: a failed send
    /// leaves the old price in place so the next run reports the change
    /// again. A failed write after a successful send is still an error.
    pub async fn run_once(&self) -> Result<CheckOutcome, WatchError> {
        let s = &self.settings;

        let listing = self.fetch(&s.listing_url).await?;
        let Some(observation) = extract_lowest_price(&listing, &s.product, &s.currency_symbol)
        else {
            warn!("Could not find the lowest price for {}; leaving stored price as is", s.product);
            return Ok(CheckOutcome::NotFound);
        };
        info!("Lowest price for {}: {} at {}", s.product, observation.price, observation.vendor);

        let pricing = self.fetch(&s.pricing_url).await?;
        let link = extract_purchase_link(&pricing, &observation.vendor).map(|l| l.url);

        let previous = self.store.read_last_price().await.map_err(WatchError::persistence)?;

        let Some(change) = PriceChange::detect(previous, observation.price) else {
            info!("The price is still at {}", observation.price);
            return Ok(CheckOutcome::Unchanged { observation });
        };

        if change.direction == Direction::Increased && s.policy == NotifyPolicy::DecreaseOnly {
            info!("Price went up to {}; not alerting on rises", change.current);
            return Ok(CheckOutcome::Suppressed { observation, change });
        }

        match change.previous {
            Some(previous) => info!(
                "Price {} from {} to {}",
                direction_verb(change.direction),
                previous,
                change.current
            ),
            None => info!("No stored price; recording {}", change.current),
        }

        let body = compose_body(&s.product, &change, link.as_deref());
        self.notifier
            .send(&s.subject, &body, &s.recipients)
            .await
            .map_err(WatchError::notification)?;

        self.store.write_price(observation.price).await.map_err(WatchError::persistence)?;

        Ok(CheckOutcome::Notified { observation, change, link })
    }

    /// Runs a check every `period` until `shutdown` resolves.
    ///
    /// The first check runs immediately. Failed checks are logged and the
    /// loop waits for the next tick. Returns the number of checks run.
    pub async fn run_forever<Fut, R>(&self, period: Duration, shutdown: Fut, mut report: R) -> u64
    where
        Fut: Future<Output = ()>,
        R: FnMut(&Result<CheckOutcome, WatchError>),
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut runs = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping after {} check(s)", runs);
                    break;
                }
                _ = ticker.tick() => {
                    let result = self.run_once().await;
                    runs += 1;
                    if let Err(e) = &result {
                        error!("Price check failed: {}", e);
                    }
                    report(&result);
                }
            }
        }

        runs
    }

    async fn fetch(&self, url: &str) -> Result<String, WatchError> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|cause| WatchError::Fetch { url: url.to_string(), cause })
    }
}
