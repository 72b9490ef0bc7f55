use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::core::instrument::{EquityQuote, InstrumentClass, MarketSnapshot, MepQuote};
use crate::core::market::MarketDataProvider;

pub const DEFAULT_BASE_URL: &str = "https://data-912-proxy.ferminrp.workers.dev";

const STOCKS_ENDPOINT: &str = "/live/arg_stocks";
const BONDS_ENDPOINT: &str = "/live/arg_bonds";
const NOTES_ENDPOINT: &str = "/live/arg_ons";
const MEP_ENDPOINT: &str = "/live/arg_mep";

/// Decodes a JSON collection, treating anything but an array as empty.
fn normalize_collection<T: DeserializeOwned>(endpoint: &str, value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        warn!(endpoint, "Response is not an array, using an empty collection");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(endpoint, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

// Data912Provider implementation for MarketDataProvider
pub struct Data912Provider {
    base_url: String,
    client: reqwest::Client,
}

impl Data912Provider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("argdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Data912Provider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch_collection<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting market data from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for endpoint: {}", e, endpoint))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for endpoint: {}",
                response.status(),
                endpoint
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response for {}: {}", endpoint, e))?;

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", endpoint, e))?;

        Ok(normalize_collection(endpoint, value))
    }

    async fn fetch_equities(
        &self,
        endpoint: &str,
        class: InstrumentClass,
    ) -> Result<Vec<EquityQuote>> {
        let mut quotes: Vec<EquityQuote> = self.fetch_collection(endpoint).await?;
        for quote in &mut quotes {
            quote.class = class;
        }
        debug!(%class, count = quotes.len(), "Fetched quotes");
        Ok(quotes)
    }
}

#[async_trait]
impl MarketDataProvider for Data912Provider {
    #[instrument(name = "Data912FetchAll", skip(self))]
    async fn fetch_all(&self) -> Result<MarketSnapshot> {
        let (stocks, bonds, notes, mep) = futures::try_join!(
            self.fetch_equities(STOCKS_ENDPOINT, InstrumentClass::Stock),
            self.fetch_equities(BONDS_ENDPOINT, InstrumentClass::Bond),
            self.fetch_equities(NOTES_ENDPOINT, InstrumentClass::On),
            self.fetch_collection::<MepQuote>(MEP_ENDPOINT),
        )?;

        Ok(MarketSnapshot {
            stocks,
            bonds,
            notes,
            mep,
        })
    }

    #[instrument(name = "Data912FetchBonds", skip(self))]
    async fn fetch_bonds(&self) -> Result<Vec<EquityQuote>> {
        self.fetch_equities(BONDS_ENDPOINT, InstrumentClass::Bond).await
    }
}
