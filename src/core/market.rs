//! Market data source abstraction

use crate::core::instrument::{EquityQuote, MarketSnapshot};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches stocks, bonds, notes and MEP quotes as one batch. Any failure
    /// fails the whole batch.
    async fn fetch_all(&self) -> Result<MarketSnapshot>;

    /// Fetches only the bond collection.
    async fn fetch_bonds(&self) -> Result<Vec<EquityQuote>>;
}
