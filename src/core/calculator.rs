//! MEP arbitrage calculator: buy a bond in pesos, sell its dollar line.

use crate::core::instrument::EquityQuote;
use crate::core::market::MarketDataProvider;
use crate::core::refresh::{PollHandle, spawn_poller};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error};

/// Prices are quoted per 100 nominals.
const PRICE_BASE: f64 = 100.0;

/// The bond pair used for the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorLegs {
    /// Bought in pesos at its ask price
    pub buy_symbol: String,
    /// Sold for dollars at its bid price
    pub sell_symbol: String,
}

impl Default for CalculatorLegs {
    fn default() -> Self {
        Self {
            buy_symbol: "AL30".to_string(),
            sell_symbol: "AL30D".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MepCalculation {
    pub nominals: f64,
    pub usd_received: f64,
    pub implied_rate: f64,
}

/// Numeric coercion of user input; anything unparseable is absent.
pub fn parse_amount(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Nominals bought with `amount` pesos at `ask` per 100 nominals.
fn nominals_for(amount: f64, ask: f64) -> f64 {
    amount / (ask / PRICE_BASE)
}

/// Returns `None` when the amount or either price is missing or zero.
pub fn calculate(
    amount: Option<f64>,
    buy_ask: Option<f64>,
    sell_bid: Option<f64>,
) -> Option<MepCalculation> {
    let amount = amount.filter(|a| *a != 0.0)?;
    let ask = buy_ask.filter(|p| *p != 0.0)?;
    let bid = sell_bid.filter(|p| *p != 0.0)?;

    let nominals = nominals_for(amount, ask);
    let usd_received = nominals * bid / PRICE_BASE;
    if usd_received == 0.0 {
        return None;
    }

    Some(MepCalculation {
        nominals,
        usd_received,
        implied_rate: amount / usd_received,
    })
}

/// Latest quotes for both legs, as seen by the calculator feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegQuotes {
    pub buy: Option<EquityQuote>,
    pub sell: Option<EquityQuote>,
}

impl LegQuotes {
    pub fn from_bonds(bonds: &[EquityQuote], legs: &CalculatorLegs) -> Self {
        let find = |symbol: &str| bonds.iter().find(|b| b.symbol == symbol).cloned();
        Self {
            buy: find(&legs.buy_symbol),
            sell: find(&legs.sell_symbol),
        }
    }

    pub fn calculate(&self, amount: Option<f64>) -> Option<MepCalculation> {
        calculate(
            amount,
            self.buy.as_ref().and_then(|q| q.px_ask),
            self.sell.as_ref().and_then(|q| q.px_bid),
        )
    }
}

/// Bond feed for the calculator, polled on its own timer.
pub struct CalculatorFeed {
    provider: Arc<dyn MarketDataProvider>,
    legs: CalculatorLegs,
    quotes: watch::Sender<LegQuotes>,
    closed: Arc<AtomicBool>,
}

impl CalculatorFeed {
    pub fn new(provider: Arc<dyn MarketDataProvider>, legs: CalculatorLegs) -> Self {
        let (quotes, _) = watch::channel(LegQuotes::default());
        Self {
            provider,
            legs,
            quotes,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn legs(&self) -> &CalculatorLegs {
        &self.legs
    }

    pub fn quotes(&self) -> LegQuotes {
        self.quotes.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LegQuotes> {
        self.quotes.subscribe()
    }

    /// Fetches bonds once. On failure the previous quotes are kept.
    pub async fn refresh(&self) -> anyhow::Result<()> {
        let bonds = self.provider.fetch_bonds().await.inspect_err(|e| {
            error!(error = %e, "Error fetching bond data");
        })?;

        if self.closed.load(Ordering::Acquire) {
            debug!("Calculator feed stopped, discarding bonds");
            return Ok(());
        }

        let quotes = LegQuotes::from_bonds(&bonds, &self.legs);
        debug!(
            buy = quotes.buy.is_some(),
            sell = quotes.sell.is_some(),
            "Calculator legs refreshed"
        );
        self.quotes.send_replace(quotes);
        Ok(())
    }

    pub fn spawn(self: &Arc<Self>, interval: Duration) -> PollHandle {
        let feed = Arc::clone(self);
        spawn_poller(interval, Arc::clone(&self.closed), move || {
            let feed = Arc::clone(&feed);
            async move {
                // Already logged; the next tick retries
                let _ = feed.refresh().await;
            }
        })
    }
}
