//! Instrument records as served by the market-data proxy

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The market segment an equity-like quote was fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    #[default]
    Stock,
    Bond,
    On,
}

impl Display for InstrumentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                InstrumentClass::Stock => "stock",
                InstrumentClass::Bond => "bond",
                InstrumentClass::On => "on",
            }
        )
    }
}

/// Quote for stocks, bonds and corporate notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityQuote {
    pub symbol: String,
    pub px_bid: Option<f64>,
    pub px_ask: Option<f64>,
    #[serde(rename = "c")]
    pub last: Option<f64>,
    pub pct_change: Option<f64>,
    pub q_bid: Option<f64>,
    pub q_ask: Option<f64>,
    /// Number of operations in the session
    pub q_op: Option<f64>,
    #[serde(rename = "v")]
    pub volume: Option<f64>,
    // Set by the provider from the endpoint, not trusted from the payload
    #[serde(skip)]
    pub class: InstrumentClass,
}

/// Implied MEP rate quote for a bond pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MepQuote {
    pub ticker: String,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub close: Option<f64>,
    #[serde(rename = "tmark")]
    pub mark: Option<f64>,
    pub v_ars: Option<f64>,
    pub v_usd: Option<f64>,
    pub q_ars: Option<f64>,
    pub q_usd: Option<f64>,
    pub ars_bid: Option<f64>,
    pub ars_ask: Option<f64>,
    pub usd_bid: Option<f64>,
    pub usd_ask: Option<f64>,
    #[serde(default)]
    pub panel: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instrument {
    Equity(EquityQuote),
    Mep(MepQuote),
}

impl Instrument {
    /// Identity used for favorites, comparison and matching across refreshes.
    pub fn key(&self) -> &str {
        match self {
            Instrument::Equity(q) => &q.symbol,
            Instrument::Mep(q) => &q.ticker,
        }
    }

    pub fn is_mep(&self) -> bool {
        matches!(self, Instrument::Mep(_))
    }

    pub fn bid(&self) -> Option<f64> {
        match self {
            Instrument::Equity(q) => q.px_bid,
            Instrument::Mep(q) => q.bid,
        }
    }

    pub fn ask(&self) -> Option<f64> {
        match self {
            Instrument::Equity(q) => q.px_ask,
            Instrument::Mep(q) => q.ask,
        }
    }

    pub fn pct_change(&self) -> Option<f64> {
        match self {
            Instrument::Equity(q) => q.pct_change,
            Instrument::Mep(_) => None,
        }
    }
}

impl From<EquityQuote> for Instrument {
    fn from(quote: EquityQuote) -> Self {
        Instrument::Equity(quote)
    }
}

impl From<MepQuote> for Instrument {
    fn from(quote: MepQuote) -> Self {
        Instrument::Mep(quote)
    }
}

/// One complete fetch of all four collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    pub stocks: Vec<EquityQuote>,
    pub bonds: Vec<EquityQuote>,
    pub notes: Vec<EquityQuote>,
    pub mep: Vec<MepQuote>,
}

impl MarketSnapshot {
    pub fn equities(&self) -> impl Iterator<Item = &EquityQuote> {
        self.stocks.iter().chain(&self.bonds).chain(&self.notes)
    }

    /// Finds the fresh record for a key, MEP quotes first.
    pub fn find(&self, key: &str) -> Option<Instrument> {
        self.find_mep(key)
            .map(|q| Instrument::Mep(q.clone()))
            .or_else(|| self.find_equity(key).map(|q| Instrument::Equity(q.clone())))
    }

    pub fn find_equity(&self, symbol: &str) -> Option<&EquityQuote> {
        self.equities().find(|q| q.symbol == symbol)
    }

    pub fn find_mep(&self, ticker: &str) -> Option<&MepQuote> {
        self.mep.iter().find(|q| q.ticker == ticker)
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
            && self.bonds.is_empty()
            && self.notes.is_empty()
            && self.mep.is_empty()
    }
}
