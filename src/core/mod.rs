//! Core dashboard logic: data model, refresh, selections and views

pub mod calculator;
pub mod config;
pub mod format;
pub mod instrument;
pub mod log;
pub mod market;
pub mod refresh;
pub mod selection;
pub mod state;
pub mod view;

// Re-export main types for cleaner imports
pub use instrument::{EquityQuote, Instrument, InstrumentClass, MarketSnapshot, MepQuote};
pub use market::MarketDataProvider;
pub use refresh::{RefreshController, RefreshOutcome};
pub use state::{DashboardState, Store};
