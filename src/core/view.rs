//! Tab selection, search filtering and comparison metrics.

use crate::core::format::{format_number, format_percentage};
use crate::core::instrument::{EquityQuote, Instrument};
use crate::core::state::DashboardState;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Stocks,
    Bonds,
    Ons,
    Mep,
    Favorites,
    Comparison,
    Calculator,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Stocks,
        Tab::Bonds,
        Tab::Ons,
        Tab::Mep,
        Tab::Favorites,
        Tab::Comparison,
        Tab::Calculator,
    ];

    /// Label shown in the tab bar.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Stocks => "Merval",
            Tab::Bonds => "Bonos",
            Tab::Ons => "ONs",
            Tab::Mep => "MEP",
            Tab::Favorites => "Favoritos",
            Tab::Comparison => "Comparar",
            Tab::Calculator => "Calcular MEP",
        }
    }

    /// Whether the search box applies to this tab.
    pub fn is_searchable(&self) -> bool {
        matches!(self, Tab::Stocks | Tab::Bonds | Tab::Ons)
    }
}

impl Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Tab::Stocks => "stocks",
                Tab::Bonds => "bonds",
                Tab::Ons => "ons",
                Tab::Mep => "mep",
                Tab::Favorites => "favorites",
                Tab::Comparison => "comparison",
                Tab::Calculator => "calculator",
            }
        )
    }
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stocks" | "merval" => Ok(Tab::Stocks),
            "bonds" | "bonos" => Ok(Tab::Bonds),
            "ons" | "notes" => Ok(Tab::Ons),
            "mep" => Ok(Tab::Mep),
            "favorites" | "favoritos" | "fav" => Ok(Tab::Favorites),
            "comparison" | "comparar" | "cmp" => Ok(Tab::Comparison),
            "calculator" | "calc" => Ok(Tab::Calculator),
            _ => Err(anyhow::anyhow!("Invalid tab: {}", s)),
        }
    }
}

/// Locale-style ordering: case folded first, raw text breaks ties.
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Case-insensitive substring match on symbol, sorted by symbol.
pub fn filter_and_sort<'a>(quotes: &'a [EquityQuote], search: &str) -> Vec<&'a EquityQuote> {
    let needle = search.to_lowercase();
    let mut matches: Vec<&EquityQuote> = quotes
        .iter()
        .filter(|q| q.symbol.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by(|a, b| locale_compare(&a.symbol, &b.symbol));
    matches
}

/// Instruments listed on `tab`. Only the per-class tabs honor the search term;
/// MEP, favorites and comparison are shown as stored.
pub fn tab_items(state: &DashboardState, tab: Tab, search: &str) -> Vec<Instrument> {
    let equities = |quotes: &[EquityQuote]| -> Vec<Instrument> {
        filter_and_sort(quotes, search)
            .into_iter()
            .cloned()
            .map(Instrument::Equity)
            .collect()
    };

    match tab {
        Tab::Stocks => equities(&state.snapshot.stocks),
        Tab::Bonds => equities(&state.snapshot.bonds),
        Tab::Ons => equities(&state.snapshot.notes),
        Tab::Mep => state
            .snapshot
            .mep
            .iter()
            .cloned()
            .map(Instrument::Mep)
            .collect(),
        Tab::Favorites => state.favorites.items().to_vec(),
        Tab::Comparison => state.comparison.items().to_vec(),
        Tab::Calculator => Vec::new(),
    }
}

/// Resolves a key typed by the user to an instrument, preferring the
/// collection of the active tab, then entries already selected (ghosts
/// included), then any fresh record.
pub fn resolve(state: &DashboardState, tab: Tab, key: &str) -> Option<Instrument> {
    let key = key.trim();
    let find_equity = |quotes: &[EquityQuote]| {
        quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(key))
            .cloned()
            .map(Instrument::Equity)
    };
    let find_selected = |items: &[Instrument]| {
        items
            .iter()
            .find(|i| i.key().eq_ignore_ascii_case(key))
            .cloned()
    };

    let in_tab = match tab {
        Tab::Stocks => find_equity(&state.snapshot.stocks),
        Tab::Bonds => find_equity(&state.snapshot.bonds),
        Tab::Ons => find_equity(&state.snapshot.notes),
        Tab::Mep => state
            .snapshot
            .mep
            .iter()
            .find(|q| q.ticker.eq_ignore_ascii_case(key))
            .cloned()
            .map(Instrument::Mep),
        _ => None,
    };

    in_tab
        .or_else(|| find_selected(state.favorites.items()))
        .or_else(|| find_selected(state.comparison.items()))
        .or_else(|| state.snapshot.find(&key.to_uppercase()))
}

/// A named column of labelled values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricColumn {
    pub name: String,
    pub metrics: Vec<(&'static str, String)>,
}

fn or_na(value: Option<f64>, format_fn: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| "N/A".to_string(), format_fn)
}

pub fn metric_column(item: &Instrument) -> MetricColumn {
    let metrics = match item {
        Instrument::Mep(q) => vec![
            ("MEP Implícito", or_na(q.bid, format_number)),
            ("MEP Explícito", or_na(q.ask, format_number)),
            ("ARS Compra", or_na(q.ars_bid, format_number)),
            ("ARS Venta", or_na(q.ars_ask, format_number)),
            ("USD Compra", or_na(q.usd_bid, format_number)),
            ("USD Venta", or_na(q.usd_ask, format_number)),
        ],
        Instrument::Equity(q) => vec![
            ("Compra", format_number(q.px_bid.unwrap_or_default())),
            ("Venta", format_number(q.px_ask.unwrap_or_default())),
            ("Último", format_number(q.last.unwrap_or_default())),
            (
                "Variación",
                or_na(q.pct_change.filter(|c| *c != 0.0), format_percentage),
            ),
            ("Volumen", or_na(q.volume.filter(|v| *v != 0.0), format_number)),
        ],
    };
    MetricColumn {
        name: item.key().to_string(),
        metrics,
    }
}

/// Builds the comparison grid: one row per metric label across all columns.
/// Labels appear in first-seen order; columns lacking a metric show `N/A`.
pub fn comparison_grid(items: &[Instrument]) -> (Vec<String>, Vec<Vec<String>>) {
    let columns: Vec<MetricColumn> = items.iter().map(metric_column).collect();

    let mut labels: Vec<&'static str> = Vec::new();
    for column in &columns {
        for (label, _) in &column.metrics {
            if !labels.contains(label) {
                labels.push(*label);
            }
        }
    }

    let headers = columns.iter().map(|c| c.name.clone()).collect();
    let rows = labels
        .iter()
        .map(|label| {
            let mut row = vec![label.to_string()];
            row.extend(columns.iter().map(|c| {
                c.metrics
                    .iter()
                    .find(|(l, _)| l == label)
                    .map_or_else(|| "N/A".to_string(), |(_, v)| v.clone())
            }));
            row
        })
        .collect();

    (headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instrument::MarketSnapshot;
    use crate::core::instrument::tests::{equity, mep};

    fn symbols(quotes: &[&EquityQuote]) -> Vec<String> {
        quotes.iter().map(|q| q.symbol.clone()).collect()
    }

    #[test]
    fn test_filter_and_sort() {
        let stocks = vec![
            equity("YPFD", 1.0, 2.0),
            equity("GGAL", 1.0, 2.0),
            equity("PAMP", 1.0, 2.0),
        ];

        assert_eq!(symbols(&filter_and_sort(&stocks, "ga")), vec!["GGAL"]);
        assert_eq!(symbols(&filter_and_sort(&stocks, "")), vec!["GGAL", "PAMP", "YPFD"]);
        assert!(filter_and_sort(&stocks, "zzz").is_empty());
    }

    #[test]
    fn test_sort_is_case_insensitive() {
        let quotes = vec![
            equity("bma", 1.0, 2.0),
            equity("ALUA", 1.0, 2.0),
            equity("BBAR", 1.0, 2.0),
        ];
        assert_eq!(symbols(&filter_and_sort(&quotes, "")), vec!["ALUA", "BBAR", "bma"]);
        assert_eq!(symbols(&filter_and_sort(&quotes, "B")), vec!["BBAR", "bma"]);
    }

    #[test]
    fn test_search_only_applies_to_class_tabs() {
        let mut state = DashboardState::default();
        state.snapshot = MarketSnapshot {
            stocks: vec![equity("YPFD", 1.0, 2.0), equity("GGAL", 1.0, 2.0)],
            mep: vec![mep("GD30", 1.0, 2.0), mep("AL30", 1.0, 2.0)],
            ..Default::default()
        };
        state.favorites.toggle(equity("YPFD", 1.0, 2.0).into());

        let keys = |items: Vec<Instrument>| -> Vec<String> {
            items.iter().map(|i| i.key().to_string()).collect()
        };
        assert_eq!(keys(tab_items(&state, Tab::Stocks, "ga")), vec!["GGAL"]);
        // Unfiltered and in source order
        assert_eq!(keys(tab_items(&state, Tab::Mep, "ga")), vec!["GD30", "AL30"]);
        assert_eq!(keys(tab_items(&state, Tab::Favorites, "ga")), vec!["YPFD"]);
        assert!(tab_items(&state, Tab::Calculator, "").is_empty());
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("Bonos".parse::<Tab>().unwrap(), Tab::Bonds);
        assert_eq!("cmp".parse::<Tab>().unwrap(), Tab::Comparison);
        assert!("charts".parse::<Tab>().is_err());
        for tab in Tab::ALL {
            assert_eq!(tab.to_string().parse::<Tab>().unwrap(), tab);
        }
    }

    #[test]
    fn test_resolve_prefers_active_tab() {
        let mut state = DashboardState::default();
        state.snapshot = MarketSnapshot {
            bonds: vec![equity("AL30", 1500.0, 1510.0)],
            mep: vec![mep("AL30", 1180.0, 1190.0)],
            ..Default::default()
        };

        assert!(!resolve(&state, Tab::Bonds, "al30").unwrap().is_mep());
        assert!(resolve(&state, Tab::Mep, "AL30").unwrap().is_mep());
        assert!(resolve(&state, Tab::Favorites, "al30").unwrap().is_mep());
        assert!(resolve(&state, Tab::Stocks, "GGAL").is_none());

        // Ghost entries can still be resolved so they can be removed
        state.favorites.toggle(equity("GGAL", 1.0, 2.0).into());
        assert_eq!(resolve(&state, Tab::Favorites, "ggal").unwrap().key(), "GGAL");
    }

    #[test]
    fn test_comparison_grid_mixed_items() {
        let mut stock = equity("GGAL", 6100.0, 6120.0);
        stock.last = Some(6110.0);
        stock.pct_change = Some(1.5);
        let items = vec![Instrument::Equity(stock), Instrument::Mep(mep("AL30", 1180.0, 1190.5))];

        let (headers, rows) = comparison_grid(&items);

        assert_eq!(headers, vec!["GGAL", "AL30"]);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0], vec!["Compra", "6.100", "N/A"]);
        assert_eq!(rows[2], vec!["Último", "6.110", "N/A"]);
        assert_eq!(rows[3], vec!["Variación", "+1.50%", "N/A"]);
        assert_eq!(rows[4], vec!["Volumen", "N/A", "N/A"]);
        assert_eq!(rows[5], vec!["MEP Implícito", "N/A", "1.180"]);
        assert_eq!(rows[6], vec!["MEP Explícito", "N/A", "1.190,5"]);
        assert_eq!(rows[7], vec!["ARS Compra", "N/A", "N/A"]);
    }

    #[test]
    fn test_comparison_grid_empty() {
        let (headers, rows) = comparison_grid(&[]);
        assert!(headers.is_empty());
        assert!(rows.is_empty());
    }
}
