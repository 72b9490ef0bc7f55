use super::dashboard::{RefreshStatus, render_status, render_tab};
use super::ui;
use crate::core::calculator::{LegQuotes, parse_amount};
use crate::core::config::AppConfig;
use crate::core::market::MarketDataProvider;
use crate::core::state::DashboardState;
use crate::core::view::Tab;
use anyhow::Result;
use chrono::Local;
use tracing::info;

/// Fetches one snapshot and prints a single tab.
pub async fn run(
    provider: &dyn MarketDataProvider,
    config: &AppConfig,
    tab: Tab,
    search: Option<&str>,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching market data...");
    let result = provider.fetch_all().await;
    pb.finish_and_clear();
    let snapshot = result?;

    let mut state = DashboardState::default();
    state.apply_snapshot(snapshot, Local::now());
    info!(tab = %tab, "Rendering snapshot");

    let quotes = LegQuotes::from_bonds(&state.snapshot.bonds, &config.calculator);
    println!("{}", ui::style_text(tab.title(), ui::StyleType::Title));
    println!("{}", render_status(&state, RefreshStatus::default()));
    ui::print_separator();
    println!(
        "{}",
        render_tab(
            &state,
            tab,
            search.unwrap_or_default(),
            &config.calculator,
            &quotes,
            None,
        )
    );
    Ok(())
}

/// Quotes the configured legs once and prints the MEP calculation for `amount`.
pub async fn calc(
    provider: &dyn MarketDataProvider,
    config: &AppConfig,
    amount: &str,
) -> Result<()> {
    let amount = parse_amount(amount);
    if amount.is_none() {
        anyhow::bail!("Invalid amount: expected a number of pesos");
    }

    let pb = ui::new_spinner("Fetching bond quotes...");
    let result = provider.fetch_bonds().await;
    pb.finish_and_clear();
    let bonds = result?;

    let quotes = LegQuotes::from_bonds(&bonds, &config.calculator);
    println!(
        "{}",
        super::calculator::render_calculator(&config.calculator, &quotes, amount)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instrument::MarketSnapshot;
    use crate::core::instrument::tests::equity;
    use crate::core::refresh::tests::MockProvider;

    #[tokio::test]
    async fn test_show_propagates_fetch_errors() {
        let provider = MockProvider::new(MarketSnapshot::default());
        provider.fail.store(true, std::sync::atomic::Ordering::SeqCst);

        let result = run(&provider, &AppConfig::default(), Tab::Stocks, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_calc_rejects_invalid_amount() {
        let provider = MockProvider::new(MarketSnapshot::default());

        let result = calc(&provider, &AppConfig::default(), "mucho").await;
        assert!(result.unwrap_err().to_string().contains("Invalid amount"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_calc_with_quotes() {
        let provider = MockProvider::new(MarketSnapshot {
            bonds: vec![equity("AL30", 1495.0, 1500.0), equity("AL30D", 1450.0, 1460.0)],
            ..Default::default()
        });

        assert!(calc(&provider, &AppConfig::default(), "100000").await.is_ok());
    }
}
